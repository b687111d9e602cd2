//! Tunable constants for damage, ordering, progression and match length.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Lower bound of the base damage roll.
    pub min_base_damage: u32,
    /// Stand-in for attack/defense stats that are unset.
    pub default_stat: u32,
    pub attack_bonus_per_level: f64,
    pub defense_bonus_per_level: f64,
    pub special_multiplier: f64,
    pub crit_base_chance: f64,
    pub crit_chance_per_level: f64,
    pub crit_multiplier: f64,
    pub resist_chance_per_level: f64,
    /// Fraction of damage removed by a resistance roll.
    pub resist_reduction: f64,
    pub speed_bonus_per_level: f64,
    pub default_speed: u32,
    pub default_hp: u32,
    pub counter_base_chance: f64,
    pub counter_chance_per_level: f64,
    pub max_level: u32,
    pub max_rounds: u32,
    pub rounds_to_win: u32,
    pub base_round_experience: f64,
    pub experience_per_turn: f64,
    pub max_turn_experience: f64,
    pub win_experience: f64,
    pub round_experience_cap: f64,
    pub experience_per_level: f64,
    pub max_levels_per_round: u32,
    pub max_trainer_level: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            min_base_damage: 5,
            default_stat: 10,
            attack_bonus_per_level: 0.02,
            defense_bonus_per_level: 0.015,
            special_multiplier: 1.3,
            crit_base_chance: 0.10,
            crit_chance_per_level: 0.001,
            crit_multiplier: 1.5,
            resist_chance_per_level: 0.001,
            resist_reduction: 0.30,
            speed_bonus_per_level: 0.01,
            default_speed: 50,
            default_hp: 100,
            counter_base_chance: 0.10,
            counter_chance_per_level: 0.001,
            max_level: 100,
            max_rounds: 3,
            rounds_to_win: 2,
            base_round_experience: 10.0,
            experience_per_turn: 0.2,
            max_turn_experience: 20.0,
            win_experience: 15.0,
            round_experience_cap: 40.0,
            experience_per_level: 20.0,
            max_levels_per_round: 2,
            max_trainer_level: 10,
        }
    }
}

impl Rules {
    pub fn crit_chance(&self, attacker_level: u32) -> f64 {
        probability(self.crit_base_chance + attacker_level as f64 * self.crit_chance_per_level)
    }

    pub fn resist_chance(&self, defender_level: u32) -> f64 {
        probability(defender_level as f64 * self.resist_chance_per_level)
    }

    pub fn counter_chance(&self, fainted_level: u32) -> f64 {
        probability(self.counter_base_chance + fainted_level as f64 * self.counter_chance_per_level)
    }

    /// Clamps a stored level into `1..=max_level`.
    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.max_level.max(1))
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Reads a JSON rules file; keys that are absent keep their defaults.
pub fn load_rules(path: &Path) -> anyhow::Result<Rules> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file at {}", path.display()))?;
    let rules: Rules = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    if rules.max_rounds == 0 || rules.rounds_to_win == 0 {
        anyhow::bail!("max_rounds and rounds_to_win must be > 0");
    }
    if rules.max_level == 0 {
        anyhow::bail!("max_level must be > 0");
    }
    if rules.experience_per_level <= 0.0 {
        anyhow::bail!("experience_per_level must be > 0");
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let rules: Rules = serde_json::from_str(r#"{"crit_multiplier": 2.0}"#).unwrap();
        assert_eq!(rules.crit_multiplier, 2.0);
        assert_eq!(rules.min_base_damage, 5);
        assert_eq!(rules.max_rounds, 3);
    }

    #[test]
    fn chances_scale_with_level() {
        let rules = Rules::default();
        assert!((rules.crit_chance(10) - 0.11).abs() < 1e-9);
        assert!((rules.resist_chance(50) - 0.05).abs() < 1e-9);
        assert_eq!(rules.resist_chance(5000), 1.0);
    }

    #[test]
    fn zero_level_cap_is_rejected() {
        let path = std::env::temp_dir().join(format!("rules-zero-cap-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"max_level": 0}"#).unwrap();
        let err = load_rules(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("max_level"));
    }

    #[test]
    fn levels_are_clamped() {
        let rules = Rules::default();
        assert_eq!(rules.clamp_level(0), 1);
        assert_eq!(rules.clamp_level(250), 100);
    }
}

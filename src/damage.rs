use crate::model::Creature;
use crate::rules::Rules;
use crate::types::type_multiplier;
use rand::Rng;

/// Outcome of one resolved attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRoll {
    pub damage: u32,
    pub critical: bool,
    pub resisted: bool,
    pub multiplier: f64,
}

/// Resolves a single attack. Never returns less than 1 damage.
///
/// Order: base roll, attacker level bonus, type multiplier over the defense
/// factor, special multiplier, critical, then resistance on the post-critical
/// amount.
pub fn resolve_attack<R: Rng + ?Sized>(
    attacker: &Creature,
    defender: &Creature,
    attacker_level: u32,
    defender_level: u32,
    special: bool,
    rules: &Rules,
    rng: &mut R,
) -> DamageRoll {
    let (attack_stat, defense_stat) = if special {
        (attacker.stats.special_attack, defender.stats.special_defense)
    } else {
        (attacker.stats.attack, defender.stats.defense)
    };
    let attack_stat = attack_stat.unwrap_or(rules.default_stat);
    let defense_stat = defense_stat.unwrap_or(rules.default_stat);

    let low = rules.min_base_damage.max(1);
    let high = attack_stat.max(low);
    let base = rng.gen_range(low..=high) as f64;

    let scaled = base * (1.0 + attacker_level as f64 * rules.attack_bonus_per_level);
    let multiplier = type_multiplier(attacker.types, defender.types);
    let factor = defense_factor(defense_stat, defender_level, rules);

    let mut damage = floor_at_one(scaled * multiplier / factor);
    if special {
        damage = floor_at_one(damage as f64 * rules.special_multiplier);
    }

    let critical = rng.gen_bool(rules.crit_chance(attacker_level));
    if critical {
        damage = floor_at_one(damage as f64 * rules.crit_multiplier);
    }

    let resisted = rng.gen_bool(rules.resist_chance(defender_level));
    if resisted {
        damage = floor_at_one(damage as f64 * (1.0 - rules.resist_reduction));
    }

    DamageRoll {
        damage,
        critical,
        resisted,
        multiplier,
    }
}

/// `max(1, defense / (10 * (1 + level * bonus)))`
pub fn defense_factor(defense_stat: u32, defender_level: u32, rules: &Rules) -> f64 {
    let scale = 10.0 * (1.0 + defender_level as f64 * rules.defense_bonus_per_level);
    (defense_stat as f64 / scale).max(1.0)
}

fn floor_at_one(value: f64) -> u32 {
    if value.is_finite() {
        (value.floor().min(u32::MAX as f64) as u32).max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stats;
    use crate::types::{ElementType, TypeSet};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn mon(element: ElementType, stats: Stats) -> Creature {
        Creature::new(1, "test", TypeSet::single(element)).with_stats(stats)
    }

    #[test]
    fn defense_factor_never_drops_below_one() {
        let rules = Rules::default();
        assert_eq!(defense_factor(0, 1, &rules), 1.0);
        assert_eq!(defense_factor(5, 50, &rules), 1.0);
        let factor = defense_factor(30, 10, &rules);
        assert!((factor - 30.0 / 11.5).abs() < 1e-9);
    }

    #[test]
    fn zero_and_unset_stats_still_deal_damage() {
        let rules = Rules::default();
        let weak = mon(ElementType::Normal, Stats {
            attack: Some(0),
            special_attack: Some(0),
            ..Stats::default()
        });
        let wall = mon(ElementType::Steel, Stats {
            defense: Some(u32::MAX),
            special_defense: Some(u32::MAX),
            ..Stats::default()
        });
        let mut rng = SmallRng::seed_from_u64(11);
        for special in [false, true] {
            for _ in 0..200 {
                let roll = resolve_attack(&weak, &wall, 1, 100, special, &rules, &mut rng);
                assert!(roll.damage >= 1);
            }
        }
        let blank = Creature::new(2, "blank", TypeSet::default());
        let roll = resolve_attack(&blank, &blank, 1, 1, false, &rules, &mut rng);
        assert!(roll.damage >= 1);
    }

    #[test]
    fn certain_critical_and_resist_apply_in_order() {
        let rules = Rules {
            min_base_damage: 40,
            crit_base_chance: 1.0,
            resist_chance_per_level: 1.0,
            attack_bonus_per_level: 0.0,
            ..Rules::default()
        };
        let attacker = mon(ElementType::Normal, Stats {
            attack: Some(40),
            ..Stats::default()
        });
        let defender = mon(ElementType::Normal, Stats {
            defense: Some(10),
            ..Stats::default()
        });
        let mut rng = SmallRng::seed_from_u64(5);
        let roll = resolve_attack(&attacker, &defender, 1, 1, false, &rules, &mut rng);
        assert!(roll.critical);
        assert!(roll.resisted);
        // 40 -> crit 60 -> resisted floor(60 * 0.7) = 42
        assert_eq!(roll.damage, 42);
    }

    #[test]
    fn special_attacks_use_special_stats_and_multiplier() {
        let rules = Rules {
            min_base_damage: 50,
            crit_base_chance: 0.0,
            crit_chance_per_level: 0.0,
            resist_chance_per_level: 0.0,
            attack_bonus_per_level: 0.0,
            ..Rules::default()
        };
        let attacker = mon(ElementType::Normal, Stats {
            attack: Some(1),
            special_attack: Some(50),
            ..Stats::default()
        });
        let defender = mon(ElementType::Normal, Stats::default());
        let mut rng = SmallRng::seed_from_u64(9);
        let roll = resolve_attack(&attacker, &defender, 1, 1, true, &rules, &mut rng);
        assert_eq!(roll.damage, 65);
        assert!(!roll.critical && !roll.resisted);
    }
}

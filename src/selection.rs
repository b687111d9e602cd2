//! Choosing which creature a trainer fields for a round.
//!
//! A living retained winner is always forced back in. Otherwise the
//! undefeated roster is handed to a [`SelectionStrategy`].

use crate::model::{Creature, CreatureId};
use crate::rules::Rules;
use crate::types::type_multiplier;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::HashSet;

/// A round winner carried into the next round with its remaining HP.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Retained {
    pub creature: CreatureId,
    pub hp: i32,
}

#[derive(Clone, Copy, Debug)]
pub enum Selection<'a> {
    Retained { creature: &'a Creature, hp: i32 },
    Picked(&'a Creature),
    NoneAvailable,
}

impl<'a> Selection<'a> {
    pub fn creature(&self) -> Option<&'a Creature> {
        match *self {
            Selection::Retained { creature, .. } | Selection::Picked(creature) => Some(creature),
            Selection::NoneAvailable => None,
        }
    }

    /// HP the creature enters with: carried HP when retained, otherwise its
    /// stored starting HP.
    pub fn entry_hp(&self, rules: &Rules) -> Option<i32> {
        match *self {
            Selection::Retained { hp, .. } => Some(hp),
            Selection::Picked(creature) => Some(creature.starting_hp(rules)),
            Selection::NoneAvailable => None,
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, Selection::Retained { .. })
    }
}

/// Picks one of `candidates` (never empty) and returns its index.
pub trait SelectionStrategy: Send + Sync {
    fn pick(&self, candidates: &[&Creature], opponent: Option<&Creature>, rng: &mut dyn RngCore) -> usize;

    fn name(&self) -> &'static str;
}

/// Counter-pick heuristic: type advantage against the known opponent plus
/// normalized offensive stats. With no opponent known yet, the candidate
/// with the highest attack + special attack.
#[derive(Clone, Copy, Debug, Default)]
pub struct CounterPick;

impl CounterPick {
    pub fn type_bonus(candidate: &Creature, opponent: &Creature) -> f64 {
        let multiplier = type_multiplier(candidate.types, opponent.types);
        if multiplier >= 2.0 {
            3.0
        } else if multiplier > 1.0 {
            1.0
        } else if multiplier <= 0.5 {
            -2.0
        } else {
            0.0
        }
    }

    pub fn scores(candidates: &[&Creature], opponent: &Creature) -> Vec<f64> {
        let max_attack = max_stat(candidates, |c| c.stats.attack);
        let max_special = max_stat(candidates, |c| c.stats.special_attack);
        let max_speed = max_stat(candidates, |c| c.stats.speed);
        candidates
            .iter()
            .map(|c| {
                Self::type_bonus(c, opponent)
                    + normalized(c.stats.attack, max_attack)
                    + normalized(c.stats.special_attack, max_special)
                    + normalized(c.stats.speed, max_speed)
            })
            .collect()
    }
}

impl SelectionStrategy for CounterPick {
    fn pick(&self, candidates: &[&Creature], opponent: Option<&Creature>, rng: &mut dyn RngCore) -> usize {
        let scores: Vec<f64> = match opponent {
            Some(opponent) => Self::scores(candidates, opponent),
            None => candidates.iter().map(|c| c.offense() as f64).collect(),
        };
        best_index(&scores, rng)
    }

    fn name(&self) -> &'static str {
        "counter-pick"
    }
}

/// Uniformly random choice.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPick;

impl SelectionStrategy for RandomPick {
    fn pick(&self, candidates: &[&Creature], _opponent: Option<&Creature>, rng: &mut dyn RngCore) -> usize {
        if candidates.is_empty() {
            return 0;
        }
        rng.gen_range(0..candidates.len())
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

fn max_stat(candidates: &[&Creature], stat: impl Fn(&Creature) -> Option<u32>) -> u32 {
    candidates
        .iter()
        .map(|c| stat(*c).unwrap_or(0))
        .max()
        .unwrap_or(0)
}

fn normalized(value: Option<u32>, max: u32) -> f64 {
    if max == 0 {
        0.0
    } else {
        value.unwrap_or(0) as f64 / max as f64
    }
}

/// Index of the maximum score; ties are broken uniformly at random.
fn best_index(scores: &[f64], rng: &mut dyn RngCore) -> usize {
    let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == best)
        .map(|(idx, _)| idx)
        .collect();
    tied.choose(rng).copied().unwrap_or(0)
}

/// Resolves the creature a side fields this round.
///
/// `roster` is the trainer's deduplicated roster; `defeated` the creatures it
/// has lost so far this match. A retained creature whose carried HP is not
/// positive is retired and excluded along with the defeated ones.
pub fn select_creature<'a>(
    roster: &[&'a Creature],
    defeated: &HashSet<CreatureId>,
    retained: Option<Retained>,
    opponent: Option<&Creature>,
    strategy: &dyn SelectionStrategy,
    rng: &mut dyn RngCore,
) -> Selection<'a> {
    let mut retired = None;
    if let Some(kept) = retained {
        match roster.iter().copied().find(|c| c.id == kept.creature) {
            Some(creature) if kept.hp > 0 && !defeated.contains(&kept.creature) => {
                return Selection::Retained {
                    creature,
                    hp: kept.hp,
                };
            }
            _ => retired = Some(kept.creature),
        }
    }

    let candidates: Vec<&'a Creature> = roster
        .iter()
        .copied()
        .filter(|c| !defeated.contains(&c.id) && Some(c.id) != retired)
        .collect();
    if candidates.is_empty() {
        return Selection::NoneAvailable;
    }
    let idx = strategy.pick(&candidates, opponent, rng);
    Selection::Picked(candidates.get(idx).copied().unwrap_or(candidates[0]))
}

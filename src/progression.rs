//! Post-match level gains and MVP designation.
//!
//! Nothing here mutates creatures or trainers; the results are delta records
//! for the caller's persistence layer to apply.

use crate::arena::RoundOutcome;
use crate::events::{BattleEvent, MatchWinner, RoundWinner, Side};
use crate::model::{Creature, CreatureId, Trainer, TrainerId};
use crate::rules::Rules;
use serde::{Deserialize, Serialize};

/// Per-creature totals across every round it fought in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub creature: CreatureId,
    pub trainer: TrainerId,
    pub side: Side,
    pub rounds: u32,
    pub wins: u32,
    pub damage: u64,
}

/// Keeps participants in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct ParticipationTracker {
    entries: Vec<ParticipantStats>,
}

impl ParticipationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, creature: CreatureId, trainer: TrainerId, side: Side, won: bool, damage: u64) {
        let idx = match self
            .entries
            .iter()
            .position(|e| e.creature == creature && e.trainer == trainer)
        {
            Some(idx) => idx,
            None => {
                self.entries.push(ParticipantStats {
                    creature,
                    trainer,
                    side,
                    rounds: 0,
                    wins: 0,
                    damage: 0,
                });
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[idx];
        entry.rounds += 1;
        entry.damage += damage;
        if won {
            entry.wins += 1;
        }
    }

    pub fn entries(&self) -> &[ParticipantStats] {
        &self.entries
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDelta {
    pub creature: CreatureId,
    pub trainer: TrainerId,
    pub from: u32,
    pub to: u32,
}

impl LevelDelta {
    pub fn gained(&self) -> u32 {
        self.to.saturating_sub(self.from)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerDelta {
    pub trainer: TrainerId,
    pub from: u32,
    pub to: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mvp {
    pub creature: CreatureId,
    pub trainer: TrainerId,
    pub wins: u32,
    pub damage: u64,
}

/// Ranking used to designate the MVP; larger keys rank higher.
pub trait MvpScorer: Send + Sync {
    fn key(&self, stats: &ParticipantStats) -> (u64, u64);
}

/// Round wins first, total damage dealt second.
#[derive(Clone, Copy, Debug, Default)]
pub struct WinsThenDamage;

impl MvpScorer for WinsThenDamage {
    fn key(&self, stats: &ParticipantStats) -> (u64, u64) {
        (stats.wins as u64, stats.damage)
    }
}

/// Highest key wins; on equal keys the earliest participant is kept.
pub fn select_mvp(participants: &[ParticipantStats], scorer: &dyn MvpScorer) -> Option<Mvp> {
    let mut best: Option<(&ParticipantStats, (u64, u64))> = None;
    for stats in participants {
        let key = scorer.key(stats);
        match best {
            Some((_, best_key)) if key <= best_key => {}
            _ => best = Some((stats, key)),
        }
    }
    best.map(|(stats, _)| Mvp {
        creature: stats.creature,
        trainer: stats.trainer,
        wins: stats.wins,
        damage: stats.damage,
    })
}

/// Levels earned by one participant of one round.
pub fn round_level_gain(turns: u32, won: bool, rules: &Rules) -> u32 {
    let turn_experience = (turns as f64 * rules.experience_per_turn).min(rules.max_turn_experience);
    let win_experience = if won { rules.win_experience } else { 0.0 };
    let experience = (rules.base_round_experience + turn_experience + win_experience)
        .min(rules.round_experience_cap);
    let levels = (experience / rules.experience_per_level).floor().max(0.0) as u32;
    levels.min(rules.max_levels_per_round)
}

/// Sums per-round gains for every participant and caps the result at the
/// maximum level. One delta per participant, in order of first appearance.
pub fn level_deltas(
    rounds: &[RoundOutcome],
    participants: &[ParticipantStats],
    trainers: [&Trainer; 2],
    rules: &Rules,
) -> Vec<LevelDelta> {
    participants
        .iter()
        .filter_map(|p| {
            let creature = trainers[p.side.index()].creature(p.creature)?;
            let gained: u32 = rounds
                .iter()
                .filter(|r| r.creatures[p.side.index()] == p.creature)
                .map(|r| round_level_gain(r.turns, r.winner == RoundWinner::Side(p.side), rules))
                .sum();
            Some(apply_gain(creature, p.trainer, gained, rules))
        })
        .collect()
}

fn apply_gain(creature: &Creature, trainer: TrainerId, gained: u32, rules: &Rules) -> LevelDelta {
    let from = creature.effective_level(rules);
    let to = from.saturating_add(gained).min(rules.max_level.max(1));
    LevelDelta {
        creature: creature.id,
        trainer,
        from,
        to,
    }
}

/// The winning trainer gains one trainer level, capped; draws grant nothing.
pub fn trainer_deltas(winner: MatchWinner, trainers: [&Trainer; 2], rules: &Rules) -> Vec<TrainerDelta> {
    let MatchWinner::Trainer(id) = winner else {
        return Vec::new();
    };
    trainers
        .iter()
        .filter(|t| t.id == id)
        .map(|t| {
            let cap = rules.max_trainer_level.max(1);
            let from = t.level.clamp(1, cap);
            TrainerDelta {
                trainer: t.id,
                from,
                to: (from + 1).min(cap),
            }
        })
        .collect()
}

pub fn level_up_events(deltas: &[LevelDelta]) -> Vec<BattleEvent> {
    deltas
        .iter()
        .filter(|d| d.gained() > 0)
        .map(|d| BattleEvent::LevelUp {
            creature: d.creature,
            from: d.from,
            to: d.to,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(creature: CreatureId, wins: u32, damage: u64) -> ParticipantStats {
        ParticipantStats {
            creature,
            trainer: 1,
            side: Side::A,
            rounds: 1,
            wins,
            damage,
        }
    }

    #[test]
    fn level_gain_follows_turns_and_victory() {
        let rules = Rules::default();
        // 10 + 0.4 -> 0 levels
        assert_eq!(round_level_gain(2, false, &rules), 0);
        // 10 + 0.4 + 15 -> 1 level
        assert_eq!(round_level_gain(2, true, &rules), 1);
        // 10 + 5 + 15 = 30 -> 1 level
        assert_eq!(round_level_gain(25, true, &rules), 1);
        // 10 + 6 + 15 = 31 -> 1 level; 10 + 20 + 15 capped at 40 -> 2 levels
        assert_eq!(round_level_gain(30, true, &rules), 1);
        assert_eq!(round_level_gain(500, true, &rules), 2);
        // loser needs 50 turns for a level
        assert_eq!(round_level_gain(49, false, &rules), 0);
        assert_eq!(round_level_gain(50, false, &rules), 1);
    }

    #[test]
    fn mvp_ranks_wins_before_damage_and_keeps_first_on_ties() {
        let participants = vec![stats(1, 1, 40), stats(2, 2, 10), stats(3, 2, 10), stats(4, 1, 500)];
        let mvp = select_mvp(&participants, &WinsThenDamage).unwrap();
        assert_eq!(mvp.creature, 2);
        assert!(select_mvp(&[], &WinsThenDamage).is_none());
    }

    #[test]
    fn alternate_scorer_can_be_plugged_in() {
        struct DamageOnly;
        impl MvpScorer for DamageOnly {
            fn key(&self, stats: &ParticipantStats) -> (u64, u64) {
                (stats.damage, 0)
            }
        }
        let participants = vec![stats(1, 2, 40), stats(2, 0, 90)];
        assert_eq!(select_mvp(&participants, &DamageOnly).unwrap().creature, 2);
    }

    #[test]
    fn tracker_accumulates_per_creature() {
        let mut tracker = ParticipationTracker::new();
        tracker.record(5, 1, Side::A, true, 30);
        tracker.record(9, 2, Side::B, false, 12);
        tracker.record(5, 1, Side::A, false, 8);
        let entries = tracker.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].creature, 5);
        assert_eq!((entries[0].rounds, entries[0].wins, entries[0].damage), (2, 1, 38));
    }

    #[test]
    fn creature_levels_stop_at_the_cap() {
        use crate::types::TypeSet;
        let rules = Rules::default();
        let a = Trainer::new(1, "Red", vec![Creature::new(7, "old", TypeSet::default()).with_level(99)]);
        let b = Trainer::new(2, "Blue", vec![Creature::new(8, "max", TypeSet::default()).with_level(100)]);
        let rounds = vec![RoundOutcome {
            round: 1,
            creatures: [7, 8],
            starting_hp: [100, 100],
            final_hp: [40, 0],
            damage: [100, 60],
            turns: 500,
            winner: RoundWinner::Side(Side::A),
        }];
        let mut tracker = ParticipationTracker::new();
        tracker.record(7, 1, Side::A, true, 100);
        tracker.record(8, 2, Side::B, false, 60);

        let deltas = level_deltas(&rounds, tracker.entries(), [&a, &b], &rules);
        assert_eq!(deltas[0], LevelDelta { creature: 7, trainer: 1, from: 99, to: 100 });
        assert_eq!(deltas[1].from, 100);
        assert_eq!(deltas[1].gained(), 0);
        let events = level_up_events(&deltas);
        assert_eq!(events, vec![BattleEvent::LevelUp { creature: 7, from: 99, to: 100 }]);

        let zero_cap = Rules { max_level: 0, ..Rules::default() };
        let deltas = level_deltas(&rounds, tracker.entries(), [&a, &b], &zero_cap);
        assert!(deltas.iter().all(|d| d.to >= d.from));
    }

    #[test]
    fn trainer_level_is_capped() {
        let rules = Rules::default();
        let mut veteran = Trainer::new(1, "Red", Vec::new());
        veteran.level = 10;
        let rookie = Trainer::new(2, "Blue", Vec::new());
        let deltas = trainer_deltas(MatchWinner::Trainer(1), [&veteran, &rookie], &rules);
        assert_eq!(deltas, vec![TrainerDelta { trainer: 1, from: 10, to: 10 }]);
        let deltas = trainer_deltas(MatchWinner::Trainer(2), [&veteran, &rookie], &rules);
        assert_eq!(deltas, vec![TrainerDelta { trainer: 2, from: 1, to: 2 }]);
        assert!(trainer_deltas(MatchWinner::Draw, [&veteran, &rookie], &rules).is_empty());
    }
}

//! Best-of-three match orchestration.
//!
//! Entry point: [`MatchRunner::run`] (or [`run_match`] with a seed). All
//! input checks happen up front; once the first round starts the match
//! always runs to completion.

use crate::battle::{simulate_duel, Entrant};
use crate::error::{MatchError, Result};
use crate::events::{BattleEvent, MatchWinner, RoundWinner, Side};
use crate::model::{Creature, CreatureId, MatchConfig, Trainer, TrainerId};
use crate::progression::{
    level_deltas, level_up_events, select_mvp, trainer_deltas, LevelDelta, Mvp, MvpScorer,
    ParticipantStats, ParticipationTracker, TrainerDelta, WinsThenDamage,
};
use crate::rules::Rules;
use crate::selection::{select_creature, CounterPick, RandomPick, Retained, Selection, SelectionStrategy};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    /// Indexed by side: `[A, B]`.
    pub creatures: [CreatureId; 2],
    pub starting_hp: [i32; 2],
    pub final_hp: [i32; 2],
    pub damage: [u64; 2],
    pub turns: u32,
    pub winner: RoundWinner,
}

/// HP a creature ended its last appearance with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpDelta {
    pub creature: CreatureId,
    pub trainer: TrainerId,
    pub current_hp: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub trainer_a: TrainerId,
    pub trainer_b: TrainerId,
    pub winner: MatchWinner,
    pub round_wins: [u32; 2],
    pub rounds: Vec<RoundOutcome>,
    /// Sides that had no eligible creature when a round was due.
    pub forfeited: Vec<Side>,
    /// Last round's two participants.
    pub final_hp: Vec<HpDelta>,
    pub hp_deltas: Vec<HpDelta>,
    pub level_deltas: Vec<LevelDelta>,
    pub trainer_deltas: Vec<TrainerDelta>,
    pub participants: Vec<ParticipantStats>,
    pub mvp: Option<Mvp>,
    pub events: Vec<BattleEvent>,
}

impl MatchResult {
    pub fn winner_side(&self) -> Option<Side> {
        match self.winner {
            MatchWinner::Trainer(id) if id == self.trainer_a => Some(Side::A),
            MatchWinner::Trainer(id) if id == self.trainer_b => Some(Side::B),
            _ => None,
        }
    }
}

/// One trainer's running state within a match.
struct Corner<'a> {
    trainer: &'a Trainer,
    roster: Vec<&'a Creature>,
    defeated: HashSet<CreatureId>,
    retained: Option<Retained>,
    last_fielded: Option<&'a Creature>,
    wins: u32,
}

/// Deduplicated roster minus creatures that cannot enter (stored HP at or
/// below zero, e.g. fainted in an earlier match).
fn eligible_roster<'a>(trainer: &'a Trainer, rules: &Rules) -> Vec<&'a Creature> {
    trainer
        .unique_roster()
        .into_iter()
        .filter(|c| c.starting_hp(rules) > 0)
        .collect()
}

impl<'a> Corner<'a> {
    fn new(trainer: &'a Trainer, rules: &Rules) -> Self {
        Corner {
            trainer,
            roster: eligible_roster(trainer, rules),
            defeated: HashSet::new(),
            retained: None,
            last_fielded: None,
            wins: 0,
        }
    }

    /// What the other side can see of this corner before picking: the
    /// creature it is forced to field, else the one it fielded last if that
    /// one can still come back.
    fn visible_creature(&self) -> Option<&'a Creature> {
        self.retained
            .filter(|r| r.hp > 0)
            .and_then(|r| self.roster.iter().copied().find(|c| c.id == r.creature))
            .or_else(|| self.last_fielded.filter(|c| !self.defeated.contains(&c.id)))
    }
}

pub struct MatchRunner {
    rules: Rules,
    smart: Box<dyn SelectionStrategy>,
    random: Box<dyn SelectionStrategy>,
    mvp: Box<dyn MvpScorer>,
}

impl Default for MatchRunner {
    fn default() -> Self {
        MatchRunner::new(Rules::default())
    }
}

impl MatchRunner {
    pub fn new(rules: Rules) -> Self {
        MatchRunner {
            rules,
            smart: Box::new(CounterPick),
            random: Box::new(RandomPick),
            mvp: Box::new(WinsThenDamage),
        }
    }

    /// Replaces the heuristic used when `smart_selection` is on.
    pub fn with_selection_strategy(mut self, strategy: impl SelectionStrategy + 'static) -> Self {
        self.smart = Box::new(strategy);
        self
    }

    pub fn with_mvp_scorer(mut self, scorer: impl MvpScorer + 'static) -> Self {
        self.mvp = Box::new(scorer);
        self
    }

    pub fn validate(&self, a: &Trainer, b: &Trainer, config: &MatchConfig) -> Result<()> {
        if config.trainer_id == config.opponent_id || a.id == b.id {
            return Err(MatchError::InvalidMatchup {
                trainer_id: config.trainer_id,
            });
        }
        for (expected, trainer) in [(config.trainer_id, a), (config.opponent_id, b)] {
            if trainer.id != expected {
                return Err(MatchError::UnknownTrainer {
                    expected,
                    found: trainer.id,
                });
            }
        }
        for trainer in [a, b] {
            if eligible_roster(trainer, &self.rules).is_empty() {
                return Err(MatchError::EmptyRoster {
                    trainer_id: trainer.id,
                });
            }
        }
        Ok(())
    }

    pub fn run<R: RngCore>(
        &self,
        a: &Trainer,
        b: &Trainer,
        config: &MatchConfig,
        rng: &mut R,
    ) -> Result<MatchResult> {
        self.validate(a, b, config)?;
        let rng: &mut dyn RngCore = rng;
        let rules = &self.rules;
        let strategy: &dyn SelectionStrategy = if config.smart_selection {
            self.smart.as_ref()
        } else {
            self.random.as_ref()
        };

        let mut corners = [Corner::new(a, rules), Corner::new(b, rules)];
        let mut rounds: Vec<RoundOutcome> = Vec::new();
        let mut events: Vec<BattleEvent> = Vec::new();
        let mut forfeited: Vec<Side> = Vec::new();
        let mut tracker = ParticipationTracker::new();
        let mut hp_deltas: Vec<HpDelta> = Vec::new();

        for round in 1..=rules.max_rounds {
            if corners.iter().any(|c| c.wins >= rules.rounds_to_win) {
                break;
            }

            let hints = [corners[1].visible_creature(), corners[0].visible_creature()];
            let mut picks = [Selection::NoneAvailable, Selection::NoneAvailable];
            for side in [Side::A, Side::B] {
                let corner = &corners[side.index()];
                picks[side.index()] = select_creature(
                    &corner.roster,
                    &corner.defeated,
                    corner.retained,
                    hints[side.index()],
                    strategy,
                    rng,
                );
            }

            let (entrant_a, entrant_b) = match (entrant(&picks[0], rules), entrant(&picks[1], rules)) {
                (Some(entrant_a), Some(entrant_b)) => (entrant_a, entrant_b),
                (entrant_a, entrant_b) => {
                    if entrant_a.is_none() {
                        forfeited.push(Side::A);
                    }
                    if entrant_b.is_none() {
                        forfeited.push(Side::B);
                    }
                    warn!(round, ?forfeited, "no eligible creature left to field");
                    break;
                }
            };

            for (side, entrant, pick) in [(Side::A, &entrant_a, &picks[0]), (Side::B, &entrant_b, &picks[1])] {
                debug!(
                    round,
                    ?side,
                    creature = entrant.creature.id,
                    hp = entrant.hp,
                    forced = pick.is_forced(),
                    strategy = strategy.name(),
                    "creature sent out"
                );
                events.push(BattleEvent::SentOut {
                    round,
                    side,
                    creature: entrant.creature.id,
                    hp: entrant.hp,
                    forced: pick.is_forced(),
                });
            }

            let report = simulate_duel(entrant_a, entrant_b, round, rules, rng)?;
            let ids = [entrant_a.creature.id, entrant_b.creature.id];
            let winner = report.winner();
            debug!(round, ?winner, turns = report.turns, final_hp = ?report.final_hp, "round finished");

            for side in [Side::A, Side::B] {
                let i = side.index();
                let won = winner == RoundWinner::Side(side);
                tracker.record(ids[i], corners[i].trainer.id, side, won, report.damage_dealt[i]);
                record_hp(&mut hp_deltas, ids[i], corners[i].trainer.id, report.final_hp[i]);
                corners[i].last_fielded = Some(if i == 0 { entrant_a.creature } else { entrant_b.creature });
                corners[i].retained = None;
            }
            match winner {
                RoundWinner::Side(side) => {
                    let (w, l) = (side.index(), side.opponent().index());
                    corners[w].wins += 1;
                    corners[l].defeated.insert(ids[l]);
                    if config.retain_winner {
                        corners[w].retained = Some(Retained {
                            creature: ids[w],
                            hp: report.final_hp[w],
                        });
                    }
                }
                RoundWinner::Draw => {
                    corners[0].defeated.insert(ids[0]);
                    corners[1].defeated.insert(ids[1]);
                }
            }

            rounds.push(RoundOutcome {
                round,
                creatures: ids,
                starting_hp: [entrant_a.hp, entrant_b.hp],
                final_hp: report.final_hp,
                damage: report.damage_dealt,
                turns: report.turns,
                winner,
            });
            events.extend(report.events);
        }

        let round_wins = [corners[0].wins, corners[1].wins];
        let winner = decide_winner(&forfeited, round_wins, [a.id, b.id]);
        info!(
            trainer_a = a.id,
            trainer_b = b.id,
            ?winner,
            ?round_wins,
            rounds = rounds.len(),
            "match finished"
        );

        let participants = tracker.entries().to_vec();
        let level_deltas = level_deltas(&rounds, &participants, [a, b], rules);
        let trainer_deltas = trainer_deltas(winner, [a, b], rules);
        let mvp = select_mvp(&participants, self.mvp.as_ref());
        events.extend(level_up_events(&level_deltas));
        events.push(BattleEvent::MatchResult { winner });

        let final_hp = rounds
            .last()
            .map(|r| {
                (0..2)
                    .map(|i| HpDelta {
                        creature: r.creatures[i],
                        trainer: corners[i].trainer.id,
                        current_hp: r.final_hp[i],
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(MatchResult {
            trainer_a: a.id,
            trainer_b: b.id,
            winner,
            round_wins,
            rounds,
            forfeited,
            final_hp,
            hp_deltas,
            level_deltas,
            trainer_deltas,
            participants,
            mvp,
            events,
        })
    }
}

fn entrant<'a>(selection: &Selection<'a>, rules: &Rules) -> Option<Entrant<'a>> {
    let creature = selection.creature()?;
    let hp = selection.entry_hp(rules)?;
    Some(Entrant::with_hp(creature, hp))
}

fn record_hp(deltas: &mut Vec<HpDelta>, creature: CreatureId, trainer: TrainerId, hp: i32) {
    match deltas
        .iter_mut()
        .find(|d| d.creature == creature && d.trainer == trainer)
    {
        Some(delta) => delta.current_hp = hp,
        None => deltas.push(HpDelta {
            creature,
            trainer,
            current_hp: hp,
        }),
    }
}

/// A single side unable to field loses by default; both unable is a draw.
/// Otherwise more round wins takes the match and equal wins draw.
fn decide_winner(forfeited: &[Side], round_wins: [u32; 2], trainers: [TrainerId; 2]) -> MatchWinner {
    match forfeited {
        [side] => MatchWinner::Trainer(trainers[side.opponent().index()]),
        [_, _] => MatchWinner::Draw,
        _ => match round_wins[0].cmp(&round_wins[1]) {
            std::cmp::Ordering::Greater => MatchWinner::Trainer(trainers[0]),
            std::cmp::Ordering::Less => MatchWinner::Trainer(trainers[1]),
            std::cmp::Ordering::Equal => MatchWinner::Draw,
        },
    }
}

/// Runs a match with the default rules and strategies on a seeded `SmallRng`.
pub fn run_match(a: &Trainer, b: &Trainer, config: &MatchConfig, seed: u64) -> Result<MatchResult> {
    let mut rng = SmallRng::seed_from_u64(seed);
    MatchRunner::default().run(a, b, config, &mut rng)
}

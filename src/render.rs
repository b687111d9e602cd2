//! Plain-text rendering of the battle log, one line per event.

use crate::events::{BattleEvent, MatchWinner, RoundWinner, Side};
use crate::model::{CreatureId, Trainer, TrainerId};
use std::collections::HashMap;

/// Display names for the ids that appear in events.
#[derive(Clone, Debug, Default)]
pub struct NameBook {
    creatures: HashMap<CreatureId, String>,
    trainers: HashMap<TrainerId, String>,
    sides: [String; 2],
}

impl NameBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_match(a: &Trainer, b: &Trainer) -> Self {
        let mut book = NameBook::new();
        for (side, trainer) in [(Side::A, a), (Side::B, b)] {
            book.sides[side.index()] = trainer.name.clone();
            book.trainers.insert(trainer.id, trainer.name.clone());
            for creature in &trainer.roster {
                book.creatures
                    .entry(creature.id)
                    .or_insert_with(|| creature.name.clone());
            }
        }
        book
    }

    pub fn creature(&self, id: CreatureId) -> String {
        self.creatures
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    }

    pub fn trainer(&self, id: TrainerId) -> String {
        self.trainers
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("trainer #{id}"))
    }

    pub fn side(&self, side: Side) -> String {
        let name = &self.sides[side.index()];
        if name.is_empty() {
            format!("side {side:?}")
        } else {
            name.clone()
        }
    }
}

pub fn render_event(event: &BattleEvent, names: &NameBook) -> String {
    match event {
        BattleEvent::SentOut {
            round,
            side,
            creature,
            hp,
            forced,
        } => {
            let verb = if *forced { "keeps" } else { "sends out" };
            format!(
                "[round {round}] {} {verb} {} ({hp} HP)",
                names.side(*side),
                names.creature(*creature)
            )
        }
        BattleEvent::Attack {
            round,
            attacker,
            defender,
            move_name,
            damage,
            critical,
            resisted,
            multiplier,
            remaining_hp,
            counter,
            ..
        } => {
            let mut line = format!(
                "[round {round}] {} used {move_name} on {}: {damage} damage, {remaining_hp} HP left",
                names.creature(*attacker),
                names.creature(*defender)
            );
            if *counter {
                line.push_str(" (counter)");
            }
            if *critical {
                line.push_str(" (critical)");
            }
            if *resisted {
                line.push_str(" (resisted)");
            }
            if *multiplier > 1.0 {
                line.push_str(" (super effective)");
            } else if *multiplier < 1.0 {
                line.push_str(" (not very effective)");
            }
            line
        }
        BattleEvent::Faint {
            round, creature, ..
        } => format!("[round {round}] {} fainted", names.creature(*creature)),
        BattleEvent::RoundResult {
            round,
            winner,
            turns,
        } => match winner {
            RoundWinner::Side(side) => format!(
                "[round {round}] {} takes the round after {turns} turns",
                names.side(*side)
            ),
            RoundWinner::Draw => format!("[round {round}] double knockout after {turns} turns"),
        },
        BattleEvent::LevelUp { creature, from, to } => {
            format!("{} grew from level {from} to {to}", names.creature(*creature))
        }
        BattleEvent::MatchResult { winner } => match winner {
            MatchWinner::Trainer(id) => format!("{} wins the match", names.trainer(*id)),
            MatchWinner::Draw => "the match is a draw".to_string(),
        },
    }
}

pub fn render_events(events: &[BattleEvent], names: &NameBook) -> Vec<String> {
    events.iter().map(|e| render_event(e, names)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Creature;
    use crate::types::TypeSet;

    #[test]
    fn lines_use_display_names() {
        let a = Trainer::new(1, "Ash", vec![Creature::new(25, "Pikachu", TypeSet::default())]);
        let b = Trainer::new(2, "Gary", vec![Creature::new(7, "Squirtle", TypeSet::default())]);
        let names = NameBook::for_match(&a, &b);
        let lines = render_events(
            &[
                BattleEvent::SentOut {
                    round: 1,
                    side: Side::A,
                    creature: 25,
                    hp: 35,
                    forced: false,
                },
                BattleEvent::Faint {
                    round: 1,
                    side: Side::B,
                    creature: 7,
                },
                BattleEvent::MatchResult {
                    winner: MatchWinner::Trainer(1),
                },
            ],
            &names,
        );
        assert_eq!(lines[0], "[round 1] Ash sends out Pikachu (35 HP)");
        assert_eq!(lines[1], "[round 1] Squirtle fainted");
        assert_eq!(lines[2], "Ash wins the match");
    }

    #[test]
    fn unknown_ids_fall_back_to_numbers() {
        let names = NameBook::new();
        assert_eq!(names.creature(3), "#3");
        assert_eq!(names.side(Side::B), "side B");
    }
}

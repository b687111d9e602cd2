//! Structured, append-only battle log.

use crate::model::{CreatureId, TrainerId};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundWinner {
    Side(Side),
    Draw,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchWinner {
    Trainer(TrainerId),
    Draw,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BattleEvent {
    SentOut {
        round: u32,
        side: Side,
        creature: CreatureId,
        hp: i32,
        forced: bool,
    },
    Attack {
        round: u32,
        turn: u32,
        side: Side,
        attacker: CreatureId,
        defender: CreatureId,
        move_name: String,
        damage: u32,
        critical: bool,
        resisted: bool,
        special: bool,
        multiplier: f64,
        remaining_hp: i32,
        /// Final strike of a creature that has just fainted.
        counter: bool,
    },
    Faint {
        round: u32,
        side: Side,
        creature: CreatureId,
    },
    RoundResult {
        round: u32,
        winner: RoundWinner,
        turns: u32,
    },
    LevelUp {
        creature: CreatureId,
        from: u32,
        to: u32,
    },
    MatchResult {
        winner: MatchWinner,
    },
}

impl BattleEvent {
    pub fn round(&self) -> Option<u32> {
        match self {
            BattleEvent::SentOut { round, .. }
            | BattleEvent::Attack { round, .. }
            | BattleEvent::Faint { round, .. }
            | BattleEvent::RoundResult { round, .. } => Some(*round),
            BattleEvent::LevelUp { .. } | BattleEvent::MatchResult { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = BattleEvent::Faint {
            round: 2,
            side: Side::B,
            creature: 9,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "faint");
        assert_eq!(json["side"], "B");
        assert_eq!(event.round(), Some(2));
    }
}

//! Caller input errors rejected before any round runs.

use crate::model::{CreatureId, TrainerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("trainer {trainer_id} cannot battle itself")]
    InvalidMatchup { trainer_id: TrainerId },

    #[error("match config names trainer {expected} but trainer {found} was supplied")]
    UnknownTrainer {
        expected: TrainerId,
        found: TrainerId,
    },

    #[error("trainer {trainer_id} has no eligible creatures")]
    EmptyRoster { trainer_id: TrainerId },

    #[error("creature {creature_id} cannot enter battle with {hp} HP")]
    InvalidCreatureState { creature_id: CreatureId, hp: i32 },
}

pub type Result<T> = std::result::Result<T, MatchError>;

use crate::arena::MatchRunner;
use crate::error::Result;
use crate::events::Side;
use crate::model::{MatchConfig, Trainer};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub matches: u64,
    pub a_wins: u64,
    pub b_wins: u64,
    pub draws: u64,
}

impl SeriesSummary {
    /// Share of matches won by side A, draws counted as half a win.
    pub fn a_win_rate(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        (self.a_wins as f64 + 0.5 * self.draws as f64) / self.matches as f64
    }

    fn add(mut self, winner: Option<Side>) -> Self {
        self.matches += 1;
        match winner {
            Some(Side::A) => self.a_wins += 1,
            Some(Side::B) => self.b_wins += 1,
            None => self.draws += 1,
        }
        self
    }
}

/// Per-match seed: batch seed mixed with the match index.
pub fn match_seed(seed: u64, idx: u64) -> u64 {
    seed ^ idx.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Plays `matches` independent matches in parallel. Inputs are validated
/// once before any match runs, so an invalid pairing fails without work.
pub fn run_series(
    a: &Trainer,
    b: &Trainer,
    config: &MatchConfig,
    runner: &MatchRunner,
    matches: u64,
    seed: u64,
) -> Result<SeriesSummary> {
    runner.validate(a, b, config)?;
    let outcomes: Vec<Option<Side>> = (0..matches)
        .into_par_iter()
        .map(|idx| {
            let mut rng = SmallRng::seed_from_u64(match_seed(seed, idx));
            runner.run(a, b, config, &mut rng).map(|result| result.winner_side())
        })
        .collect::<Result<_>>()?;
    Ok(outcomes
        .into_iter()
        .fold(SeriesSummary::default(), SeriesSummary::add))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_counts_draws_as_half() {
        let summary = SeriesSummary {
            matches: 4,
            a_wins: 1,
            b_wins: 1,
            draws: 2,
        };
        assert!((summary.a_win_rate() - 0.5).abs() < 1e-12);
        assert_eq!(SeriesSummary::default().a_win_rate(), 0.0);
    }

    #[test]
    fn outcomes_are_tallied_per_side() {
        let total = SeriesSummary::default()
            .add(Some(Side::A))
            .add(None)
            .add(Some(Side::B));
        assert_eq!(
            total,
            SeriesSummary {
                matches: 3,
                a_wins: 1,
                b_wins: 1,
                draws: 1
            }
        );
    }

    #[test]
    fn match_seeds_differ_per_index() {
        assert_ne!(match_seed(7, 0), match_seed(7, 1));
        assert_eq!(match_seed(7, 0), 7);
    }
}

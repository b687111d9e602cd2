pub mod arena;
pub mod battle;
pub mod damage;
pub mod error;
pub mod events;
pub mod model;
pub mod progression;
pub mod render;
pub mod rules;
pub mod selection;
pub mod series;
pub mod types;

pub use crate::arena::{run_match, MatchResult, MatchRunner};
pub use crate::error::MatchError;
pub use crate::events::{BattleEvent, MatchWinner, RoundWinner, Side};
pub use crate::model::{Creature, MatchConfig, Stats, Trainer};
pub use crate::rules::Rules;
pub use crate::types::{type_multiplier, ElementType, TypeSet};

use crate::render::{render_events, NameBook};
use crate::rules::load_rules;
use crate::series::run_series;
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk description of one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFile {
    pub trainer_a: Trainer,
    pub trainer_b: Trainer,
    pub config: Option<MatchConfig>,
}

impl MatchFile {
    /// The stored config, or defaults pairing the two trainers in file order.
    pub fn config(&self) -> MatchConfig {
        self.config
            .clone()
            .unwrap_or_else(|| MatchConfig::for_trainers(&self.trainer_a, &self.trainer_b))
    }
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub match_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub seed: u64,
    pub series: Option<u64>,
    pub output_path: Option<PathBuf>,
    pub print_log: bool,
}

pub fn load_match_file(path: &Path) -> anyhow::Result<MatchFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read match file at {}", path.display()))?;
    let parsed: MatchFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    Ok(parsed)
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    let file = load_match_file(&opts.match_path)?;
    let rules = match &opts.rules_path {
        Some(path) => load_rules(path)?,
        None => Rules::default(),
    };
    let config = file.config();
    let runner = MatchRunner::new(rules);

    let json = match opts.series {
        Some(0) => anyhow::bail!("--series must be > 0"),
        Some(matches) => {
            let summary = run_series(&file.trainer_a, &file.trainer_b, &config, &runner, matches, opts.seed)
                .context("Series aborted")?;
            eprintln!(
                "{} matches: {} won {:.1}% (draws count half)",
                summary.matches,
                file.trainer_a.name,
                summary.a_win_rate() * 100.0
            );
            serde_json::to_string_pretty(&summary)?
        }
        None => {
            let mut rng = SmallRng::seed_from_u64(opts.seed);
            let result = runner
                .run(&file.trainer_a, &file.trainer_b, &config, &mut rng)
                .context("Match rejected")?;
            if opts.print_log {
                let names = NameBook::for_match(&file.trainer_a, &file.trainer_b);
                for line in render_events(&result.events, &names) {
                    eprintln!("{line}");
                }
            }
            serde_json::to_string_pretty(&result)?
        }
    };

    match &opts.output_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote result to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

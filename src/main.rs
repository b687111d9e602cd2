use std::env;
use std::path::PathBuf;
use trainer_battle_engine::{run, CliOptions};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: trainer-battle --match match.json [--rules rules.json] [--seed SEED] [--series N] \
[--output result.json] [--log]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut match_path = None;
    let mut rules_path = None;
    let mut seed = 0u64;
    let mut series = None;
    let mut output_path = None;
    let mut print_log = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--match" => {
                match_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--match requires a path (e.g. --match match.json)")
                })?);
            }
            "--rules" => {
                rules_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--rules requires a path (e.g. --rules rules.json)")
                })?);
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--series" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--series requires a number"))?;
                series = Some(val.parse()?);
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output result.json)")
                })?);
            }
            "--log" => print_log = true,
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    let Some(match_path) = match_path else {
        usage();
    };
    Ok(CliOptions {
        match_path,
        rules_path,
        seed,
        series,
        output_path,
        print_log,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
    let opts = parse_args()?;
    run(opts)
}

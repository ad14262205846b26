//! # dsa-engine
//!
//! Line-oriented driver: reads one JSON operation per stdin line and writes one
//! JSON outcome per stdout line.
//!
//! Run with: `echo '{"kind":"insert","value":5}' | cargo run -- avl`

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dsa_engine::config::EngineConfig;
use dsa_engine::operation::{build, ContainerKind, Operation, Outcome};

const USAGE: &str = "usage: dsa-engine <container-kind> [--capacity N] [--policy P] \
                     [--max-level N] [--probability P] [--seed N]";

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn config_from_args(args: &[String]) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();

    if let Some(capacity) = flag(args, "--capacity") {
        config.hash_table.capacity = capacity
            .parse()
            .context("--capacity expects a positive integer")?;
    }
    if let Some(policy) = flag(args, "--policy") {
        config.hash_table.policy = policy.parse()?;
    }
    if let Some(max_level) = flag(args, "--max-level") {
        config.skip_list.max_level = max_level
            .parse()
            .context("--max-level expects a positive integer")?;
    }
    if let Some(p) = flag(args, "--probability") {
        config.skip_list.promotion_probability =
            p.parse().context("--probability expects a number")?;
    }
    if let Some(seed) = flag(args, "--seed") {
        config.skip_list.seed = Some(seed.parse().context("--seed expects an integer")?);
    }

    config.validate()?;

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let kind: ContainerKind = args.get(1).context(USAGE)?.parse()?;
    let config = config_from_args(&args)?;
    let mut container = build(kind, &config)?;

    info!(container = %kind, "reading operations from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for (idx, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<Operation>(&line) {
            Ok(op) => container.apply(&op),
            Err(err) => {
                warn!(line = idx + 1, %err, "malformed operation");
                Outcome {
                    success: false,
                    message: format!("malformed operation: {err}"),
                    found: None,
                    values: None,
                }
            }
        };

        serde_json::to_writer(&mut stdout, &outcome)?;
        writeln!(stdout)?;
    }

    info!(len = container.len(), "input exhausted");

    Ok(())
}

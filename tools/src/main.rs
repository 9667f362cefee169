//! feed-runner: headless analysis runner for a transaction feed.
//!
//! Usage:
//!   feed-runner --feed transactions.json [--config analysis.json]
//!   feed-runner --feed transactions.json --customer 3
//!   feed-runner --generate --seed 12345 --customers 20 --out feed.json
//!   feed-runner --generate --seed 12345 --json

use anyhow::{Context, Result};
use feedlens_core::{
    config::AnalysisConfig,
    engine::{FeedAnalyzer, FeedReport},
    feed_generator::{FeedGenerator, GeneratorParams},
    snapshot::FeedSnapshot,
};
use std::collections::BTreeMap;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let generate = args.iter().any(|a| a == "--generate");
    let json_output = args.iter().any(|a| a == "--json");
    let feed_path = string_arg(&args, "--feed");
    let config_path = string_arg(&args, "--config");
    let out_path = string_arg(&args, "--out");
    let customer = args
        .windows(2)
        .find(|w| w[0] == "--customer")
        .and_then(|w| w[1].parse::<i64>().ok());

    let config = match config_path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    let snapshot = if generate {
        let defaults = GeneratorParams::default();
        let params = GeneratorParams {
            customers: parse_arg(&args, "--customers", defaults.customers),
            lifecycles: parse_arg(&args, "--lifecycles", defaults.lifecycles),
            shared_devices: parse_arg(&args, "--shared-devices", defaults.shared_devices),
            transfers: parse_arg(&args, "--transfers", defaults.transfers),
            start: defaults.start,
        };
        let seed = parse_arg(&args, "--seed", 42u64);
        let feed = FeedGenerator::new(seed, params).generate();
        if let Some(path) = out_path {
            std::fs::write(path, serde_json::to_string_pretty(&feed)?)
                .with_context(|| format!("Cannot write {path}"))?;
            log::info!("Wrote generated feed to {path}");
        }
        FeedSnapshot::from_transactions(seed, feed, &config.limits)?
    } else {
        let path = feed_path.context("either --feed <path> or --generate is required")?;
        FeedSnapshot::from_path(1, path, &config.limits)
            .with_context(|| format!("Cannot load feed {path}"))?
    };

    let analyzer = FeedAnalyzer::new(config);
    let report = analyzer.analyze(&snapshot)?;

    match customer {
        Some(customer_id) => {
            let view = report.for_customer(customer_id, analyzer.config.relation_dedup);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        None if json_output => println!("{}", serde_json::to_string_pretty(&report)?),
        None => print_summary(&analyzer, &snapshot, &report),
    }

    Ok(())
}

fn print_summary(analyzer: &FeedAnalyzer, snapshot: &FeedSnapshot, report: &FeedReport) {
    let multi_step = report
        .aggregates
        .iter()
        .filter(|a| a.updated_at.is_some())
        .count();

    let mut by_type: BTreeMap<&'static str, usize> = BTreeMap::new();
    for r in &report.relations {
        *by_type.entry(r.relation_type.as_str()).or_default() += 1;
    }

    println!("=== FEED SUMMARY ===");
    println!("  snapshot:       v{}", snapshot.version);
    println!("  transactions:   {}", snapshot.len());
    println!("  lifecycles:     {}", report.aggregates.len());
    println!("  multi-step:     {multi_step}");
    println!("  detectors:      {}", analyzer.detector_names().join(", "));
    println!("  relation edges: {}", report.relations.len());

    println!();
    println!("=== RELATIONS BY TYPE ===");
    if by_type.is_empty() {
        println!("  (No related customers found)");
    } else {
        for (relation_type, count) in &by_type {
            println!("  {relation_type:<14} {count}");
        }
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

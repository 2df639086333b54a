use std::path::PathBuf;

use anyhow::{Context, Result};

use ipl_insights::clean::clean_tables;
use ipl_insights::dataset::load_tables;
use ipl_insights::kpis::compute_kpis;
use ipl_insights::persist::{
    dataset_fingerprint, load_cached_report, save_report, store_cached_report,
};

struct Args {
    matches_path: PathBuf,
    deliveries_path: PathBuf,
    out_dir: PathBuf,
    no_cache: bool,
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let raw = load_tables(&args.matches_path, &args.deliveries_path)?;
    let (matches, deliveries, clean_summary) = clean_tables(&raw);

    println!(
        "Loaded {} matches ({} kept), {} deliveries ({} kept)",
        clean_summary.matches_in,
        clean_summary.matches_kept,
        clean_summary.deliveries_in,
        clean_summary.deliveries_kept
    );
    for warning in &clean_summary.warnings {
        println!("Warning: {warning}");
    }

    let fingerprint = dataset_fingerprint(&args.matches_path, &args.deliveries_path)
        .context("fingerprint input files")?;

    let (report, from_cache) = if args.no_cache {
        (compute_kpis(&matches, &deliveries), false)
    } else {
        match load_cached_report(&args.out_dir, &fingerprint) {
            Some(cached) => (cached, true),
            None => (compute_kpis(&matches, &deliveries), false),
        }
    };

    for err in &report.errors {
        println!("Warning: kpi failed: {err}");
    }

    let save = save_report(&args.out_dir, &report);
    for warning in &save.warnings {
        println!("Warning: {warning}");
    }

    if !args.no_cache && !from_cache {
        if let Err(err) = store_cached_report(&args.out_dir, &fingerprint, &report) {
            println!("Warning: cache write failed: {err}");
        }
    }

    println!(
        "KPI run complete: {} artifacts in {}{}",
        save.files_written.len(),
        args.out_dir.display(),
        if from_cache { " (from cache)" } else { "" }
    );
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        matches_path: PathBuf::from("data/matches.csv"),
        deliveries_path: PathBuf::from("data/deliveries.csv"),
        out_dir: PathBuf::from("data/precomputed_stats"),
        no_cache: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--matches" => {
                args.matches_path = PathBuf::from(next_value(&mut iter, "--matches")?);
            }
            "--deliveries" => {
                args.deliveries_path = PathBuf::from(next_value(&mut iter, "--deliveries")?);
            }
            "--out" => {
                args.out_dir = PathBuf::from(next_value(&mut iter, "--out")?);
            }
            "--no-cache" => args.no_cache = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                print_usage();
                return Err(anyhow::anyhow!("unknown argument: {other}"));
            }
        }
    }
    Ok(args)
}

fn next_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))
}

fn print_usage() {
    println!("Usage: ipl_insights [--matches PATH] [--deliveries PATH] [--out DIR] [--no-cache]");
    println!("Computes dashboard KPI tables from the matches and deliveries CSVs.");
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use ipl_insights::sample::{SampleConfig, generate};

fn main() -> Result<()> {
    let (out_dir, config) = parse_args()?;
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    let tables = generate(&config);
    write_csv(&out_dir.join("matches.csv"), &tables.matches)?;
    write_csv(&out_dir.join("deliveries.csv"), &tables.deliveries)?;

    println!("Sample dataset written to {}", out_dir.display());
    println!(
        "Matches: {}  Deliveries: {}  Seed: {}",
        tables.matches.len(),
        tables.deliveries.len(),
        config.seed
    );
    Ok(())
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("open {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("write csv row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

fn parse_args() -> Result<(PathBuf, SampleConfig)> {
    let mut out_dir = PathBuf::from("data");
    let mut config = SampleConfig::default();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => out_dir = PathBuf::from(value(&mut iter, "--out")?),
            "--seasons" => config.seasons = value(&mut iter, "--seasons")?.parse()?,
            "--matches-per-season" => {
                config.matches_per_season = value(&mut iter, "--matches-per-season")?.parse()?;
            }
            "--seed" => config.seed = value(&mut iter, "--seed")?.parse()?,
            "--help" | "-h" => {
                println!(
                    "Usage: gen_sample [--out DIR] [--seasons N] [--matches-per-season N] [--seed N]"
                );
                std::process::exit(0);
            }
            other => return Err(anyhow!("unknown argument: {other}")),
        }
    }
    Ok((out_dir, config))
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next().ok_or_else(|| anyhow!("{flag} requires a value"))
}

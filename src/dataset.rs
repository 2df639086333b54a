use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// One row of the matches table, exactly as it appears on disk.
/// Optional fields are the ones the source data leaves blank for
/// abandoned or rain-affected games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    pub id: u64,
    pub season: String,
    pub city: Option<String>,
    pub venue: Option<String>,
    pub team1: String,
    pub team2: String,
    pub toss_winner: Option<String>,
    pub winner: Option<String>,
    pub result_margin: Option<f64>,
    pub method: Option<String>,
    pub player_of_match: Option<String>,
}

/// One ball of the deliveries table. `dismissal_kind`, `player_dismissed`
/// and `fielder` are blank on every ball without a wicket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDelivery {
    pub match_id: u64,
    pub batting_team: Option<String>,
    pub bowling_team: Option<String>,
    pub batter: String,
    pub bowler: String,
    pub batsman_runs: u32,
    pub total_runs: u32,
    pub extras_type: Option<String>,
    pub player_dismissed: Option<String>,
    pub dismissal_kind: Option<String>,
    pub fielder: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RawTables {
    pub matches: Vec<RawMatch>,
    pub deliveries: Vec<RawDelivery>,
}

/// Load both input tables. Either file missing is fatal before any
/// parsing starts, so a half-loaded dataset never reaches the cleaner.
pub fn load_tables(matches_path: &Path, deliveries_path: &Path) -> Result<RawTables> {
    if !matches_path.is_file() || !deliveries_path.is_file() {
        return Err(anyhow!(
            "dataset files not found: {} / {}",
            matches_path.display(),
            deliveries_path.display()
        ));
    }
    let matches = load_matches(matches_path)?;
    let deliveries = load_deliveries(deliveries_path)?;
    Ok(RawTables {
        matches,
        deliveries,
    })
}

pub fn load_matches(path: &Path) -> Result<Vec<RawMatch>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open matches csv {}", path.display()))?;
    let mut out = Vec::new();
    for row in reader.deserialize() {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}

pub fn load_deliveries(path: &Path) -> Result<Vec<RawDelivery>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open deliveries csv {}", path.display()))?;
    let mut out = Vec::new();
    for row in reader.deserialize() {
        out.push(row.context("decode delivery row")?);
    }
    Ok(out)
}

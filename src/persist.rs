use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::kpis::{Kpi, KpiReport, KpiTable};

const CACHE_FILE: &str = "kpi_cache.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    fingerprint: String,
    generated_at: String,
    report: KpiReport,
}

#[derive(Debug, Clone, Default)]
pub struct SaveSummary {
    pub files_written: Vec<String>,
    pub warnings: Vec<String>,
}

/// SHA-256 over the raw bytes of both input files. Two runs over identical
/// inputs always agree, so the cached report can stand in for a recompute.
pub fn dataset_fingerprint(matches_path: &Path, deliveries_path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in [matches_path, deliveries_path] {
        let bytes =
            fs::read(path).with_context(|| format!("read {} for fingerprint", path.display()))?;
        hasher.update(&bytes);
    }
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Return the cached report if the cache file exists, carries the current
/// version, and was generated from the same inputs. Any mismatch or parse
/// failure means recompute.
pub fn load_cached_report(out_dir: &Path, fingerprint: &str) -> Option<KpiReport> {
    let path = out_dir.join(CACHE_FILE);
    let raw = fs::read_to_string(&path).ok()?;
    let cache = serde_json::from_str::<CacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION || cache.fingerprint != fingerprint {
        return None;
    }
    Some(cache.report)
}

pub fn store_cached_report(out_dir: &Path, fingerprint: &str, report: &KpiReport) -> Result<()> {
    let cache = CacheFile {
        version: CACHE_VERSION,
        fingerprint: fingerprint.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        report: report.clone(),
    };
    let json = serde_json::to_string(&cache).context("encode kpi cache")?;
    write_atomic(&out_dir.join(CACHE_FILE), &json)
}

/// Write one `<key>.json` per ready, non-empty KPI. Directory creation and
/// each individual write are best-effort: a failure becomes a warning on
/// the summary and sibling files still get written.
pub fn save_report(out_dir: &Path, report: &KpiReport) -> SaveSummary {
    let mut summary = SaveSummary::default();
    if let Err(err) = fs::create_dir_all(out_dir) {
        summary
            .warnings
            .push(format!("create output dir {}: {err}", out_dir.display()));
        return summary;
    }

    for (key, value) in artifacts(report) {
        let path = out_dir.join(format!("{key}.json"));
        let result = serde_json::to_string(&value)
            .context("encode kpi json")
            .and_then(|json| write_atomic(&path, &json));
        match result {
            Ok(()) => summary.files_written.push(key.to_string()),
            Err(err) => summary.warnings.push(format!("save {key}.json: {err}")),
        }
    }
    summary
}

/// The persistable view of the report: key + JSON value for every KPI that
/// is ready and has rows. Failed and empty KPIs produce no artifact, which
/// is how the dashboard tells "no data" apart from a stale file.
fn artifacts(report: &KpiReport) -> Vec<(&'static str, Value)> {
    let mut out = Vec::new();
    push(&mut out, "total_matches", &report.total_matches);
    push(&mut out, "team_matches", &report.team_matches);
    push(&mut out, "most_wins", &report.most_wins);
    push(&mut out, "most_losses", &report.most_losses);
    push(&mut out, "toss_wins", &report.toss_wins);
    push(&mut out, "most_toss_wins", &report.most_toss_wins);
    push(&mut out, "orange_cap", &report.orange_cap);
    push(&mut out, "purple_cap", &report.purple_cap);
    push(&mut out, "most_runs_total", &report.most_runs_total);
    push(&mut out, "most_wickets_total", &report.most_wickets_total);
    push(&mut out, "most_sixes", &report.most_sixes);
    push(&mut out, "most_sixes_per_season", &report.most_sixes_per_season);
    push(&mut out, "most_fours", &report.most_fours);
    push(&mut out, "most_fours_per_season", &report.most_fours_per_season);
    push(&mut out, "most_catches", &report.most_catches);
    push(&mut out, "most_stumps", &report.most_stumps);
    push(&mut out, "most_run_outs", &report.most_run_outs);
    push(&mut out, "most_matches_played", &report.most_matches_played);
    push(&mut out, "highest_team_totals", &report.highest_team_totals);
    push(&mut out, "most_pom_awards", &report.most_pom_awards);
    push(&mut out, "stadium_matches", &report.stadium_matches);
    push(&mut out, "cumulative_runs", &report.cumulative_runs);
    out
}

fn push<T: Serialize + KpiTable>(
    out: &mut Vec<(&'static str, Value)>,
    key: &'static str,
    kpi: &Kpi<T>,
) {
    let Some(table) = kpi.ready() else {
        return;
    };
    if table.is_empty_table() {
        return;
    }
    if let Ok(value) = serde_json::to_value(table) {
        out.push((key, value));
    }
}

fn write_atomic(path: &Path, json: &str) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

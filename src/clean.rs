use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dataset::{RawDelivery, RawMatch, RawTables};

pub const UNKNOWN: &str = "Unknown";
pub const NO_RESULT: &str = "No Result";
pub const NONE_MARKER: &str = "None";

/// Franchise lineage map: every historical or misspelled name keys to the
/// canonical successor name. Keys are trimmed + lowercased before lookup,
/// so only the folded spellings appear here. Identity rows keep the
/// canonical names stable across the double lookup.
static TEAM_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("delhi daredevils", "Delhi Capitals"),
        ("deccan chargers", "Sunrisers Hyderabad"),
        ("kings xi punjab", "Punjab Kings"),
        ("royal challengers bengaluru", "Royal Challengers Bangalore"),
        ("royal challengers bangalore", "Royal Challengers Bangalore"),
        ("gujarat lions", "Gujarat Titans"),
        ("pune warriors", "Rising Pune Supergiants"),
        ("rising pune supergiant", "Rising Pune Supergiants"),
        ("rising pune supergaints", "Rising Pune Supergiants"),
        ("rising pune supergiants", "Rising Pune Supergiants"),
        ("delhi capitals", "Delhi Capitals"),
        ("sunrisers hyderabad", "Sunrisers Hyderabad"),
        ("punjab kings", "Punjab Kings"),
        ("kolkata knight riders", "Kolkata Knight Riders"),
        ("mumbai indians", "Mumbai Indians"),
        ("chennai super kings", "Chennai Super Kings"),
        ("rajasthan royals", "Rajasthan Royals"),
        ("gujarat titans", "Gujarat Titans"),
        ("lucknow super giants", "Lucknow Super Giants"),
    ])
});

/// Normalized match row. Every string field is filled; `season` is a
/// single four-digit year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u64,
    pub season: u16,
    pub city: String,
    pub venue: String,
    pub team1: String,
    pub team2: String,
    /// Copy of `team1`; the source data has no real home/away signal.
    pub home_team: String,
    pub toss_winner: String,
    pub winner: String,
    pub result_margin: u32,
    pub method: String,
    pub player_of_match: String,
}

/// Normalized delivery row, with the season joined in from its match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub match_id: u64,
    pub season: u16,
    pub batting_team: String,
    pub bowling_team: String,
    pub batter: String,
    pub bowler: String,
    pub batsman_runs: u32,
    pub total_runs: u32,
    pub extras_type: String,
    pub dismissal_kind: String,
    pub player_dismissed: String,
    pub fielder: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanSummary {
    pub matches_in: usize,
    pub matches_kept: usize,
    pub deliveries_in: usize,
    pub deliveries_kept: usize,
    pub unmatched_deliveries: usize,
    pub unparseable_seasons: usize,
    pub warnings: Vec<String>,
}

/// Collapse a season label to a single four-digit year.
///
/// The split 2020/21 season is pinned to 2020 whichever half is taken;
/// any other slash or dash label keeps its trailing year, expanding a
/// two-digit tail with a "20" prefix.
pub fn normalize_season(raw: &str) -> Option<u16> {
    let s = raw.trim();
    if s == "2020/21" || s == "2020-21" {
        return Some(2020);
    }
    if let Some(idx) = s.rfind(['/', '-']) {
        let tail = s[idx + 1..].trim();
        if tail.len() == 2 {
            return format!("20{tail}").parse().ok();
        }
        return tail.parse().ok();
    }
    s.parse().ok()
}

/// Canonicalize one team name: fold case/whitespace, look up the alias
/// table, and repeat once so a chained alias lands on its final successor.
/// Title-casing last keeps the output presentable for names outside the
/// table. Idempotent.
pub fn canonicalize_team(raw: &str) -> String {
    let mut name = raw.to_string();
    for _ in 0..2 {
        let folded = name.trim().to_lowercase();
        name = match TEAM_ALIASES.get(folded.as_str()) {
            Some(canon) => (*canon).to_string(),
            None => folded,
        };
    }
    title_case(&name)
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut start_of_word = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            start_of_word = true;
            out.push(ch);
        } else if start_of_word {
            out.extend(ch.to_uppercase());
            start_of_word = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Normalize both tables. Match rows whose season label cannot be parsed
/// and delivery rows whose match id resolves to no kept match are dropped
/// and counted on the summary; nothing downstream ever sees a missing
/// season.
pub fn clean_tables(raw: &RawTables) -> (Vec<MatchRecord>, Vec<DeliveryRecord>, CleanSummary) {
    let mut summary = CleanSummary {
        matches_in: raw.matches.len(),
        deliveries_in: raw.deliveries.len(),
        ..CleanSummary::default()
    };

    let mut matches = Vec::with_capacity(raw.matches.len());
    for row in &raw.matches {
        match clean_match(row) {
            Some(record) => matches.push(record),
            None => summary.unparseable_seasons += 1,
        }
    }
    if summary.unparseable_seasons > 0 {
        summary.warnings.push(format!(
            "{} match rows had unparseable season labels and were dropped",
            summary.unparseable_seasons
        ));
    }

    let season_by_id: HashMap<u64, u16> = matches.iter().map(|m| (m.id, m.season)).collect();

    let mut deliveries = Vec::with_capacity(raw.deliveries.len());
    for row in &raw.deliveries {
        let Some(season) = season_by_id.get(&row.match_id).copied() else {
            summary.unmatched_deliveries += 1;
            continue;
        };
        deliveries.push(clean_delivery(row, season));
    }
    if summary.unmatched_deliveries > 0 {
        summary.warnings.push(format!(
            "{} deliveries could not be matched to a season and were excluded",
            summary.unmatched_deliveries
        ));
    }

    summary.matches_kept = matches.len();
    summary.deliveries_kept = deliveries.len();
    (matches, deliveries, summary)
}

fn clean_match(row: &RawMatch) -> Option<MatchRecord> {
    let season = normalize_season(&row.season)?;
    let team1 = canonicalize_team(&row.team1);
    let team2 = canonicalize_team(&row.team2);
    Some(MatchRecord {
        id: row.id,
        season,
        city: fill(&row.city, UNKNOWN),
        venue: fill(&row.venue, UNKNOWN),
        home_team: team1.clone(),
        team1,
        team2,
        toss_winner: canonicalize_team(&fill(&row.toss_winner, NONE_MARKER)),
        winner: canonicalize_team(&fill(&row.winner, NO_RESULT)),
        result_margin: row.result_margin.map(|m| m.max(0.0) as u32).unwrap_or(0),
        method: fill(&row.method, "Normal"),
        player_of_match: fill(&row.player_of_match, NONE_MARKER),
    })
}

fn clean_delivery(row: &RawDelivery, season: u16) -> DeliveryRecord {
    DeliveryRecord {
        match_id: row.match_id,
        season,
        batting_team: canonicalize_team(&fill(&row.batting_team, UNKNOWN)),
        bowling_team: canonicalize_team(&fill(&row.bowling_team, UNKNOWN)),
        batter: row.batter.clone(),
        bowler: row.bowler.clone(),
        batsman_runs: row.batsman_runs,
        total_runs: row.total_runs,
        extras_type: fill(&row.extras_type, NONE_MARKER),
        dismissal_kind: fill(&row.dismissal_kind, NONE_MARKER),
        player_dismissed: fill(&row.player_dismissed, NONE_MARKER),
        fielder: row
            .fielder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty() && *f != NONE_MARKER)
            .map(str::to_string),
    }
}

fn fill(value: &Option<String>, default: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize_team, normalize_season, title_case};

    #[test]
    fn season_forms_collapse_to_one_year() {
        assert_eq!(normalize_season("2019"), Some(2019));
        assert_eq!(normalize_season("2007/08"), Some(2008));
        assert_eq!(normalize_season("2009-10"), Some(2010));
        assert_eq!(normalize_season("2016/2017"), Some(2017));
        // The dual-label season pins to 2020 no matter which half is read.
        assert_eq!(normalize_season("2020/21"), Some(2020));
        assert_eq!(normalize_season("2020-21"), Some(2020));
        assert_eq!(normalize_season("not a year"), None);
    }

    #[test]
    fn chained_alias_resolves_in_two_passes() {
        // pune warriors -> Rising Pune Supergiants directly; the second
        // pass is what absorbs an alias whose target is itself aliased.
        assert_eq!(canonicalize_team("Pune Warriors"), "Rising Pune Supergiants");
        assert_eq!(
            canonicalize_team("  royal challengers bengaluru "),
            "Royal Challengers Bangalore"
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        for name in [
            "deccan chargers",
            "Delhi Daredevils",
            "Kings XI Punjab",
            "Mumbai Indians",
            "No Result",
            "Some Unlisted Team",
        ] {
            let once = canonicalize_team(name);
            assert_eq!(canonicalize_team(&once), once, "not idempotent for {name}");
        }
    }

    #[test]
    fn title_case_handles_multiword() {
        assert_eq!(title_case("sunrisers hyderabad"), "Sunrisers Hyderabad");
        assert_eq!(title_case("no result"), "No Result");
    }
}

use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::clean::{DeliveryRecord, MatchRecord, NO_RESULT, NONE_MARKER};

/// Dismissal kinds that credit the bowler with a wicket. Run outs,
/// retirements and obstruction do not.
pub const BOWLER_DISMISSALS: &[&str] = &[
    "caught",
    "bowled",
    "lbw",
    "stumped",
    "caught and bowled",
    "hit wicket",
];

const LEADERBOARD_LEN: usize = 10;
const CUMULATIVE_BATTERS: usize = 5;

/// One leaderboard row: a team, player or venue with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub name: String,
    pub count: u64,
}

/// Per-season award row: the single leader for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLeader {
    pub season: u16,
    pub player: String,
    pub value: u64,
}

/// One team innings: runs scored by `batting_team` in `match_id`, with the
/// opponent read off the match row by elimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInningsTotal {
    pub match_id: u64,
    pub batting_team: String,
    pub opponent: String,
    pub total_runs: u64,
}

/// Season-by-season running run totals for one batter. `totals[i]` pairs
/// with `CumulativeRuns::seasons[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterSeries {
    pub batter: String,
    pub totals: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeRuns {
    pub seasons: Vec<u16>,
    pub batters: Vec<BatterSeries>,
}

/// Outcome of one isolated KPI computation. A failed KPI carries its
/// reason and never blocks a sibling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Kpi<T> {
    Ready(T),
    Empty,
    Failed(String),
}

impl<T> Kpi<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Kpi::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Kpi::Ready(_))
    }
}

/// Anything a KPI can produce; empty tables persist as `Kpi::Empty` so the
/// consumer can tell "no data" apart from "never computed".
pub trait KpiTable {
    fn is_empty_table(&self) -> bool;
}

impl KpiTable for u64 {
    fn is_empty_table(&self) -> bool {
        false
    }
}

impl<T> KpiTable for Vec<T> {
    fn is_empty_table(&self) -> bool {
        self.is_empty()
    }
}

impl KpiTable for CumulativeRuns {
    fn is_empty_table(&self) -> bool {
        self.batters.is_empty()
    }
}

/// The full, fixed KPI mapping. One field per dashboard table; the field
/// name doubles as the persisted artifact key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub total_matches: Kpi<u64>,
    pub team_matches: Kpi<Vec<CountRow>>,
    pub most_wins: Kpi<Vec<CountRow>>,
    pub most_losses: Kpi<Vec<CountRow>>,
    pub toss_wins: Kpi<Vec<CountRow>>,
    pub most_toss_wins: Kpi<Vec<CountRow>>,
    pub orange_cap: Kpi<Vec<SeasonLeader>>,
    pub purple_cap: Kpi<Vec<SeasonLeader>>,
    pub most_runs_total: Kpi<Vec<CountRow>>,
    pub most_wickets_total: Kpi<Vec<CountRow>>,
    pub most_sixes: Kpi<Vec<CountRow>>,
    pub most_sixes_per_season: Kpi<Vec<SeasonLeader>>,
    pub most_fours: Kpi<Vec<CountRow>>,
    pub most_fours_per_season: Kpi<Vec<SeasonLeader>>,
    pub most_catches: Kpi<Vec<CountRow>>,
    pub most_stumps: Kpi<Vec<CountRow>>,
    pub most_run_outs: Kpi<Vec<CountRow>>,
    pub most_matches_played: Kpi<Vec<CountRow>>,
    pub highest_team_totals: Kpi<Vec<TeamInningsTotal>>,
    pub most_pom_awards: Kpi<Vec<CountRow>>,
    pub stadium_matches: Kpi<Vec<CountRow>>,
    pub cumulative_runs: Kpi<CumulativeRuns>,
    /// One entry per failed KPI, labelled with its key.
    pub errors: Vec<String>,
}

/// Compute every KPI from the normalized tables. Pure: no I/O, no shared
/// state. Each KPI runs isolated; a failure lands in `errors` and leaves
/// the siblings untouched.
pub fn compute_kpis(matches: &[MatchRecord], deliveries: &[DeliveryRecord]) -> KpiReport {
    let mut errors = Vec::new();

    let total_matches = guard("total_matches", &mut errors, || {
        Ok(matches.len() as u64)
    });

    let team_matches = guard("team_matches", &mut errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for m in matches {
            *counts.entry(m.team1.clone()).or_default() += 1;
            *counts.entry(m.team2.clone()).or_default() += 1;
        }
        Ok(sorted_counts(counts))
    });

    let wins_by_team: HashMap<String, u64> = matches
        .iter()
        .filter(|m| m.winner != NO_RESULT)
        .fold(HashMap::new(), |mut acc, m| {
            *acc.entry(m.winner.clone()).or_default() += 1;
            acc
        });

    let most_wins = guard("most_wins", &mut errors, || {
        Ok(sorted_counts(wins_by_team.clone()))
    });

    // Losses lean on the per-team match counts; if those failed the
    // derived table fails with them rather than inventing zeros.
    let most_losses = guard("most_losses", &mut errors, || {
        let team_matches = match &team_matches {
            Kpi::Ready(rows) => rows.as_slice(),
            Kpi::Empty => &[],
            Kpi::Failed(_) => return Err(anyhow!("team match counts unavailable")),
        };
        let losses: HashMap<String, u64> = team_matches
            .iter()
            .map(|row| {
                let wins = wins_by_team.get(&row.name).copied().unwrap_or(0);
                (row.name.clone(), row.count.saturating_sub(wins))
            })
            .collect();
        Ok(sorted_counts(losses))
    });

    let toss_wins = guard("toss_wins", &mut errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for m in matches {
            *counts.entry(m.toss_winner.clone()).or_default() += 1;
        }
        Ok(sorted_counts(counts))
    });

    let most_toss_wins = guard("most_toss_wins", &mut errors, || {
        match &toss_wins {
            Kpi::Ready(rows) => Ok(rows.iter().take(1).cloned().collect::<Vec<_>>()),
            Kpi::Empty => Ok(Vec::new()),
            Kpi::Failed(_) => Err(anyhow!("toss win counts unavailable")),
        }
    });

    let orange_cap = guard("orange_cap", &mut errors, || {
        let mut runs: HashMap<(u16, String), u64> = HashMap::new();
        for d in deliveries {
            *runs.entry((d.season, d.batter.clone())).or_default() += u64::from(d.batsman_runs);
        }
        Ok(season_leaders(runs))
    });

    let wickets: Vec<&DeliveryRecord> = deliveries
        .iter()
        .filter(|d| BOWLER_DISMISSALS.contains(&d.dismissal_kind.as_str()))
        .collect();

    let purple_cap = guard("purple_cap", &mut errors, || {
        let mut counts: HashMap<(u16, String), u64> = HashMap::new();
        for d in &wickets {
            *counts.entry((d.season, d.bowler.clone())).or_default() += 1;
        }
        Ok(season_leaders(counts))
    });

    let most_runs_total = guard("most_runs_total", &mut errors, || {
        let mut runs: HashMap<String, u64> = HashMap::new();
        for d in deliveries {
            *runs.entry(d.batter.clone()).or_default() += u64::from(d.batsman_runs);
        }
        Ok(top(sorted_counts(runs)))
    });

    let most_wickets_total = guard("most_wickets_total", &mut errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for d in &wickets {
            *counts.entry(d.bowler.clone()).or_default() += 1;
        }
        Ok(top(sorted_counts(counts)))
    });

    let (most_sixes, most_sixes_per_season) =
        boundary_kpis("sixes", 6, deliveries, &mut errors);
    let (most_fours, most_fours_per_season) =
        boundary_kpis("fours", 4, deliveries, &mut errors);

    let most_catches = fielder_kpi("most_catches", "caught", deliveries, &mut errors);
    let most_stumps = fielder_kpi("most_stumps", "stumped", deliveries, &mut errors);
    let most_run_outs = fielder_kpi("most_run_outs", "run out", deliveries, &mut errors);

    let most_matches_played = guard("most_matches_played", &mut errors, || {
        let mut seen: HashSet<(&str, u64)> = HashSet::new();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for d in deliveries {
            if seen.insert((d.batter.as_str(), d.match_id)) {
                *counts.entry(d.batter.clone()).or_default() += 1;
            }
        }
        Ok(top(sorted_counts(counts)))
    });

    let highest_team_totals = guard("highest_team_totals", &mut errors, || {
        Ok(team_innings_totals(matches, deliveries))
    });

    let most_pom_awards = guard("most_pom_awards", &mut errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for m in matches.iter().filter(|m| m.player_of_match != NONE_MARKER) {
            *counts.entry(m.player_of_match.clone()).or_default() += 1;
        }
        Ok(top(sorted_counts(counts)))
    });

    let stadium_matches = guard("stadium_matches", &mut errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for m in matches {
            *counts.entry(m.venue.clone()).or_default() += 1;
        }
        Ok(sorted_counts(counts))
    });

    let cumulative_runs = guard("cumulative_runs", &mut errors, || {
        Ok(cumulative_run_series(deliveries))
    });

    KpiReport {
        total_matches,
        team_matches,
        most_wins,
        most_losses,
        toss_wins,
        most_toss_wins,
        orange_cap,
        purple_cap,
        most_runs_total,
        most_wickets_total,
        most_sixes,
        most_sixes_per_season,
        most_fours,
        most_fours_per_season,
        most_catches,
        most_stumps,
        most_run_outs,
        most_matches_played,
        highest_team_totals,
        most_pom_awards,
        stadium_matches,
        cumulative_runs,
        errors,
    }
}

fn guard<T: KpiTable>(
    key: &str,
    errors: &mut Vec<String>,
    f: impl FnOnce() -> Result<T>,
) -> Kpi<T> {
    match f() {
        Ok(value) if value.is_empty_table() => Kpi::Empty,
        Ok(value) => Kpi::Ready(value),
        Err(err) => {
            errors.push(format!("{key}: {err}"));
            Kpi::Failed(err.to_string())
        }
    }
}

fn boundary_kpis(
    label: &str,
    runs: u32,
    deliveries: &[DeliveryRecord],
    errors: &mut Vec<String>,
) -> (Kpi<Vec<CountRow>>, Kpi<Vec<SeasonLeader>>) {
    let overall = guard(&format!("most_{label}"), errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for d in deliveries.iter().filter(|d| d.batsman_runs == runs) {
            *counts.entry(d.batter.clone()).or_default() += 1;
        }
        Ok(top(sorted_counts(counts)))
    });
    let per_season = guard(&format!("most_{label}_per_season"), errors, || {
        let mut counts: HashMap<(u16, String), u64> = HashMap::new();
        for d in deliveries.iter().filter(|d| d.batsman_runs == runs) {
            *counts.entry((d.season, d.batter.clone())).or_default() += 1;
        }
        Ok(season_leaders(counts))
    });
    (overall, per_season)
}

fn fielder_kpi(
    key: &str,
    kind: &str,
    deliveries: &[DeliveryRecord],
    errors: &mut Vec<String>,
) -> Kpi<Vec<CountRow>> {
    guard(key, errors, || {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for d in deliveries.iter().filter(|d| d.dismissal_kind == kind) {
            let Some(fielder) = d.fielder.as_deref() else {
                continue;
            };
            *counts.entry(fielder.to_string()).or_default() += 1;
        }
        Ok(top(sorted_counts(counts)))
    })
}

/// Leaderboard order: count descending, then name ascending. The name
/// tiebreak makes every table deterministic regardless of input order.
fn sorted_counts(counts: HashMap<String, u64>) -> Vec<CountRow> {
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(name, count)| CountRow { name, count })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

fn top(mut rows: Vec<CountRow>) -> Vec<CountRow> {
    rows.truncate(LEADERBOARD_LEN);
    rows
}

/// Pick the single leader per season: highest value, ties to the
/// lexicographically smallest player name. Output is season-ascending.
fn season_leaders(counts: HashMap<(u16, String), u64>) -> Vec<SeasonLeader> {
    let mut best: HashMap<u16, SeasonLeader> = HashMap::new();
    for ((season, player), value) in counts {
        let candidate = SeasonLeader {
            season,
            player,
            value,
        };
        let replace = match best.get(&season) {
            Some(current) => {
                candidate.value > current.value
                    || (candidate.value == current.value && candidate.player < current.player)
            }
            None => true,
        };
        if replace {
            best.insert(season, candidate);
        }
    }
    let mut out: Vec<SeasonLeader> = best.into_values().collect();
    out.sort_by_key(|row| row.season);
    out
}

fn team_innings_totals(
    matches: &[MatchRecord],
    deliveries: &[DeliveryRecord],
) -> Vec<TeamInningsTotal> {
    let teams_by_id: HashMap<u64, (&str, &str)> = matches
        .iter()
        .map(|m| (m.id, (m.team1.as_str(), m.team2.as_str())))
        .collect();

    let mut totals: HashMap<(u64, String), u64> = HashMap::new();
    for d in deliveries {
        *totals
            .entry((d.match_id, d.batting_team.clone()))
            .or_default() += u64::from(d.total_runs);
    }

    let mut rows: Vec<TeamInningsTotal> = totals
        .into_iter()
        .filter_map(|((match_id, batting_team), total_runs)| {
            let (team1, team2) = teams_by_id.get(&match_id)?;
            let opponent = if batting_team == *team1 { team2 } else { team1 };
            Some(TeamInningsTotal {
                match_id,
                opponent: (*opponent).to_string(),
                batting_team,
                total_runs,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_runs
            .cmp(&a.total_runs)
            .then_with(|| a.batting_team.cmp(&b.batting_team))
            .then_with(|| a.match_id.cmp(&b.match_id))
    });
    rows.truncate(LEADERBOARD_LEN);
    rows
}

/// Running run totals per season for the top all-time scorers. Seasons a
/// batter sat out contribute zero, so each series is non-decreasing and
/// spans every season in the data.
fn cumulative_run_series(deliveries: &[DeliveryRecord]) -> CumulativeRuns {
    let mut per_season: HashMap<(u16, &str), u64> = HashMap::new();
    let mut career: HashMap<&str, u64> = HashMap::new();
    let mut seasons: Vec<u16> = Vec::new();
    for d in deliveries {
        *per_season.entry((d.season, d.batter.as_str())).or_default() +=
            u64::from(d.batsman_runs);
        *career.entry(d.batter.as_str()).or_default() += u64::from(d.batsman_runs);
        if !seasons.contains(&d.season) {
            seasons.push(d.season);
        }
    }
    seasons.sort_unstable();

    let mut leaders: Vec<(&str, u64)> = career.into_iter().collect();
    leaders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    leaders.truncate(CUMULATIVE_BATTERS);

    let batters = leaders
        .into_iter()
        .map(|(batter, _)| {
            let mut running = 0u64;
            let totals = seasons
                .iter()
                .map(|season| {
                    running += per_season.get(&(*season, batter)).copied().unwrap_or(0);
                    running
                })
                .collect();
            BatterSeries {
                batter: batter.to_string(),
                totals,
            }
        })
        .collect();

    CumulativeRuns { seasons, batters }
}

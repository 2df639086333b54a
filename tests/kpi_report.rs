use ipl_insights::clean::{DeliveryRecord, MatchRecord};
use ipl_insights::kpis::{Kpi, compute_kpis};
use ipl_insights::sample::{SampleConfig, generate};

fn match_record(id: u64, season: u16, team1: &str, team2: &str, winner: &str) -> MatchRecord {
    MatchRecord {
        id,
        season,
        city: "Unknown".to_string(),
        venue: "Eden Gardens".to_string(),
        team1: team1.to_string(),
        team2: team2.to_string(),
        home_team: team1.to_string(),
        toss_winner: team1.to_string(),
        winner: winner.to_string(),
        result_margin: 5,
        method: "Normal".to_string(),
        player_of_match: "None".to_string(),
    }
}

fn delivery(match_id: u64, season: u16, batter: &str, runs: u32) -> DeliveryRecord {
    DeliveryRecord {
        match_id,
        season,
        batting_team: "Mumbai Indians".to_string(),
        bowling_team: "Chennai Super Kings".to_string(),
        batter: batter.to_string(),
        bowler: "R Bowler".to_string(),
        batsman_runs: runs,
        total_runs: runs,
        extras_type: "None".to_string(),
        dismissal_kind: "None".to_string(),
        player_dismissed: "None".to_string(),
        fielder: None,
    }
}

fn wicket(match_id: u64, season: u16, bowler: &str, kind: &str) -> DeliveryRecord {
    DeliveryRecord {
        bowler: bowler.to_string(),
        dismissal_kind: kind.to_string(),
        player_dismissed: "Someone".to_string(),
        fielder: Some("A Fielder".to_string()),
        ..delivery(match_id, season, "X Batter", 0)
    }
}

#[test]
fn wins_plus_losses_equals_matches_played() {
    let matches = vec![
        match_record(1, 2019, "Mumbai Indians", "Chennai Super Kings", "Mumbai Indians"),
        match_record(2, 2019, "Chennai Super Kings", "Mumbai Indians", "Chennai Super Kings"),
        match_record(3, 2019, "Mumbai Indians", "Delhi Capitals", "Mumbai Indians"),
        // No Result games count towards matches played but never wins.
        match_record(4, 2020, "Delhi Capitals", "Chennai Super Kings", "No Result"),
    ];
    let report = compute_kpis(&matches, &[]);

    let team_matches = report.team_matches.ready().expect("team matches ready");
    let wins = report.most_wins.ready().expect("wins ready");
    let losses = report.most_losses.ready().expect("losses ready");

    for row in team_matches {
        let won = wins
            .iter()
            .find(|w| w.name == row.name)
            .map(|w| w.count)
            .unwrap_or(0);
        let lost = losses
            .iter()
            .find(|l| l.name == row.name)
            .map(|l| l.count)
            .unwrap_or(0);
        assert_eq!(won + lost, row.count, "team {}", row.name);
    }
}

#[test]
fn caps_have_exactly_one_row_per_season() {
    let deliveries = vec![
        delivery(1, 2019, "A Batter", 50),
        delivery(1, 2019, "B Batter", 80),
        delivery(2, 2020, "A Batter", 30),
        wicket(1, 2019, "P Bowler", "caught"),
        wicket(1, 2019, "P Bowler", "bowled"),
        wicket(2, 2020, "Q Bowler", "lbw"),
        // Run outs never credit the bowler.
        wicket(2, 2020, "R Bowler", "run out"),
    ];
    let matches = vec![
        match_record(1, 2019, "Mumbai Indians", "Chennai Super Kings", "Mumbai Indians"),
        match_record(2, 2020, "Mumbai Indians", "Chennai Super Kings", "Mumbai Indians"),
    ];
    let report = compute_kpis(&matches, &deliveries);

    let orange = report.orange_cap.ready().expect("orange cap ready");
    assert_eq!(orange.len(), 2);
    assert_eq!(orange[0].season, 2019);
    assert_eq!(orange[0].player, "B Batter");
    assert_eq!(orange[0].value, 80);
    assert_eq!(orange[1].player, "A Batter");

    let purple = report.purple_cap.ready().expect("purple cap ready");
    assert_eq!(purple.len(), 2);
    assert_eq!(purple[0].player, "P Bowler");
    assert_eq!(purple[0].value, 2);
    assert_eq!(purple[1].player, "Q Bowler");
    assert_eq!(purple[1].value, 1);
}

#[test]
fn three_deliveries_scoring_4_6_6_yield_two_sixes() {
    let matches = vec![match_record(
        1,
        2021,
        "Mumbai Indians",
        "Chennai Super Kings",
        "Mumbai Indians",
    )];
    let deliveries = vec![
        delivery(1, 2021, "S Batter", 4),
        delivery(1, 2021, "S Batter", 6),
        delivery(1, 2021, "S Batter", 6),
    ];
    let report = compute_kpis(&matches, &deliveries);

    let per_season = report
        .most_sixes_per_season
        .ready()
        .expect("sixes per season ready");
    assert_eq!(per_season.len(), 1);
    assert_eq!(per_season[0].season, 2021);
    assert_eq!(per_season[0].player, "S Batter");
    assert_eq!(per_season[0].value, 2);

    let fours = report.most_fours.ready().expect("fours ready");
    assert_eq!(fours[0].count, 1);
}

#[test]
fn season_leader_ties_go_to_smallest_name() {
    let matches = vec![match_record(
        1,
        2019,
        "Mumbai Indians",
        "Chennai Super Kings",
        "Mumbai Indians",
    )];
    let deliveries = vec![
        delivery(1, 2019, "Zulu Batter", 6),
        delivery(1, 2019, "Alpha Batter", 6),
    ];
    let report = compute_kpis(&matches, &deliveries);

    let leaders = report
        .most_sixes_per_season
        .ready()
        .expect("leaders ready");
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].player, "Alpha Batter");
    assert_eq!(leaders[0].value, 1);
}

#[test]
fn highest_team_totals_attach_opponent_by_elimination() {
    let matches = vec![match_record(
        7,
        2018,
        "Mumbai Indians",
        "Chennai Super Kings",
        "Mumbai Indians",
    )];
    let mut deliveries = vec![
        delivery(7, 2018, "A Batter", 6),
        delivery(7, 2018, "A Batter", 4),
    ];
    let mut second_innings = delivery(7, 2018, "B Batter", 2);
    second_innings.batting_team = "Chennai Super Kings".to_string();
    second_innings.bowling_team = "Mumbai Indians".to_string();
    deliveries.push(second_innings);

    let report = compute_kpis(&matches, &deliveries);
    let totals = report
        .highest_team_totals
        .ready()
        .expect("team totals ready");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].batting_team, "Mumbai Indians");
    assert_eq!(totals[0].opponent, "Chennai Super Kings");
    assert_eq!(totals[0].total_runs, 10);
    assert_eq!(totals[1].opponent, "Mumbai Indians");
    assert_eq!(totals[1].total_runs, 2);
}

#[test]
fn cumulative_runs_are_non_decreasing_across_seasons() {
    let tables = generate(&SampleConfig::default());
    let (matches, deliveries, _) = ipl_insights::clean::clean_tables(&tables);
    let report = compute_kpis(&matches, &deliveries);

    let cumulative = report.cumulative_runs.ready().expect("cumulative ready");
    assert!(cumulative.batters.len() <= 5);
    assert!(!cumulative.seasons.is_empty());
    assert!(cumulative.seasons.windows(2).all(|w| w[0] < w[1]));
    for series in &cumulative.batters {
        assert_eq!(series.totals.len(), cumulative.seasons.len());
        assert!(
            series.totals.windows(2).all(|w| w[0] <= w[1]),
            "series for {} decreased",
            series.batter
        );
    }
}

#[test]
fn empty_inputs_yield_empty_not_failed_kpis() {
    let report = compute_kpis(&[], &[]);
    assert_eq!(report.total_matches, Kpi::Ready(0));
    assert_eq!(report.orange_cap, Kpi::Empty);
    assert_eq!(report.team_matches, Kpi::Empty);
    assert_eq!(report.cumulative_runs, Kpi::Empty);
    assert!(report.errors.is_empty());
}

#[test]
fn full_pipeline_over_generated_data_produces_all_leaderboards() {
    let tables = generate(&SampleConfig {
        seasons: 5,
        matches_per_season: 20,
        ..SampleConfig::default()
    });
    let (matches, deliveries, summary) = ipl_insights::clean::clean_tables(&tables);
    assert_eq!(summary.unmatched_deliveries, 0);
    assert_eq!(summary.unparseable_seasons, 0);

    let report = compute_kpis(&matches, &deliveries);
    assert!(report.errors.is_empty());
    assert!(report.total_matches.is_ready());
    assert!(report.most_runs_total.is_ready());
    assert!(report.most_wickets_total.is_ready());
    assert!(report.orange_cap.is_ready());
    assert!(report.purple_cap.is_ready());
    assert!(report.highest_team_totals.is_ready());
    assert!(report.stadium_matches.is_ready());

    // Canonicalization happened before aggregation: no historical names
    // survive into any team leaderboard.
    let team_matches = report.team_matches.ready().expect("team matches ready");
    for row in team_matches {
        assert_ne!(row.name, "Delhi Daredevils");
        assert_ne!(row.name, "Deccan Chargers");
        assert_ne!(row.name, "Kings Xi Punjab");
    }

    let leaderboard = report.most_runs_total.ready().expect("runs ready");
    assert!(leaderboard.len() <= 10);
    assert!(leaderboard.windows(2).all(|w| w[0].count >= w[1].count));
}

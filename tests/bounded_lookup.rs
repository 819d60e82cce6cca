mod common;

use common::*;
use darts_sync::database::ImportStatus;

fn mirek_league(loader: &FakeLoader, id: &str, days_ago: i64, opponents: u32) {
    let mut roster = vec![("kow01".to_string(), "Mirek Kowalski".to_string())];
    let mut fixtures = Vec::new();

    for round in 1..=opponents {
        let code = format!("opp{round:02}");
        roster.push((code.clone(), format!("Opponent {round}")));
        fixtures.push(group_fixture(id, round, "kow01", &code));
    }

    let roster: Vec<(&str, &str)> = roster.iter().map(|(c, n)| (c.as_str(), n.as_str())).collect();
    loader.add_tournament(id, &format!("Agawa League {id}"), days_ago, event_page(&roster, &fixtures));
}

#[tokio::test]
async fn test_agawa_lookup_reports_matched_player_first() {
    let loader = FakeLoader::new();
    let page = event_page(
        &[("kow01", "Mirek Kowalski"), ("now02", "Jan Nowak")],
        &[group_fixture("t1", 1, "kow01", "now02")],
    );
    loader.add_tournament("t1", "Agawa Friday", 3, page);
    let sync = orchestrator(&loader);

    let result = sync.nickname_lookup("agawa", "Mirek").await.unwrap();

    assert_eq!(result.total, 1);
    let row = &result.rows[0];
    assert_eq!(row.player_name, "Mirek Kowalski");
    assert_eq!(row.player_code, "kow01");
    assert_eq!(row.opponent_name, "Jan Nowak");
    assert_eq!(row.opponent_code, "now02");
    assert_eq!(row.match_type, "round_robin");
    assert_eq!(row.tournament_name, "Agawa Friday");
    assert!(row.is_checked);
    assert_eq!(row.stats.average, None);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["rows"][0]["isChecked"], true);
    assert_eq!(json["rows"][0]["player_name"], "Mirek Kowalski");

    let stored = sync.store().find_tournament("t1").unwrap().unwrap();
    assert!(stored.matches_saved);
    assert_eq!(stored.import_status, None);
}

#[tokio::test]
async fn test_second_side_match_is_swapped() {
    let loader = FakeLoader::new();
    let page = event_page(
        &[("aaa01", "Jan Nowak"), ("kow01", "Mirek Kowalski")],
        &[knockout_fixture("t1", 4, "aaa01", "kow01", "Final")],
    );
    loader.add_tournament("t1", "Agawa Cup", 3, page);
    let sync = orchestrator(&loader);

    let result = sync.nickname_lookup("agawa", "mirek").await.unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.rows[0].player_name, "Mirek Kowalski");
    assert_eq!(result.rows[0].opponent_name, "Jan Nowak");
    assert_eq!(result.rows[0].match_type, "knockout_final");
}

#[tokio::test]
async fn test_cap_stops_before_loading_further_tournaments() {
    let loader = FakeLoader::new();
    mirek_league(&loader, "t1", 10, 20);
    mirek_league(&loader, "t2", 20, 20);
    mirek_league(&loader, "t3", 30, 20);
    let sync = orchestrator(&loader);

    let result = sync.nickname_lookup("agawa", "mirek").await.unwrap();

    assert_eq!(result.total, 30);
    assert_eq!(result.rows.len(), 30);
    assert!(result.rows[..20].iter().all(|r| r.tournament_name == "Agawa League t1"));
    assert!(result.rows[20..].iter().all(|r| r.tournament_name == "Agawa League t2"));
    assert_eq!(loader.documents_loaded(), vec![event_url("t1"), event_url("t2")]);
    assert!(sync.store().find_tournament("t3").unwrap().is_none());
}

#[tokio::test]
async fn test_explicit_cap_is_honoured() {
    let loader = FakeLoader::new();
    mirek_league(&loader, "t1", 10, 5);
    let sync = orchestrator(&loader);

    let result = sync.bounded_lookup("agawa", "mirek", 3).await.unwrap();
    assert_eq!(result.total, 3);
}

#[tokio::test]
async fn test_fully_saved_tournament_is_answered_from_database() {
    let loader = FakeLoader::new();
    mirek_league(&loader, "t1", 10, 2);
    loader.script_frame(
        &match_url("t1", 1, "kow01", "opp01"),
        vec![FrameReply::Html(stats_frame(("opp01", 1, 40.0), ("kow01", 3, 58.25)))],
    );
    let sync = orchestrator(&loader);

    sync.full_sync("agawa").await.unwrap();
    loader.clear_visits();

    let result = sync.nickname_lookup("agawa", "Kowalski").await.unwrap();

    assert_eq!(result.total, 2);
    assert!(loader.documents_loaded().is_empty());
    assert_eq!(result.rows[0].player_code, "kow01");
    assert_eq!(result.rows[0].stats.average, Some(58.25));
    assert_eq!(result.rows[0].stats.legs_won, Some(3));
    assert_eq!(result.rows[1].stats.average, None);

    let stored = sync.store().find_tournament("t1").unwrap().unwrap();
    assert_eq!(stored.import_status, Some(ImportStatus::Failed));
}

#[tokio::test]
async fn test_discovery_failure_yields_empty_result() {
    let loader = FakeLoader::new();
    loader.search_down();
    let sync = orchestrator(&loader);

    let result = sync.nickname_lookup("agawa", "mirek").await.unwrap();
    assert_eq!(result.total, 0);
    assert!(result.rows.is_empty());
}

#[tokio::test]
async fn test_failed_tournament_contributes_no_rows() {
    let loader = FakeLoader::new();
    loader.add_tournament("t1", "Broken", 5, "<html><body></body></html>".to_string());
    mirek_league(&loader, "t2", 10, 2);
    let sync = orchestrator(&loader);

    let result = sync.nickname_lookup("agawa", "mirek").await.unwrap();

    assert_eq!(result.total, 2);
    assert!(result.rows.iter().all(|r| r.tournament_name == "Agawa League t2"));
}

#[tokio::test]
async fn test_search_without_responses_yields_empty_result() {
    let loader = FakeLoader::new();
    let sync = orchestrator(&loader);

    let result = sync.bounded_lookup("agawa", "mirek", 30).await.unwrap();

    assert_eq!(result.total, 0);
    assert!(result.rows.is_empty());
    let visits = loader.visits();
    assert_eq!(visits.len(), 1);
    assert!(matches!(visits[0], Visit::Search(_)));
}

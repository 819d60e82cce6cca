use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;

use super::connection::DbConn;
use super::models::LookupScope;
use super::player_results;
use crate::domain::{orient, Orientation, PlayerMatchRow, Stage};

struct StoredFixture {
    match_id: i64,
    tournament_name: String,
    tournament_link: String,
    tournament_date: NaiveDate,
    match_link: String,
    match_type: String,
    stage: Stage,
    first_name: String,
    first_code: String,
    second_name: String,
    second_code: String,
}

/// Stored matches where either side's name contains `nickname`, reported
/// from the matched player's side and joined with their statistics.
///
/// Name matching happens here rather than in SQL: SQLite's `lower()` only
/// folds ASCII and player names are not.
pub fn find_player_matches(
    conn: &mut DbConn,
    nickname: &str,
    scope: LookupScope,
    limit: usize,
) -> Result<Vec<PlayerMatchRow>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let fixtures = load_fixtures(conn, scope)?;
    let mut rows = Vec::new();

    for fixture in fixtures {
        let Some(orientation) = orient(nickname, &fixture.first_name, &fixture.second_name) else {
            continue;
        };

        let row = build_row(conn, fixture, orientation)?;
        rows.push(row);

        if rows.len() >= limit {
            break;
        }
    }

    Ok(rows)
}

fn load_fixtures(conn: &mut DbConn, scope: LookupScope) -> Result<Vec<StoredFixture>> {
    let base = "SELECT m.id, t.title, t.link, t.date, m.link, m.match_type, m.stage, m.player_name, m.player_code, m.opponent_name, m.opponent_code \
                FROM matches m JOIN tournaments t ON t.id = m.tournament_id";

    let (sql, tournament_id) = match scope {
        LookupScope::Tournament(id) => (format!("{base} WHERE m.tournament_id = ?1 ORDER BY m.id"), Some(id)),
        LookupScope::Global => (format!("{base} WHERE ?1 IS NULL ORDER BY t.date DESC, t.id, m.id"), None),
    };

    let mut stmt = conn.prepare(&sql)?;
    let fixtures = stmt
        .query_map(params![tournament_id], parse_fixture_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load stored matches for lookup")?;

    Ok(fixtures)
}

fn build_row(conn: &mut DbConn, fixture: StoredFixture, orientation: Orientation) -> Result<PlayerMatchRow> {
    let (player_name, player_code, opponent_name, opponent_code) = match orientation {
        Orientation::AsIs => (
            fixture.first_name,
            fixture.first_code,
            fixture.second_name,
            fixture.second_code,
        ),
        Orientation::Swapped => (
            fixture.second_name,
            fixture.second_code,
            fixture.first_name,
            fixture.first_code,
        ),
    };

    let stats = player_results::find_stats(conn, fixture.match_id, &player_code)?.unwrap_or_default();

    Ok(PlayerMatchRow {
        tournament_name: fixture.tournament_name,
        tournament_link: fixture.tournament_link,
        tournament_date: fixture.tournament_date,
        match_link: fixture.match_link,
        match_type: fixture.match_type,
        stage: fixture.stage,
        player_name,
        player_code,
        opponent_name,
        opponent_code,
        is_checked: true,
        stats,
    })
}

fn parse_fixture_row(row: &rusqlite::Row) -> rusqlite::Result<StoredFixture> {
    let stage: String = row.get(6)?;

    Ok(StoredFixture {
        match_id: row.get(0)?,
        tournament_name: row.get(1)?,
        tournament_link: row.get(2)?,
        tournament_date: row.get(3)?,
        match_link: row.get(4)?,
        match_type: row.get(5)?,
        stage: Stage::parse(&stage).unwrap_or(Stage::Group),
        first_name: row.get(7)?,
        first_code: row.get(8)?,
        second_name: row.get(9)?,
        second_code: row.get(10)?,
    })
}

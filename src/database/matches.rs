use anyhow::{Context, Result};
use rusqlite::params;

use super::connection::DbConn;
use super::models::{ImportStatus, Match};
use crate::domain::{ScrapedMatch, Stage};

const MATCH_COLUMNS: &str = "id, tournament_id, external_id, stage, round, match_type, player_name, player_code, opponent_name, opponent_code, link, result_status, result_error";

/// Insert the batch in one transaction, ignoring ids already stored.
/// Returns the number of new rows.
pub fn insert_batch(conn: &mut DbConn, tournament_id: i64, matches: &[ScrapedMatch]) -> Result<usize> {
    let tx = conn
        .transaction()
        .context("Failed to start match batch transaction")?;
    let mut inserted = 0;

    {
        let sql = "INSERT OR IGNORE INTO matches (tournament_id, external_id, stage, round, match_type, player_name, player_code, opponent_name, opponent_code, link) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let mut stmt = tx.prepare(sql)?;

        for m in matches {
            inserted += stmt
                .execute(params![
                    tournament_id,
                    m.external_id,
                    m.stage.as_str(),
                    m.round,
                    m.match_type,
                    m.player.name,
                    m.player.code,
                    m.opponent.name,
                    m.opponent.code,
                    m.link
                ])
                .with_context(|| format!("Failed to insert match {}", m.external_id))?;
        }
    }

    tx.commit().context("Failed to commit match batch")?;
    Ok(inserted)
}

pub fn count_by_tournament(conn: &mut DbConn, tournament_id: i64) -> Result<usize> {
    let sql = "SELECT COUNT(*) FROM matches WHERE tournament_id = ?1";

    let count: i64 = conn
        .query_row(sql, params![tournament_id], |row| row.get(0))
        .context("Failed to count matches")?;
    Ok(count as usize)
}

pub fn list_by_tournament(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<Match>> {
    let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = ?1 ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Matches whose results still need scraping, in insertion order
pub fn list_pending(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<Match>> {
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches WHERE tournament_id = ?1 AND (result_status IS NULL OR result_status != 'completed') ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn result_statuses(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<Option<ImportStatus>>> {
    let sql = "SELECT result_status FROM matches WHERE tournament_id = ?1";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], |row| row.get::<_, Option<String>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows
        .iter()
        .map(|s| s.as_deref().and_then(ImportStatus::parse))
        .collect())
}

pub fn set_result_status(
    conn: &mut DbConn,
    match_id: i64,
    status: ImportStatus,
    error: Option<&str>,
) -> Result<()> {
    let sql = "UPDATE matches SET result_status = ?1, result_error = ?2 WHERE id = ?3";

    conn.execute(sql, params![status.as_str(), error, match_id])
        .with_context(|| format!("Failed to update result status of match {}", match_id))?;
    Ok(())
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    let stage: String = row.get(3)?;
    let status: Option<String> = row.get(11)?;

    Ok(Match {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        external_id: row.get(2)?,
        stage: Stage::parse(&stage).unwrap_or(Stage::Group),
        round: row.get(4)?,
        match_type: row.get(5)?,
        player_name: row.get(6)?,
        player_code: row.get(7)?,
        opponent_name: row.get(8)?,
        opponent_code: row.get(9)?,
        link: row.get(10)?,
        result_status: status.as_deref().and_then(ImportStatus::parse),
        result_error: row.get(12)?,
    })
}

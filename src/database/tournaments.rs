use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::{ImportStatus, Tournament};
use crate::domain::DiscoveredTournament;

const TOURNAMENT_COLUMNS: &str =
    "id, external_id, title, date, link, import_status, import_error, matches_saved, created_at";

/// Insert a discovered tournament unless its external id is already known.
/// Returns the stored row and whether it was created now.
pub fn insert_if_absent(
    conn: &mut DbConn,
    tournament: &DiscoveredTournament,
) -> Result<(Tournament, bool)> {
    let sql = "INSERT OR IGNORE INTO tournaments (external_id, title, date, link) VALUES (?1, ?2, ?3, ?4)";

    let inserted = conn
        .execute(
            sql,
            params![
                tournament.external_id,
                tournament.title,
                tournament.date,
                tournament.link
            ],
        )
        .context("Failed to insert tournament")?;

    let stored = find_by_external_id(conn, &tournament.external_id)?.with_context(|| {
        format!("Tournament {} missing after insert", tournament.external_id)
    })?;

    Ok((stored, inserted > 0))
}

pub fn find_by_external_id(conn: &mut DbConn, external_id: &str) -> Result<Option<Tournament>> {
    let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE external_id = ?1");

    conn.query_row(&sql, params![external_id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by external id")
}

/// Set the import status; the error text is cleared unless one is given
pub fn set_import_status(
    conn: &mut DbConn,
    id: i64,
    status: Option<ImportStatus>,
    error: Option<&str>,
) -> Result<()> {
    let sql = "UPDATE tournaments SET import_status = ?1, import_error = ?2 WHERE id = ?3";

    conn.execute(sql, params![status.map(ImportStatus::as_str), error, id])
        .with_context(|| format!("Failed to update import status of tournament {}", id))?;
    Ok(())
}

pub fn set_matches_saved(conn: &mut DbConn, id: i64, saved: bool) -> Result<()> {
    let sql = "UPDATE tournaments SET matches_saved = ?1 WHERE id = ?2";

    conn.execute(sql, params![saved, id])
        .with_context(|| format!("Failed to flag matches of tournament {}", id))?;
    Ok(())
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    let status: Option<String> = row.get(5)?;

    Ok(Tournament {
        id: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        date: row.get(3)?,
        link: row.get(4)?,
        import_status: status.as_deref().and_then(ImportStatus::parse),
        import_error: row.get(6)?,
        matches_saved: row.get(7)?,
        created_at: row.get(8)?,
    })
}

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;
use super::models::{ImportStatus, PlayerResult};
use crate::domain::{PlayerStats, ScrapedPlayerResult};

const RESULT_COLUMNS: &str = "id, match_id, player_identifier, player_code, average, first_nine_average, checkout_percentage, checkout_hits, score_60_count, score_100_count, score_140_count, score_180_count, high_finish, best_leg, worst_leg, legs_won, legs_lost, updated_at";

/// Write both sides of a match and mark it completed, all in one transaction
pub fn upsert_pair(conn: &mut DbConn, match_id: i64, results: &[ScrapedPlayerResult; 2]) -> Result<()> {
    let tx = conn
        .transaction()
        .context("Failed to start player result transaction")?;

    {
        let sql = "INSERT INTO player_results (match_id, player_identifier, player_code, average, first_nine_average, checkout_percentage, checkout_hits, score_60_count, score_100_count, score_140_count, score_180_count, high_finish, best_leg, worst_leg, legs_won, legs_lost) \
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16) \
                   ON CONFLICT (match_id, player_identifier) DO UPDATE SET \
                   player_code = excluded.player_code, average = excluded.average, first_nine_average = excluded.first_nine_average, \
                   checkout_percentage = excluded.checkout_percentage, checkout_hits = excluded.checkout_hits, \
                   score_60_count = excluded.score_60_count, score_100_count = excluded.score_100_count, \
                   score_140_count = excluded.score_140_count, score_180_count = excluded.score_180_count, \
                   high_finish = excluded.high_finish, best_leg = excluded.best_leg, worst_leg = excluded.worst_leg, \
                   legs_won = excluded.legs_won, legs_lost = excluded.legs_lost, updated_at = CURRENT_TIMESTAMP";
        let mut stmt = tx.prepare(sql)?;

        for result in results {
            let s = &result.stats;
            stmt.execute(params![
                match_id,
                result.player_identifier,
                result.player_code,
                s.average,
                s.first_nine_average,
                s.checkout_percentage,
                s.checkout_hits,
                s.score_60_count,
                s.score_100_count,
                s.score_140_count,
                s.score_180_count,
                s.high_finish,
                s.best_leg,
                s.worst_leg,
                s.legs_won,
                s.legs_lost
            ])
            .with_context(|| format!("Failed to upsert result {}", result.player_identifier))?;
        }
    }

    tx.execute(
        "UPDATE matches SET result_status = ?1, result_error = NULL WHERE id = ?2",
        params![ImportStatus::Completed.as_str(), match_id],
    )
    .context("Failed to complete match")?;

    tx.commit().context("Failed to commit player results")?;
    Ok(())
}

pub fn list_by_match(conn: &mut DbConn, match_id: i64) -> Result<Vec<PlayerResult>> {
    let sql = format!("SELECT {RESULT_COLUMNS} FROM player_results WHERE match_id = ?1 ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![match_id], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Statistics of one side of a match, if scraped
pub fn find_stats(conn: &mut DbConn, match_id: i64, player_code: &str) -> Result<Option<PlayerStats>> {
    let sql = format!(
        "SELECT {RESULT_COLUMNS} FROM player_results WHERE match_id = ?1 AND player_code = ?2 ORDER BY id LIMIT 1"
    );

    let row = conn
        .query_row(&sql, params![match_id, player_code], parse_result_row)
        .optional()
        .context("Failed to query player result")?;

    Ok(row.map(|result| result.stats))
}

fn parse_result_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerResult> {
    Ok(PlayerResult {
        id: row.get(0)?,
        match_id: row.get(1)?,
        player_identifier: row.get(2)?,
        player_code: row.get(3)?,
        stats: PlayerStats {
            average: row.get(4)?,
            first_nine_average: row.get(5)?,
            checkout_percentage: row.get(6)?,
            checkout_hits: row.get(7)?,
            score_60_count: row.get(8)?,
            score_100_count: row.get(9)?,
            score_140_count: row.get(10)?,
            score_180_count: row.get(11)?,
            high_finish: row.get(12)?,
            best_leg: row.get(13)?,
            worst_leg: row.get(14)?,
            legs_won: row.get(15)?,
            legs_lost: row.get(16)?,
        },
        updated_at: row.get(17)?,
    })
}

use anyhow::{Context, Result};

use super::connection::DbConn;

/// Create missing tables and indexes; existing data is left alone
pub fn ensure_schema(conn: &mut DbConn) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    let statements = split_sql_statements(schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::info!("Database schema ready");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(strip_comment_lines)
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_comment_lines(statement: &str) -> String {
    statement
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn execute_sql(conn: &mut DbConn, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_drops_comments_and_blanks() {
        let sql = "-- header\nCREATE TABLE a (x);\n\n-- trailing\n";
        assert_eq!(split_sql_statements(sql), vec!["CREATE TABLE a (x)".to_string()]);
    }

    #[test]
    fn test_schema_statements_are_complete() {
        let statements = split_sql_statements(include_str!("schema.sql"));
        assert_eq!(statements.len(), 5);
        assert!(statements.iter().all(|s| s.starts_with("CREATE")));
    }
}

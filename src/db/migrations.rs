//! Snapshot database setup.
//!
//! The table layout is tracked in `PRAGMA user_version`. A database stamped
//! with a newer layout than this build knows is refused rather than altered.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info};

/// Table layout written by [`run_migrations`]. Independent of the snapshot JSON version.
pub const DB_LAYOUT_VERSION: i64 = 1;

/// Open (creating if needed) the snapshot database and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(async move { configure_session_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!(layout = DB_LAYOUT_VERSION, "Snapshot database ready at {}", db_path);
    Ok(pool)
}

async fn layout_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("PRAGMA user_version").fetch_one(pool).await?;
    Ok(row.get(0))
}

/// Apply `schema.sql` and stamp the layout version. Every statement is idempotent.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let found = layout_version(pool).await?;
    if found > DB_LAYOUT_VERSION {
        return Err(sqlx::Error::Protocol(format!(
            "snapshot database layout {} is newer than supported layout {}",
            found, DB_LAYOUT_VERSION
        )));
    }

    let schema_sql = include_str!("schema.sql");
    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    if found < DB_LAYOUT_VERSION {
        // PRAGMA values cannot be bound as parameters.
        sqlx::query(&format!("PRAGMA user_version = {}", DB_LAYOUT_VERSION))
            .execute(pool)
            .await?;
        debug!(from = found, to = DB_LAYOUT_VERSION, "Snapshot layout upgraded");
    }
    Ok(())
}

/// Pragmas applied to every pooled connection.
async fn configure_session_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    // journal_mode reports the mode actually in effect
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!("SQLite journal_mode set to: {}", journal_mode);

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn db_path(temp_dir: &TempDir) -> String {
        temp_dir
            .path()
            .join("nested")
            .join("sessions.db")
            .to_string_lossy()
            .to_string()
    }

    #[tokio::test]
    async fn test_init_db_creates_database_and_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);

        let pool = init_db(&path).await.expect("init_db failed");
        assert!(Path::new(&path).exists());

        let result: (String,) = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='session_snapshots'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, "session_snapshots");
        assert_eq!(layout_version(&pool).await.unwrap(), DB_LAYOUT_VERSION);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        run_migrations(&pool)
            .await
            .expect("second migration run failed");

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='session_snapshots'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_pooled_connections_use_wal_and_busy_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir)).await.expect("init_db failed");

        let mut conn = pool.acquire().await.expect("acquire failed");
        let (journal_mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&mut *conn)
            .await
            .expect("journal_mode query failed");
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let (busy_timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout")
            .fetch_one(&mut *conn)
            .await
            .expect("busy_timeout query failed");
        assert_eq!(busy_timeout, 5000);
    }

    #[tokio::test]
    async fn test_newer_layout_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir);
        let pool = init_db(&path).await.expect("init_db failed");
        sqlx::query(&format!("PRAGMA user_version = {}", DB_LAYOUT_VERSION + 1))
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let err = init_db(&path).await.unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }
}

use sqlx::SqliteConnection;

use crate::{
    db_types::SyncLog,
    traits::{LedgerError, SyncOutcome},
};

pub async fn create_sync_log(sync_type: &str, conn: &mut SqliteConnection) -> Result<SyncLog, LedgerError> {
    let log = sqlx::query_as(
        r#"
            INSERT INTO sync_logs (sync_type, status) VALUES ($1, 'in_progress')
            RETURNING *;
        "#,
    )
    .bind(sync_type)
    .fetch_one(conn)
    .await?;
    Ok(log)
}

pub async fn finalize_sync_log(
    id: i64,
    outcome: SyncOutcome,
    conn: &mut SqliteConnection,
) -> Result<SyncLog, LedgerError> {
    let log = sqlx::query_as(
        r#"
            UPDATE sync_logs
            SET status = $1,
                total_records = $2,
                synced_records = $3,
                failed_records = $4,
                error_summary = $5,
                finished_at = CURRENT_TIMESTAMP
            WHERE id = $6
            RETURNING *;
        "#,
    )
    .bind(outcome.status)
    .bind(outcome.total_records)
    .bind(outcome.synced_records)
    .bind(outcome.failed_records)
    .bind(outcome.error_summary)
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(LedgerError::SyncLogNotFound(id))?;
    Ok(log)
}

pub async fn fetch_sync_log(id: i64, conn: &mut SqliteConnection) -> Result<Option<SyncLog>, LedgerError> {
    let log = sqlx::query_as(r#"SELECT * FROM sync_logs WHERE id = ?"#).bind(id).fetch_optional(conn).await?;
    Ok(log)
}

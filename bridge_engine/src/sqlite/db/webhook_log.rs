use sqlx::SqliteConnection;

use crate::{
    db_types::{NewWebhookLog, WebhookLogEntry},
    traits::LedgerError,
};

/// Appends an entry to the webhook audit trail. The table is write-only as far as the pipeline is concerned.
pub async fn insert_webhook_log(
    entry: NewWebhookLog,
    conn: &mut SqliteConnection,
) -> Result<WebhookLogEntry, LedgerError> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO webhook_log (payload, headers, source_ip, signature_valid)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(entry.payload)
    .bind(entry.headers)
    .bind(entry.source_ip)
    .bind(entry.signature_valid)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

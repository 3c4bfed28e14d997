use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{
    db_types::{ClientRecord, ClientUpsert},
    traits::LedgerError,
};

/// Inserts or refreshes the cached copy of a UISP client, keyed by the UISP id. `last_payment_at` is left
/// alone on refresh; only [`touch_last_payment`] moves it.
pub async fn upsert_client(client: ClientUpsert, conn: &mut SqliteConnection) -> Result<ClientRecord, LedgerError> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO clients (
                uisp_id,
                user_ident,
                name,
                email,
                phone,
                account_balance,
                account_outstanding,
                is_active,
                is_suspended,
                raw
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (uisp_id) DO UPDATE SET
                user_ident = excluded.user_ident,
                name = excluded.name,
                email = excluded.email,
                phone = excluded.phone,
                account_balance = excluded.account_balance,
                account_outstanding = excluded.account_outstanding,
                is_active = excluded.is_active,
                is_suspended = excluded.is_suspended,
                raw = excluded.raw,
                synced_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(client.uisp_id)
    .bind(client.user_ident)
    .bind(client.name)
    .bind(client.email)
    .bind(client.phone)
    .bind(client.account_balance.value())
    .bind(client.account_outstanding.value())
    .bind(client.is_active)
    .bind(client.is_suspended)
    .bind(client.raw)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

pub async fn fetch_client_by_uisp_id(
    uisp_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ClientRecord>, LedgerError> {
    let client =
        sqlx::query_as(r#"SELECT * FROM clients WHERE uisp_id = ?"#).bind(uisp_id).fetch_optional(conn).await?;
    Ok(client)
}

/// Stamps `last_payment_at` for the client. Clients that have not been synced yet have no row to stamp, and
/// that is fine; the next sync will create one.
pub async fn touch_last_payment(
    uisp_id: i64,
    at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), LedgerError> {
    sqlx::query(r#"UPDATE clients SET last_payment_at = $1 WHERE uisp_id = $2"#)
        .bind(at)
        .bind(uisp_id)
        .execute(conn)
        .await?;
    Ok(())
}

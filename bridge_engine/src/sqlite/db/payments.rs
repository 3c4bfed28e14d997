use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewPayment, PaymentRecord},
    traits::LedgerError,
};

/// Inserts a new `pending` payment. The unique index on `transaction_id` is what enforces idempotency: a
/// second insert for the same transaction id fails with [`LedgerError::DuplicateTransaction`] no matter how
/// close together the two calls were issued.
pub async fn insert_payment(payment: NewPayment, conn: &mut SqliteConnection) -> Result<PaymentRecord, LedgerError> {
    let txid = payment.transaction_id.clone();
    let record = sqlx::query_as(
        r#"
            INSERT INTO payments (
                transaction_id,
                client_id,
                splynx_customer_id,
                amount,
                currency_code,
                payment_type,
                payment_method,
                note,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(payment.transaction_id)
    .bind(payment.client_id)
    .bind(payment.splynx_customer_id)
    .bind(payment.amount.value())
    .bind(payment.currency_code)
    .bind(payment.payment_type)
    .bind(payment.payment_method)
    .bind(payment.note)
    .bind(payment.created_at)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => LedgerError::DuplicateTransaction(txid),
        _ => LedgerError::from(e),
    })?;
    Ok(record)
}

pub async fn fetch_payment(txid: &str, conn: &mut SqliteConnection) -> Result<Option<PaymentRecord>, LedgerError> {
    let payment = sqlx::query_as(r#"SELECT * FROM payments WHERE transaction_id = ?"#)
        .bind(txid)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

/// Moves a `pending` payment to `success` and stores the downstream response verbatim. The status guard is in
/// the WHERE clause, so a terminal payment can never be rewritten, not even by two racing updates.
pub async fn mark_success(
    txid: &str,
    uisp_response: &str,
    conn: &mut SqliteConnection,
) -> Result<PaymentRecord, LedgerError> {
    let updated = sqlx::query_as(
        r#"
            UPDATE payments
            SET status = 'success', uisp_response = $1, updated_at = CURRENT_TIMESTAMP
            WHERE transaction_id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(uisp_response)
    .bind(txid)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(record) => {
            debug!("🗃️ Payment [{txid}] marked as success");
            Ok(record)
        },
        None => Err(status_change_rejection(txid, conn).await),
    }
}

/// Moves a `pending` payment to `failed` and stores the triggering error message.
pub async fn mark_failed(
    txid: &str,
    error_message: &str,
    conn: &mut SqliteConnection,
) -> Result<PaymentRecord, LedgerError> {
    let updated = sqlx::query_as(
        r#"
            UPDATE payments
            SET status = 'failed', error_message = $1, updated_at = CURRENT_TIMESTAMP
            WHERE transaction_id = $2 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(error_message)
    .bind(txid)
    .fetch_optional(&mut *conn)
    .await?;
    match updated {
        Some(record) => {
            debug!("🗃️ Payment [{txid}] marked as failed");
            Ok(record)
        },
        None => Err(status_change_rejection(txid, conn).await),
    }
}

/// The conditional update matched no row. Work out whether the payment is missing or already terminal.
async fn status_change_rejection(txid: &str, conn: &mut SqliteConnection) -> LedgerError {
    match fetch_payment(txid, conn).await {
        Ok(Some(p)) => LedgerError::IllegalStatusChange { transaction_id: txid.to_string(), current: p.status },
        Ok(None) => LedgerError::PaymentNotFound(txid.to_string()),
        Err(e) => e,
    }
}

pub async fn record_retry_attempt(txid: &str, conn: &mut SqliteConnection) -> Result<PaymentRecord, LedgerError> {
    let record = sqlx::query_as(
        r#"
            UPDATE payments
            SET retry_count = retry_count + 1, last_retry_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE transaction_id = $1
            RETURNING *;
        "#,
    )
    .bind(txid)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| LedgerError::PaymentNotFound(txid.to_string()))?;
    Ok(record)
}

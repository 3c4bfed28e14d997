use thiserror::Error;

use crate::db_types::{NewPayment, NewWebhookLog, PaymentRecord, PaymentStatus, WebhookLogEntry};

/// Storage contract for the payment state machine and the webhook audit trail.
///
/// Idempotency lives here: [`insert_pending_payment`](Self::insert_pending_payment) must fail with
/// [`LedgerError::DuplicateTransaction`] when the transaction id is already ledgered, enforced by the store's
/// own uniqueness guarantee rather than a read-then-insert check. Two concurrent webhooks for the same
/// transaction id may both pass any client-side check; the second insert is the one that must lose.
#[allow(async_fn_in_trait)]
pub trait PaymentLedger {
    /// The URL of the backing database.
    fn url(&self) -> &str;

    /// Atomically create a new `pending` payment row. Fails with [`LedgerError::DuplicateTransaction`] when a
    /// row with the same transaction id already exists.
    async fn insert_pending_payment(&self, payment: NewPayment) -> Result<PaymentRecord, LedgerError>;

    async fn fetch_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, LedgerError>;

    /// Transition a `pending` payment to `success`, storing the downstream response body verbatim.
    ///
    /// Fails with [`LedgerError::IllegalStatusChange`] when the payment is already terminal, and with
    /// [`LedgerError::PaymentNotFound`] when it does not exist at all.
    async fn mark_payment_success(
        &self,
        transaction_id: &str,
        uisp_response: &str,
    ) -> Result<PaymentRecord, LedgerError>;

    /// Transition a `pending` payment to `failed`, storing the triggering error message. Same failure modes as
    /// [`mark_payment_success`](Self::mark_payment_success).
    async fn mark_payment_failed(
        &self,
        transaction_id: &str,
        error_message: &str,
    ) -> Result<PaymentRecord, LedgerError>;

    /// Bump `retry_count` and stamp `last_retry_at` for the payment. Called by the retry engine's observer
    /// before each retry, while the payment is still `pending`.
    async fn record_retry_attempt(&self, transaction_id: &str) -> Result<PaymentRecord, LedgerError>;

    /// Append an entry to the write-only webhook audit trail.
    async fn insert_webhook_log(&self, entry: NewWebhookLog) -> Result<WebhookLogEntry, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert payment, since it already exists with transaction id {0}")]
    DuplicateTransaction(String),
    #[error("The requested payment does not exist for transaction id {0}")]
    PaymentNotFound(String),
    #[error("Illegal payment status change. Payment {transaction_id} is already {current}")]
    IllegalStatusChange { transaction_id: String, current: PaymentStatus },
    #[error("The requested sync log {0} does not exist")]
    SyncLogNotFound(i64),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

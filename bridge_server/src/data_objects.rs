use std::fmt::Display;

use bridge_engine::{
    db_types::{PaymentStatus, SyncLog, SyncStatus},
    PaymentOutcome,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The webhook response body. Pings only carry a message; ledgered payments also report the transaction id,
/// the final status and the downstream UISP payment id when one came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAck {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uisp_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

impl PaymentAck {
    pub fn ping() -> Self {
        Self { message: "Webhook received".to_string(), transaction_id: None, uisp_payment_id: None, status: None }
    }

    pub fn processed(outcome: &PaymentOutcome) -> Self {
        let message =
            if outcome.replayed { "Payment already processed.".to_string() } else { "Payment processed.".to_string() };
        Self {
            message,
            transaction_id: Some(outcome.payment.transaction_id.clone()),
            uisp_payment_id: outcome.uisp_payment_id.clone(),
            status: Some(outcome.payment.status),
        }
    }
}

/// What a sync endpoint returns to the caller, a straight rendering of the finalized sync log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub sync_type: String,
    pub status: SyncStatus,
    pub total_records: i64,
    pub synced_records: i64,
    pub failed_records: i64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
}

impl From<SyncLog> for SyncSummary {
    fn from(log: SyncLog) -> Self {
        Self {
            sync_type: log.sync_type,
            status: log.status,
            total_records: log.total_records,
            synced_records: log.synced_records,
            failed_records: log.failed_records,
            started_at: log.started_at,
            finished_at: log.finished_at,
            error_summary: log.error_summary,
        }
    }
}

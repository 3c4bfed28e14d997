use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use bridge_common::{Money, DEFAULT_CURRENCY_CODE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

//-----------------------------------------   PaymentStatus   ---------------------------------------------------------

/// The lifecycle of a ledgered payment. A payment is created as `Pending` and moves to exactly one of the two
/// terminal states. Retries never change the status while attempts are in flight, they only bump the retry counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(format!("Invalid payment status: {s}")),
        }
    }
}

//-----------------------------------------   PaymentRecord   ---------------------------------------------------------

/// A single row in the payment ledger. The ledger is the source of truth for everything the bridge has seen.
/// The mirror and UISP only ever hold derived copies.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    /// Caller-supplied idempotency key, or a synthesized one when the webhook did not carry a transaction id.
    pub transaction_id: String,
    /// The resolved UISP client id the payment was (or will be) forwarded to.
    pub client_id: i64,
    /// The customer identifier as it arrived from Splynx, kept for diagnostics.
    pub splynx_customer_id: Option<String>,
    pub amount: Money,
    pub currency_code: String,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub status: PaymentStatus,
    /// The verbatim response body UISP returned when the forward succeeded.
    pub uisp_response: Option<String>,
    /// The last error message when the forward exhausted its retry budget.
    pub error_message: Option<String>,
    pub retry_count: i64,
    pub last_retry_at: Option<DateTime<Utc>>,
    /// Business timestamp of the payment. Caller-supplied, otherwise the intake time.
    pub created_at: DateTime<Utc>,
    /// The moment the webhook hit the bridge.
    pub received_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub transaction_id: String,
    pub client_id: i64,
    pub splynx_customer_id: Option<String>,
    pub amount: Money,
    pub currency_code: String,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    pub fn new<S: Into<String>>(transaction_id: S, client_id: i64, amount: Money) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            client_id,
            splynx_customer_id: None,
            amount,
            currency_code: DEFAULT_CURRENCY_CODE.to_string(),
            payment_type: None,
            payment_method: None,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_splynx_customer<S: Into<String>>(mut self, customer_id: S) -> Self {
        self.splynx_customer_id = Some(customer_id.into());
        self
    }

    pub fn with_currency<S: Into<String>>(mut self, currency_code: S) -> Self {
        self.currency_code = currency_code.into();
        self
    }

    pub fn with_payment_type<S: Into<String>>(mut self, payment_type: S) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn with_payment_method<S: Into<String>>(mut self, payment_method: S) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

//-----------------------------------------   WebhookLogEntry   -------------------------------------------------------

/// Immutable audit record of an inbound webhook call. Written before any business logic runs and never read by
/// the pipeline itself.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub id: i64,
    pub payload: String,
    pub headers: Option<String>,
    pub source_ip: Option<String>,
    /// `None` means no shared secret was configured, so no verdict could be reached.
    pub signature_valid: Option<bool>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewWebhookLog {
    pub payload: String,
    pub headers: Option<String>,
    pub source_ip: Option<String>,
    pub signature_valid: Option<bool>,
}

impl NewWebhookLog {
    pub fn new<S: Into<String>>(payload: S) -> Self {
        Self { payload: payload.into(), headers: None, source_ip: None, signature_valid: None }
    }

    pub fn with_headers<S: Into<String>>(mut self, headers: S) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn with_source_ip<S: Into<String>>(mut self, ip: S) -> Self {
        self.source_ip = Some(ip.into());
        self
    }

    pub fn with_signature_verdict(mut self, valid: Option<bool>) -> Self {
        self.signature_valid = valid;
        self
    }
}

//-----------------------------------------   CustomerMapping   -------------------------------------------------------

/// A persisted Splynx to UISP identity association. At most one mapping exists per Splynx customer id. Used as the
/// last-resort resolution strategy and as a cache of resolutions discovered by the other strategies.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerMapping {
    pub id: i64,
    pub splynx_customer_id: String,
    pub uisp_client_id: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomerMapping {
    pub splynx_customer_id: String,
    pub uisp_client_id: i64,
    pub notes: Option<String>,
}

impl NewCustomerMapping {
    pub fn new<S: Into<String>>(splynx_customer_id: S, uisp_client_id: i64) -> Self {
        Self { splynx_customer_id: splynx_customer_id.into(), uisp_client_id, notes: None }
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

//-----------------------------------------   ClientRecord   ----------------------------------------------------------

/// Cached copy of a UISP client, refreshed by the client sync. Keyed by the UISP id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub uisp_id: i64,
    /// UISP's free-form external identifier field, which this deployment uses to hold the Splynx login.
    pub user_ident: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub account_balance: Money,
    pub account_outstanding: Money,
    pub is_active: bool,
    pub is_suspended: bool,
    /// The raw UISP payload as JSON text, kept so nothing is lost in translation.
    pub raw: Option<String>,
    pub synced_at: DateTime<Utc>,
    pub last_payment_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ClientUpsert {
    pub uisp_id: i64,
    pub user_ident: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub account_balance: Money,
    pub account_outstanding: Money,
    pub is_active: bool,
    pub is_suspended: bool,
    pub raw: Option<String>,
}

impl ClientUpsert {
    pub fn new(uisp_id: i64) -> Self {
        Self {
            uisp_id,
            user_ident: None,
            name: None,
            email: None,
            phone: None,
            account_balance: Money::default(),
            account_outstanding: Money::default(),
            is_active: true,
            is_suspended: false,
            raw: None,
        }
    }
}

//-----------------------------------------   SyncLog   ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::InProgress => write!(f, "in_progress"),
            SyncStatus::Completed => write!(f, "completed"),
            SyncStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SyncStatus::InProgress),
            "completed" => Ok(SyncStatus::Completed),
            "failed" => Ok(SyncStatus::Failed),
            _ => Err(format!("Invalid sync status: {s}")),
        }
    }
}

/// One row per bulk sync run. Created when the run starts, finalized exactly once when it ends.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SyncLog {
    pub id: i64,
    pub sync_type: String,
    pub status: SyncStatus,
    pub total_records: i64,
    pub synced_records: i64,
    pub failed_records: i64,
    pub error_summary: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

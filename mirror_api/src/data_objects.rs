use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row shape for the mirror's `payments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorPayment {
    pub transaction_id: String,
    pub splynx_customer_id: String,
    pub uisp_client_id: i64,
    /// Major currency units. The ledger stores cents, the mirror stores decimals.
    pub amount: f64,
    pub currency_code: String,
    pub status: MirrorPaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorPaymentStatus {
    Pending,
    Success,
    Failed,
}

/// Row shape for the mirror's `clients` table (UISP side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorClient {
    pub uisp_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ident: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub account_balance: f64,
    pub account_outstanding: f64,
    pub is_active: bool,
    pub is_suspended: bool,
    pub synced_at: DateTime<Utc>,
}

/// Row shape for the mirror's `splynx_customers` table (billing side).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorSourceCustomer {
    pub splynx_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub synced_at: DateTime<Utc>,
}

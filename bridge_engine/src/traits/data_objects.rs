use bridge_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db_types::{ClientUpsert, SyncStatus};

/// A UISP client as seen through the [`TargetCrm`](crate::traits::TargetCrm) seam, already converted to the
/// bridge's own types.
#[derive(Debug, Clone, PartialEq)]
pub struct CrmClient {
    pub id: i64,
    pub user_ident: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub account_balance: Money,
    pub account_outstanding: Money,
    pub is_active: bool,
    pub is_suspended: bool,
    pub raw: Value,
}

impl CrmClient {
    /// The transform step of the client sync: the remote record shaped for the ledger's client cache.
    pub fn as_upsert(&self) -> ClientUpsert {
        ClientUpsert {
            uisp_id: self.id,
            user_ident: self.user_ident.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            account_balance: self.account_balance,
            account_outstanding: self.account_outstanding,
            is_active: self.is_active,
            is_suspended: self.is_suspended,
            raw: Some(self.raw.to_string()),
        }
    }
}

/// Everything the forwarder needs to hand a payment to UISP.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub client_id: i64,
    pub amount: Money,
    pub currency_code: String,
    pub note: Option<String>,
    /// UISP payment method id. `None` means the adapter's default applies.
    pub method: Option<i64>,
    /// Becomes UISP's `providerPaymentId`, tying the downstream record back to the ledger.
    pub provider_payment_id: String,
    pub paid_at: DateTime<Utc>,
}

/// A Splynx customer as seen through the [`SourceDirectory`](crate::traits::SourceDirectory) seam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCustomer {
    pub id: i64,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

/// Final tallies for a sync run, handed to
/// [`ClientSyncStore::finalize_sync_log`](crate::traits::ClientSyncStore::finalize_sync_log).
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    pub total_records: i64,
    pub synced_records: i64,
    pub failed_records: i64,
    pub error_summary: Option<String>,
}

impl SyncOutcome {
    pub fn completed(total_records: i64, synced_records: i64, failed_records: i64) -> Self {
        Self { status: SyncStatus::Completed, total_records, synced_records, failed_records, error_summary: None }
    }

    pub fn failed<S: Into<String>>(
        total_records: i64,
        synced_records: i64,
        failed_records: i64,
        error_summary: S,
    ) -> Self {
        Self {
            status: SyncStatus::Failed,
            total_records,
            synced_records,
            failed_records,
            error_summary: Some(error_summary.into()),
        }
    }
}

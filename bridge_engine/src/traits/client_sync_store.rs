use chrono::{DateTime, Utc};

use crate::{
    db_types::{ClientRecord, ClientUpsert, SyncLog},
    traits::{LedgerError, SyncOutcome},
};

/// Storage contract for the cached UISP client copies and the bulk sync run logs.
#[allow(async_fn_in_trait)]
pub trait ClientSyncStore {
    /// Insert or refresh the cached copy of a UISP client, keyed by the UISP id. `synced_at` is stamped on
    /// every call.
    async fn upsert_client(&self, client: ClientUpsert) -> Result<ClientRecord, LedgerError>;

    async fn fetch_client_by_uisp_id(&self, uisp_id: i64) -> Result<Option<ClientRecord>, LedgerError>;

    /// Stamp `last_payment_at` for the client. A no-op when the client has not been cached yet.
    async fn touch_last_payment(&self, uisp_id: i64, at: DateTime<Utc>) -> Result<(), LedgerError>;

    /// Open a new sync run record in the `in_progress` state.
    async fn create_sync_log(&self, sync_type: &str) -> Result<SyncLog, LedgerError>;

    /// Close a sync run record with its final status and counts. A run is finalized exactly once.
    async fn finalize_sync_log(&self, id: i64, outcome: SyncOutcome) -> Result<SyncLog, LedgerError>;

    async fn fetch_sync_log(&self, id: i64) -> Result<Option<SyncLog>, LedgerError>;
}

use thiserror::Error;

use crate::traits::data_objects::{CrmClient, PaymentSubmission, SourceCustomer};

/// The Splynx side of the bridge: a read-only customer directory.
#[allow(async_fn_in_trait)]
pub trait SourceDirectory {
    /// Fetch the login (account handle) for the given Splynx customer id. `Ok(None)` means the customer is
    /// unknown to Splynx, which is not an error.
    async fn customer_login(&self, customer_id: &str) -> Result<Option<String>, CollaboratorError>;

    /// Fetch up to `limit` customers from the directory in a single call.
    async fn fetch_customers(&self, limit: u32) -> Result<Vec<SourceCustomer>, CollaboratorError>;
}

/// The UISP side of the bridge: client lookups and the payment endpoint.
#[allow(async_fn_in_trait)]
pub trait TargetCrm {
    /// Search the client collection for the entry whose external identifier (`userIdent`) equals `external_id`.
    ///
    /// This is a full-collection scan bounded to a single fetch, filtered client-side. It is not an error for
    /// nothing to match.
    async fn find_client_by_external_id(&self, external_id: &str) -> Result<Option<CrmClient>, CollaboratorError>;

    async fn fetch_client(&self, client_id: i64) -> Result<Option<CrmClient>, CollaboratorError>;

    /// One page of the client collection, for the bulk sync.
    async fn fetch_clients_page(&self, limit: u32, offset: u32) -> Result<Vec<CrmClient>, CollaboratorError>;

    /// Submit a payment and return the raw response body of the created record.
    async fn submit_payment(&self, payment: &PaymentSubmission) -> Result<String, CollaboratorError>;
}

/// Transport-level failures from either remote system. Resolution strategies catch these individually and
/// fall through to the next strategy rather than aborting.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Remote system returned {status}: {message}")]
    RemoteResponse { status: u16, message: String },
    #[error("Could not make sense of the remote response: {0}")]
    Protocol(String),
}

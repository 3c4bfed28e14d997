use thiserror::Error;

use crate::{
    resolver::ResolveError,
    traits::{CollaboratorError, LedgerError},
};

#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Collaborator(#[from] CollaboratorError),
    #[error("Payment {transaction_id} could not be delivered to UISP. {message}")]
    ForwardingFailed { transaction_id: String, message: String },
}

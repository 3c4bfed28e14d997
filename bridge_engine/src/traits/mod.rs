//! # Storage and collaborator contracts
//!
//! This module defines the interface contracts the bridge is written against.
//!
//! ## Stores
//! The ledger store exclusively owns all durable state. It is split into three traits so that callers only
//! carry the capability they need:
//!
//! * [`PaymentLedger`] covers the payment state machine and the webhook audit trail.
//! * [`MappingStore`] covers the persisted Splynx to UISP identity mappings.
//! * [`ClientSyncStore`] covers the cached UISP client copies and the sync run logs.
//!
//! A production backend (see [`crate::SqliteDatabase`]) implements all three, and therefore also the
//! [`BridgeStore`] umbrella trait that the server hands to the payment flow in one piece.
//!
//! ## Collaborators
//! The two remote systems are abstracted behind [`SourceDirectory`] (the Splynx customer directory) and
//! [`TargetCrm`] (the UISP CRM). The engine never talks HTTP itself, which is what makes the payment flow
//! testable without a network.
mod client_sync_store;
mod collaborators;
mod data_objects;
mod mapping_store;
mod payment_ledger;

pub use client_sync_store::ClientSyncStore;
pub use collaborators::{CollaboratorError, SourceDirectory, TargetCrm};
pub use data_objects::{CrmClient, PaymentSubmission, SourceCustomer, SyncOutcome};
pub use mapping_store::MappingStore;
pub use payment_ledger::{LedgerError, PaymentLedger};

/// Umbrella trait for backends that can carry a complete payment flow.
///
/// Blanket-implemented for any type that implements the three store traits, so backends never
/// implement it by hand.
pub trait BridgeStore: PaymentLedger + MappingStore + ClientSyncStore {}

impl<T: PaymentLedger + MappingStore + ClientSyncStore> BridgeStore for T {}

//! # Splynx to UISP payment bridge engine
//!
//! This library holds the core logic of the bridge: the payment ledger, the identity resolver, the retry
//! engine and the sync flows. It is transport-agnostic; the HTTP server and the concrete Splynx/UISP/mirror
//! clients live in their own crates and plug in through the traits defined here.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend). The ledger store owns all durable state: payments,
//!    the webhook audit trail, identity mappings, cached client copies and sync run logs. You should never
//!    need to touch the database directly; go through the public APIs. The exception is the data types, which
//!    are defined in [`mod@db_types`] and are public.
//! 2. The engine public API ([`PaymentFlowApi`] and [`ClientSyncApi`]), generic over the storage traits and
//!    the two remote-system seams.
//! 3. Events ([`mod@events`]). The engine emits events when payments are ledgered, when they reach a terminal
//!    state and when sync batches land. A simple actor setup lets deployments hook into these, which is how
//!    the reporting mirror is fed without ever blocking the payment path.
mod bridge_api;
mod resolver;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

pub use bridge_api::{
    client_sync_api::{ClientSyncApi, SOURCE_FETCH_LIMIT, SYNC_PAGE_SIZE},
    errors::BridgeError,
    payment_flow_api::PaymentFlowApi,
    payment_objects::{PaymentIntake, PaymentOutcome},
};
pub use resolver::{resolve_customer, ResolutionStrategy, ResolveError, ResolvedClient};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

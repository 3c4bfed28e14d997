//! A thin client for the optional reporting mirror, a PostgREST-style store that keeps read-only copies of
//! payments and customer records. Everything here is best-effort. The bridge never blocks on the mirror and
//! never treats a mirror failure as fatal.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::MirrorApi;
pub use config::MirrorConfig;
pub use data_objects::{MirrorClient, MirrorPayment, MirrorPaymentStatus, MirrorSourceCustomer};
pub use error::MirrorApiError;

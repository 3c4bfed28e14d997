//! The public-facing API of the payment engine.
//!
//! [`payment_flow_api::PaymentFlowApi`] owns the webhook-to-UISP pipeline and
//! [`client_sync_api::ClientSyncApi`] owns the bulk and single-client sync flows. Both are generic over the
//! storage traits and the two remote-system seams, so the server wires in production adapters and the tests
//! wire in scripted ones.
pub mod client_sync_api;
pub mod errors;
pub mod payment_flow_api;
pub mod payment_objects;

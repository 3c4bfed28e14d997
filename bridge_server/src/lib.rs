//! # Payment bridge server
//! This crate hosts the HTTP front end of the Splynx to UISP payment bridge. It is responsible for:
//! Listening for incoming payment webhooks from Splynx.
//! Normalizing the payload shapes, auditing every call and handing normalized payments to the engine.
//! Exposing the bulk sync endpoints and wiring the optional reporting mirror into the engine's events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/payment`: The webhook route for receiving payment notifications from Splynx.
//! * `/sync/clients`: Runs a full UISP client sync and returns the sync log.
//! * `/sync/customers`: Takes a fresh snapshot of the Splynx customer collection.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod endpoint_tests;

//! Identity resolution between the two systems.
//!
//! Splynx addresses customers by numeric id or login. UISP addresses clients by its own numeric id, with the
//! Splynx login stashed in the free-form `userIdent` field. [`resolve_customer`] bridges the two with three
//! ordered strategies, stopping at the first hit:
//!
//! 1. Ask Splynx for the customer's login, then search UISP for a client whose external identifier equals it.
//! 2. If the raw identifier already follows the walk-in naming convention (a `W` prefix followed by digits),
//!    search UISP for it directly.
//! 3. Fall back to the persisted mapping table.
//!
//! "Not found" is never an error inside a strategy; only transport failures are, and those are caught per
//! strategy so that a wobbly remote cannot mask a mapping that would have resolved.
use std::fmt::{Display, Formatter};

use log::*;
use regex::Regex;
use thiserror::Error;

use crate::{
    db_types::NewCustomerMapping,
    traits::{MappingStore, SourceDirectory, TargetCrm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    DirectoryLogin,
    DirectIdentifier,
    StoredMapping,
}

impl Display for ResolutionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionStrategy::DirectoryLogin => write!(f, "directory login"),
            ResolutionStrategy::DirectIdentifier => write!(f, "direct identifier"),
            ResolutionStrategy::StoredMapping => write!(f, "stored mapping"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClient {
    pub client_id: i64,
    /// The Splynx login, when strategy 1 got far enough to fetch it. Kept for diagnostics.
    pub login: Option<String>,
    pub strategy: ResolutionStrategy,
}

#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("No UISP client could be resolved for Splynx customer {source_id} (login: {login:?})")]
    CustomerNotFound { source_id: String, login: Option<String> },
}

pub async fn resolve_customer<B, S, T>(
    directory: &S,
    crm: &T,
    mappings: &B,
    source_id: &str,
) -> Result<ResolvedClient, ResolveError>
where
    B: MappingStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    let mut login = None;
    // Strategy 1: Splynx login -> UISP external identifier search.
    match directory.customer_login(source_id).await {
        Ok(Some(handle)) => {
            login = Some(handle.clone());
            match crm.find_client_by_external_id(&handle).await {
                Ok(Some(client)) => {
                    debug!("🔎️ Customer {source_id} resolved to UISP client {} via login {handle}", client.id);
                    remember_mapping(mappings, source_id, client.id, "directory login").await;
                    return Ok(ResolvedClient {
                        client_id: client.id,
                        login,
                        strategy: ResolutionStrategy::DirectoryLogin,
                    });
                },
                Ok(None) => debug!("🔎️ No UISP client carries the external identifier {handle}"),
                Err(e) => warn!("🔎️ UISP search for login {handle} failed: {e}. Trying the next strategy."),
            }
        },
        Ok(None) => debug!("🔎️ Splynx has no customer with id {source_id}"),
        Err(e) => warn!("🔎️ Splynx directory lookup for {source_id} failed: {e}. Trying the next strategy."),
    }

    // Strategy 2: walk-in customers carry their UISP external identifier as the Splynx id itself.
    let walk_in = Regex::new(r"^W\d+$").unwrap();
    if walk_in.is_match(source_id) {
        match crm.find_client_by_external_id(source_id).await {
            Ok(Some(client)) => {
                debug!("🔎️ Customer {source_id} resolved to UISP client {} via direct identifier", client.id);
                remember_mapping(mappings, source_id, client.id, "direct identifier").await;
                return Ok(ResolvedClient { client_id: client.id, login, strategy: ResolutionStrategy::DirectIdentifier });
            },
            Ok(None) => debug!("🔎️ No UISP client carries the external identifier {source_id}"),
            Err(e) => warn!("🔎️ UISP search for identifier {source_id} failed: {e}. Trying the next strategy."),
        }
    }

    // Strategy 3: the mapping table.
    match mappings.fetch_mapping(source_id).await {
        Ok(Some(mapping)) => {
            debug!("🔎️ Customer {source_id} resolved to UISP client {} via stored mapping", mapping.uisp_client_id);
            return Ok(ResolvedClient {
                client_id: mapping.uisp_client_id,
                login,
                strategy: ResolutionStrategy::StoredMapping,
            });
        },
        Ok(None) => debug!("🔎️ No stored mapping for customer {source_id}"),
        Err(e) => warn!("🔎️ Mapping lookup for {source_id} failed: {e}"),
    }

    Err(ResolveError::CustomerNotFound { source_id: source_id.to_string(), login })
}

/// Persist a resolution discovered by strategies 1 or 2, so that future webhooks can fall back on the mapping
/// table even if the remote systems are down. Failure to store is logged and swallowed; the caller already
/// has its answer.
async fn remember_mapping<B: MappingStore>(mappings: &B, source_id: &str, client_id: i64, via: &str) {
    let mapping = NewCustomerMapping::new(source_id, client_id).with_notes(format!("resolved via {via}"));
    if let Err(e) = mappings.upsert_mapping(mapping).await {
        warn!("🔎️ Could not persist mapping {source_id} -> {client_id}: {e}");
    }
}

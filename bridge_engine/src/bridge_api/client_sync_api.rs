//! `ClientSyncApi` keeps the ledger's client cache and the mirror fed with fresh UISP and Splynx records.
use log::*;

use crate::{
    bridge_api::errors::BridgeError,
    db_types::{ClientRecord, SyncLog},
    events::{ClientsSyncedEvent, EventProducers, SourceCustomersSyncedEvent},
    traits::{ClientSyncStore, SourceCustomer, SourceDirectory, SyncOutcome, TargetCrm},
};

/// Page size for the bulk client sync. A page shorter than this ends the run.
pub const SYNC_PAGE_SIZE: u32 = 100;
/// How many Splynx customers a directory sync fetches in its single call.
pub const SOURCE_FETCH_LIMIT: u32 = 500;

pub struct ClientSyncApi<B, S, T> {
    db: B,
    directory: S,
    crm: T,
    producers: EventProducers,
}

impl<B, S, T> ClientSyncApi<B, S, T>
where
    B: ClientSyncStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    pub fn new(db: B, directory: S, crm: T, producers: EventProducers) -> Self {
        Self { db, directory, crm, producers }
    }

    /// Pages through the whole UISP client collection, upserting each record into the ledger's client cache.
    ///
    /// A record that fails to store is counted and skipped; the run carries on. A page fetch that fails kills
    /// the run: the sync log is finalized as `failed` and the transport error is returned. Either way the log
    /// row created at the start is finalized exactly once.
    pub async fn sync_all_clients(&self) -> Result<SyncLog, BridgeError> {
        let log = self.db.create_sync_log("uisp_clients").await?;
        info!("🔄️ UISP client sync started (run {})", log.id);
        let mut total = 0i64;
        let mut synced = 0i64;
        let mut failed = 0i64;
        let mut offset = 0u32;
        loop {
            let page = match self.crm.fetch_clients_page(SYNC_PAGE_SIZE, offset).await {
                Ok(page) => page,
                Err(e) => {
                    error!("🔄️ Client sync run {} died fetching the page at offset {offset}: {e}", log.id);
                    let outcome = SyncOutcome::failed(total, synced, failed, e.to_string());
                    self.db.finalize_sync_log(log.id, outcome).await?;
                    return Err(e.into());
                },
            };
            let fetched = page.len();
            total += fetched as i64;
            let mut stored = Vec::with_capacity(fetched);
            for client in page {
                let uisp_id = client.id;
                match self.db.upsert_client(client.as_upsert()).await {
                    Ok(record) => {
                        synced += 1;
                        stored.push(record);
                    },
                    Err(e) => {
                        failed += 1;
                        warn!("🔄️ Could not cache UISP client {uisp_id}: {e}");
                    },
                }
            }
            if !stored.is_empty() {
                self.call_clients_synced_hooks(stored).await;
            }
            if fetched < SYNC_PAGE_SIZE as usize {
                break;
            }
            offset += SYNC_PAGE_SIZE;
        }
        let log = self.db.finalize_sync_log(log.id, SyncOutcome::completed(total, synced, failed)).await?;
        info!("🔄️ UISP client sync run {} finished. {synced} of {total} records cached, {failed} failed", log.id);
        Ok(log)
    }

    /// Refreshes the cached copy of a single UISP client. Returns `None` when UISP no longer knows the id.
    ///
    /// Invoked opportunistically after a successful payment forward, so the cached balance tracks reality
    /// without waiting for the next bulk run.
    pub async fn sync_client(&self, uisp_id: i64) -> Result<Option<ClientRecord>, BridgeError> {
        match self.crm.fetch_client(uisp_id).await? {
            Some(client) => {
                let record = self.db.upsert_client(client.as_upsert()).await?;
                debug!("🔄️ Refreshed cached copy of UISP client {uisp_id}");
                Ok(Some(record))
            },
            None => {
                warn!("🔄️ UISP client {uisp_id} no longer exists. Nothing to refresh.");
                Ok(None)
            },
        }
    }

    /// Fetches a batch of Splynx customers and hands them to the subscribed hooks (in production, the mirror).
    /// The ledger itself keeps no copy of Splynx customers, only the run log.
    pub async fn sync_source_customers(&self) -> Result<SyncLog, BridgeError> {
        let log = self.db.create_sync_log("splynx_customers").await?;
        info!("🔄️ Splynx customer sync started (run {})", log.id);
        let customers = match self.directory.fetch_customers(SOURCE_FETCH_LIMIT).await {
            Ok(customers) => customers,
            Err(e) => {
                error!("🔄️ Splynx customer sync run {} died: {e}", log.id);
                let outcome = SyncOutcome::failed(0, 0, 0, e.to_string());
                self.db.finalize_sync_log(log.id, outcome).await?;
                return Err(e.into());
            },
        };
        let total = customers.len() as i64;
        self.call_source_customers_synced_hooks(customers).await;
        let log = self.db.finalize_sync_log(log.id, SyncOutcome::completed(total, total, 0)).await?;
        info!("🔄️ Splynx customer sync run {} finished with {total} records", log.id);
        Ok(log)
    }

    async fn call_clients_synced_hooks(&self, clients: Vec<ClientRecord>) {
        for producer in &self.producers.clients_synced {
            let event = ClientsSyncedEvent::new(clients.clone());
            producer.publish_event(event).await;
        }
    }

    async fn call_source_customers_synced_hooks(&self, customers: Vec<SourceCustomer>) {
        for producer in &self.producers.source_customers_synced {
            let event = SourceCustomersSyncedEvent::new(customers.clone());
            producer.publish_event(event).await;
        }
    }
}

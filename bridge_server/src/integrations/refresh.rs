//! Keeps the ledger's client cache warm after forwarded payments.
use bridge_engine::{
    db_types::{PaymentRecord, PaymentStatus},
    events::{EventHooks, EventProducers},
    traits::{ClientSyncStore, SourceDirectory, TargetCrm},
    ClientSyncApi,
    SqliteDatabase,
};
use log::*;
use mirror_api::MirrorApi;

use crate::integrations::{mirror::mirror_client_from, splynx::SplynxDirectory, uisp::UispCrm};

/// Registers the hook that refreshes a client's cached record after every successful forward, so the cached
/// balance tracks reality between bulk syncs. The refresh runs whether or not a mirror is configured; when
/// one is, the refreshed record is pushed to it as well.
pub fn register_client_refresh_hook(
    hooks: &mut EventHooks,
    db: SqliteDatabase,
    directory: SplynxDirectory,
    crm: UispCrm,
    mirror: Option<MirrorApi>,
) {
    hooks.on_payment_status_changed(move |ev| {
        let db = db.clone();
        let directory = directory.clone();
        let crm = crm.clone();
        let mirror = mirror.clone();
        Box::pin(async move {
            refresh_paid_client(db, directory, crm, mirror.as_ref(), &ev.payment).await;
        })
    });
}

/// Fetches the paid client from UISP again and upserts the fresh copy into the cache. Only successful
/// forwards trigger a refresh; a failed forward leaves the cache alone. Errors are logged and dropped, the
/// next bulk sync covers for a missed refresh.
async fn refresh_paid_client<B, S, T>(db: B, directory: S, crm: T, mirror: Option<&MirrorApi>, payment: &PaymentRecord)
where
    B: ClientSyncStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    if payment.status != PaymentStatus::Success {
        return;
    }
    let client_id = payment.client_id;
    let sync = ClientSyncApi::new(db, directory, crm, EventProducers::default());
    match sync.sync_client(client_id).await {
        Ok(Some(record)) => {
            if let Some(mirror) = mirror {
                if let Err(e) = mirror.upsert_clients(&[mirror_client_from(&record)]).await {
                    warn!("🪞️ Could not mirror the refreshed client {client_id}. {e}");
                }
            }
        },
        Ok(None) => debug!("🔄️ Client {client_id} disappeared from UISP between forward and refresh"),
        Err(e) => debug!("🔄️ Opportunistic refresh of client {client_id} failed. {e}"),
    }
}

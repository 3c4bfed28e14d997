//! Feeds the optional reporting mirror from the engine's events.
//!
//! Every write here is fire-and-forget. The hooks run on the event handler tasks, failures are logged and
//! dropped, and nothing ever propagates back into the payment path. A record that misses the mirror is picked
//! up again by the next bulk sync.
use bridge_engine::{
    db_types::{ClientRecord, PaymentRecord, PaymentStatus},
    events::EventHooks,
};
use chrono::Utc;
use log::*;
use mirror_api::{MirrorApi, MirrorClient, MirrorPayment, MirrorPaymentStatus, MirrorSourceCustomer};

/// Registers the four mirror subscriptions: new payments, status transitions, client sync batches and Splynx
/// customer snapshots.
pub fn register_mirror_hooks(hooks: &mut EventHooks, mirror: MirrorApi) {
    let api = mirror.clone();
    hooks.on_payment_received(move |ev| {
        let api = api.clone();
        Box::pin(async move {
            let payment = mirror_payment_from(&ev.payment);
            if let Err(e) = api.insert_payment(&payment).await {
                warn!("🪞️ Could not mirror payment {}. {e}", payment.transaction_id);
            }
            if let Some(splynx_id) = ev.payment.splynx_customer_id.as_deref().and_then(|s| s.parse::<i64>().ok()) {
                match api.source_customer_by_id(splynx_id).await {
                    Ok(Some(_)) => trace!("🪞️ Splynx customer {splynx_id} is present in the mirror"),
                    Ok(None) => {
                        debug!("🪞️ Splynx customer {splynx_id} is not in the mirror yet. The next snapshot adds them.")
                    },
                    Err(e) => debug!("🪞️ Could not look up Splynx customer {splynx_id} in the mirror. {e}"),
                }
            }
        })
    });
    let api = mirror.clone();
    hooks.on_payment_status_changed(move |ev| {
        let api = api.clone();
        Box::pin(async move {
            let status = mirror_status(ev.payment.status);
            if let Err(e) = api.update_payment_status(&ev.payment.transaction_id, status).await {
                warn!("🪞️ Could not mirror the status change for payment {}. {e}", ev.payment.transaction_id);
            }
        })
    });
    let api = mirror.clone();
    hooks.on_clients_synced(move |ev| {
        let api = api.clone();
        Box::pin(async move {
            let batch = ev.clients.iter().map(mirror_client_from).collect::<Vec<_>>();
            if let Err(e) = api.upsert_clients(&batch).await {
                warn!("🪞️ Could not mirror a batch of {} clients. {e}", batch.len());
            }
        })
    });
    let api = mirror;
    hooks.on_source_customers_synced(move |ev| {
        let api = api.clone();
        Box::pin(async move {
            let synced_at = Utc::now();
            let batch = ev
                .customers
                .iter()
                .map(|c| MirrorSourceCustomer {
                    splynx_id: c.id,
                    login: c.login.clone(),
                    name: c.name.clone(),
                    email: c.email.clone(),
                    status: c.status.clone(),
                    synced_at,
                })
                .collect::<Vec<_>>();
            if let Err(e) = api.upsert_source_customers(&batch).await {
                warn!("🪞️ Could not mirror a batch of {} Splynx customers. {e}", batch.len());
            }
        })
    });
}

fn mirror_payment_from(payment: &PaymentRecord) -> MirrorPayment {
    MirrorPayment {
        transaction_id: payment.transaction_id.clone(),
        splynx_customer_id: payment.splynx_customer_id.clone().unwrap_or_default(),
        uisp_client_id: payment.client_id,
        amount: payment.amount.to_major_units(),
        currency_code: payment.currency_code.clone(),
        status: mirror_status(payment.status),
        note: payment.note.clone(),
        received_at: payment.received_at,
    }
}

fn mirror_status(status: PaymentStatus) -> MirrorPaymentStatus {
    match status {
        PaymentStatus::Pending => MirrorPaymentStatus::Pending,
        PaymentStatus::Success => MirrorPaymentStatus::Success,
        PaymentStatus::Failed => MirrorPaymentStatus::Failed,
    }
}

pub(crate) fn mirror_client_from(client: &ClientRecord) -> MirrorClient {
    MirrorClient {
        uisp_id: client.uisp_id,
        user_ident: client.user_ident.clone(),
        name: client.name.clone(),
        email: client.email.clone(),
        phone: client.phone.clone(),
        account_balance: client.account_balance.to_major_units(),
        account_outstanding: client.account_outstanding.to_major_units(),
        is_active: client.is_active,
        is_suspended: client.is_suspended,
        synced_at: client.synced_at,
    }
}

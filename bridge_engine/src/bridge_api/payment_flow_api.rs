//! `PaymentFlowApi` is the webhook-to-UISP pipeline.
//!
//! One call to [`PaymentFlowApi::process_payment`] takes a normalized intake through resolution, the
//! idempotency gate, forwarding with retries, and the terminal status write. The caller gets the final
//! [`PaymentOutcome`] back; everything else (mirroring, cache refreshes) rides on the event hooks.
use bridge_common::DEFAULT_CURRENCY_CODE;
use chrono::Utc;
use log::*;
use serde_json::Value;

use crate::{
    bridge_api::{
        errors::BridgeError,
        payment_objects::{PaymentIntake, PaymentOutcome},
    },
    db_types::{NewPayment, NewWebhookLog, PaymentRecord, WebhookLogEntry},
    events::{EventProducers, PaymentReceivedEvent, PaymentStatusChangedEvent},
    helpers::{retry_with_policy, synthesized_transaction_id, RetryPolicy},
    resolver::resolve_customer,
    traits::{BridgeStore, LedgerError, PaymentSubmission, SourceDirectory, TargetCrm},
};

pub struct PaymentFlowApi<B, S, T> {
    db: B,
    directory: S,
    crm: T,
    policy: RetryPolicy,
    producers: EventProducers,
}

impl<B, S, T> PaymentFlowApi<B, S, T>
where
    B: BridgeStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    pub fn new(db: B, directory: S, crm: T, policy: RetryPolicy, producers: EventProducers) -> Self {
        Self { db, directory, crm, policy, producers }
    }

    /// Appends an entry to the webhook audit trail. The intake layer calls this before any business logic.
    pub async fn log_webhook(&self, entry: NewWebhookLog) -> Result<WebhookLogEntry, LedgerError> {
        self.db.insert_webhook_log(entry).await
    }

    /// Runs a payment through the whole pipeline.
    ///
    /// 1. Resolve the Splynx customer to a UISP client.
    /// 2. Ledger the payment as `pending`. A duplicate transaction id short-circuits here and replays the
    ///    stored outcome; UISP is not contacted again.
    /// 3. Forward to UISP under the retry policy, with retry attempts persisted on the record as they happen.
    /// 4. Mark the payment `success` (storing the UISP response verbatim) or `failed` (storing the last
    ///    error), and fire the status hooks.
    pub async fn process_payment(&self, intake: PaymentIntake) -> Result<PaymentOutcome, BridgeError> {
        let resolved = resolve_customer(&self.directory, &self.crm, &self.db, &intake.source_customer_id).await?;
        info!(
            "💰️ Splynx customer {} resolved to UISP client {} via {}",
            intake.source_customer_id, resolved.client_id, resolved.strategy
        );
        let transaction_id = match &intake.transaction_id {
            Some(txid) => txid.clone(),
            None => synthesized_transaction_id(resolved.client_id),
        };

        let new_payment = NewPayment {
            transaction_id: transaction_id.clone(),
            client_id: resolved.client_id,
            splynx_customer_id: Some(intake.source_customer_id.clone()),
            amount: intake.amount,
            currency_code: intake.currency_code.clone().unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string()),
            payment_type: intake.payment_type.clone(),
            payment_method: intake.payment_method.clone(),
            note: intake.note.clone(),
            created_at: intake.created_at.unwrap_or_else(Utc::now),
        };
        let payment = match self.db.insert_pending_payment(new_payment).await {
            Ok(payment) => payment,
            Err(LedgerError::DuplicateTransaction(txid)) => {
                let existing = self
                    .db
                    .fetch_payment_by_transaction_id(&txid)
                    .await?
                    .ok_or(LedgerError::PaymentNotFound(txid))?;
                info!(
                    "💰️ Payment {} has already been processed (status: {}). Replaying the stored outcome.",
                    existing.transaction_id, existing.status
                );
                let uisp_payment_id = existing.uisp_response.as_deref().and_then(extract_uisp_payment_id);
                return Ok(PaymentOutcome { payment: existing, replayed: true, uisp_payment_id });
            },
            Err(e) => return Err(e.into()),
        };
        self.call_payment_received_hooks(&payment).await;

        let submission = PaymentSubmission {
            client_id: payment.client_id,
            amount: payment.amount,
            currency_code: payment.currency_code.clone(),
            note: payment.note.clone(),
            method: None,
            provider_payment_id: payment.transaction_id.clone(),
            paid_at: payment.created_at,
        };
        let forward = retry_with_policy(
            &self.policy,
            |attempt| {
                let submission = submission.clone();
                async move {
                    trace!(
                        "💰️ Forward attempt {} of {} for payment {}",
                        attempt + 1,
                        self.policy.total_attempts(),
                        submission.provider_payment_id
                    );
                    self.crm.submit_payment(&submission).await
                }
            },
            |_retry| {
                let txid = transaction_id.clone();
                async move { self.db.record_retry_attempt(&txid).await.map(|_| ()) }
            },
        )
        .await;

        match forward {
            Ok(response) => {
                let payment = self.db.mark_payment_success(&transaction_id, &response).await?;
                if let Err(e) = self.db.touch_last_payment(payment.client_id, Utc::now()).await {
                    warn!("💰️ Could not stamp last payment time for client {}: {e}", payment.client_id);
                }
                self.call_status_changed_hooks(&payment).await;
                let uisp_payment_id = extract_uisp_payment_id(&response);
                info!(
                    "💰️ Payment {} forwarded to UISP client {} (downstream id: {})",
                    payment.transaction_id,
                    payment.client_id,
                    uisp_payment_id.as_deref().unwrap_or("unknown")
                );
                Ok(PaymentOutcome { payment, replayed: false, uisp_payment_id })
            },
            Err(e) => {
                let message = e.to_string();
                error!(
                    "💰️ Payment {transaction_id} could not be delivered after {} attempts. {message}",
                    self.policy.total_attempts()
                );
                let payment = self.db.mark_payment_failed(&transaction_id, &message).await?;
                self.call_status_changed_hooks(&payment).await;
                Err(BridgeError::ForwardingFailed { transaction_id, message })
            },
        }
    }

    async fn call_payment_received_hooks(&self, payment: &PaymentRecord) {
        for producer in &self.producers.payment_received {
            let event = PaymentReceivedEvent::new(payment.clone());
            producer.publish_event(event).await;
        }
    }

    async fn call_status_changed_hooks(&self, payment: &PaymentRecord) {
        for producer in &self.producers.payment_status_changed {
            let event = PaymentStatusChangedEvent::new(payment.clone());
            producer.publish_event(event).await;
        }
    }
}

/// Picks the record id out of a stored UISP response body, tolerating both numeric and string ids.
fn extract_uisp_payment_id(raw: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(raw).ok()?;
    match value.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

//! Splynx payment webhook intake.
//!
//! Splynx delivers the same logical payment in one of three shapes, depending on the installation's version
//! and hook configuration:
//!
//! 1. An envelope: `{"data": {"customer_id": ..., "attributes": {<payment fields>}}}`
//! 2. A flat object under `data`: `{"data": {<payment fields>}}`
//! 3. The payment fields at the top level of the body.
//!
//! The intake normalizes all three into one field map before anything else looks at the payload. Every call is
//! appended to the webhook audit log first, whatever its fate: ping, rejection or ledgered payment.
use std::fmt::{Display, Formatter};

use actix_web::{web, HttpRequest, HttpResponse};
use bridge_common::{helpers::ellipsize, Money};
use bridge_engine::{
    db_types::NewWebhookLog,
    traits::{BridgeStore, SourceDirectory, TargetCrm},
    PaymentFlowApi,
    PaymentIntake,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::*;
use serde_json::{Map, Value};

use crate::{
    config::{ServerOptions, WebhookConfig},
    data_objects::PaymentAck,
    errors::ServerError,
    helpers::{get_remote_ip, render_headers, verify_webhook_signature},
    route,
};

route!(payment_webhook => Post "/webhook/payment" impl BridgeStore, SourceDirectory, TargetCrm);
/// The payment notification endpoint.
///
/// Returns 200 for ledgered payments, idempotent replays and pings, 400 when the payload cannot identify a
/// customer or an amount, 401 when signature enforcement is on and the call is unsigned or mis-signed, 404
/// when the customer cannot be resolved to a UISP client, and 500 when forwarding exhausted its retry budget.
pub async fn payment_webhook<B, S, T>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<PaymentFlowApi<B, S, T>>,
    options: web::Data<ServerOptions>,
    webhook: web::Data<WebhookConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: BridgeStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    trace!("📨️ Received payment webhook ({} bytes)", body.len());
    let verdict = webhook.secret.as_ref().and_then(|s| verify_webhook_signature(&req, &body, s.reveal()));
    // The audit entry is written before any business logic, so even rejected calls leave a trace.
    let mut entry = NewWebhookLog::new(String::from_utf8_lossy(&body).to_string())
        .with_headers(render_headers(&req))
        .with_signature_verdict(verdict);
    if let Some(ip) = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded) {
        entry = entry.with_source_ip(ip.to_string());
    }
    if let Err(e) = api.log_webhook(entry).await {
        warn!("📨️ Could not append to the webhook audit log. {e}");
    }

    if webhook.secret.is_some() && webhook.enforce_signatures && verdict != Some(true) {
        warn!("📨️ Rejecting webhook with a missing or invalid signature");
        return Err(ServerError::InvalidSignature);
    }
    if verdict == Some(false) {
        warn!("📨️ Webhook signature check failed, but enforcement is off. Processing anyway.");
    }

    if body.is_empty() {
        debug!("📨️ Empty webhook body. Acknowledging as a ping.");
        return Ok(HttpResponse::Ok().json(PaymentAck::ping()));
    }
    let payload = serde_json::from_slice::<Value>(&body).map_err(|e| {
        debug!("📨️ Webhook body is not valid JSON: {}. {e}", ellipsize(&String::from_utf8_lossy(&body), 120));
        ServerError::CouldNotDeserializePayload
    })?;
    let (shape, fields) = normalize_payload(&payload);
    trace!("📨️ Payload normalized from the {shape} shape ({} fields)", fields.len());
    if is_ping(&fields) {
        info!("📨️ Test ping acknowledged");
        return Ok(HttpResponse::Ok().json(PaymentAck::ping()));
    }
    let intake = intake_from_fields(&fields)?;
    let outcome = api.process_payment(intake).await?;
    Ok(HttpResponse::Ok().json(PaymentAck::processed(&outcome)))
}

/// The three delivery shapes, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    Envelope,
    Flat,
    Bare,
}

impl Display for PayloadShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadShape::Envelope => write!(f, "envelope"),
            PayloadShape::Flat => write!(f, "flat"),
            PayloadShape::Bare => write!(f, "bare"),
        }
    }
}

/// Flattens any of the three delivery shapes into a single field map. In the envelope shape the customer id
/// lives next to `attributes` rather than inside it, so it is folded into the map here.
fn normalize_payload(payload: &Value) -> (PayloadShape, Map<String, Value>) {
    if let Some(data) = payload.get("data").and_then(Value::as_object) {
        if let Some(attributes) = data.get("attributes").and_then(Value::as_object) {
            let mut fields = attributes.clone();
            for key in ["customer_id", "customerId"] {
                if let Some(id) = data.get(key) {
                    fields.entry(key.to_string()).or_insert_with(|| id.clone());
                }
            }
            return (PayloadShape::Envelope, fields);
        }
        return (PayloadShape::Flat, data.clone());
    }
    let fields = payload.as_object().cloned().unwrap_or_default();
    (PayloadShape::Bare, fields)
}

/// A ping carries no payment. Splynx sends `{}` when an admin tests the hook from the UI, and some
/// installations send a single status field. Anything with fewer than two fields and no amount qualifies.
fn is_ping(fields: &Map<String, Value>) -> bool {
    fields.is_empty() || (fields.len() < 2 && !fields.contains_key("amount"))
}

fn intake_from_fields(fields: &Map<String, Value>) -> Result<PaymentIntake, ServerError> {
    let mut missing = Vec::new();
    let customer_id = string_field(fields, &["customer_id", "customerId"]);
    if customer_id.is_none() {
        missing.push("customer_id".to_string());
    }
    let amount = fields.get("amount").and_then(|v| {
        Money::try_from_json(v)
            .map_err(|e| debug!("📨️ Could not read the payment amount. {e}"))
            .ok()
    });
    if amount.is_none() {
        missing.push("amount".to_string());
    }
    let (Some(customer_id), Some(amount)) = (customer_id, amount) else {
        debug!("📨️ Webhook payload is not processable. Missing: {}", missing.join(", "));
        return Err(ServerError::MissingFields(missing));
    };
    let mut intake = PaymentIntake::new(customer_id, amount);
    if let Some(txid) = string_field(fields, &["transaction_id", "transactionId"]) {
        intake = intake.with_transaction_id(txid);
    }
    if let Some(currency) = string_field(fields, &["currency_code", "currency"]) {
        intake = intake.with_currency(currency);
    }
    if let Some(payment_type) = string_field(fields, &["payment_type", "type"]) {
        intake = intake.with_payment_type(payment_type);
    }
    if let Some(method) = string_field(fields, &["payment_method", "paymentMethod"]) {
        intake = intake.with_payment_method(method);
    }
    if let Some(note) = string_field(fields, &["comment", "note"]) {
        intake = intake.with_note(note);
    }
    if let Some(created_at) = date_field(fields, &["created_at", "date"]) {
        intake = intake.with_created_at(created_at);
    }
    Ok(intake)
}

/// Reads the first of `keys` that holds a usable value. Numbers are rendered to strings, since Splynx sends
/// numeric customer ids in some shapes and string ids in others.
fn string_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|k| fields.get(*k)).find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn date_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    string_field(fields, keys).and_then(|raw| parse_timestamp(&raw))
}

/// Splynx sends RFC3339 in the envelope shape and a plain `YYYY-MM-DD HH:MM:SS` wall-clock string in the
/// older shapes. The latter carries no offset and is taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok().map(|ndt| ndt.and_utc())
}

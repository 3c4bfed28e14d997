use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bridge_common::{Money, Secret};
use bridge_engine::{
    db_types::PaymentStatus,
    events::EventProducers,
    helpers::RetryPolicy,
    traits::{CollaboratorError, LedgerError},
    PaymentFlowApi,
};

use super::helpers::{post_request, sign};
use crate::{
    config::{ServerOptions, WebhookConfig},
    endpoint_tests::mocks::{
        crm_client, customer_mapping, payment_record, stored_payment, webhook_log_entry, MockBridgeStore, MockCrm,
        MockDirectory,
    },
    webhook::PaymentWebhookRoute,
};

const WEBHOOK_PATH: &str = "/webhook/payment";

#[actix_web::test]
async fn pings_are_acknowledged_without_touching_the_ledger() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), open_config());
    let (status, body) = post_request(WEBHOOK_PATH, "{}", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Webhook received"));
}

#[actix_web::test]
async fn an_empty_body_is_a_ping() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), open_config());
    let (status, body) = post_request(WEBHOOK_PATH, "", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Webhook received"));
}

#[actix_web::test]
async fn a_lone_customer_id_is_a_ping() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), open_config());
    let (status, body) = post_request(WEBHOOK_PATH, r#"{"customer_id": 42}"#, &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Webhook received"));
}

#[actix_web::test]
async fn payloads_without_a_customer_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), open_config());
    let body = r#"{"amount": 120.5, "comment": "eft deposit"}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Required fields are missing"));
    assert!(body.contains("customer_id"));
}

#[actix_web::test]
async fn payloads_without_an_amount_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), open_config());
    let body = r#"{"customer_id": 42, "comment": "eft deposit"}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Required fields are missing"));
    assert!(body.contains("amount"));
}

#[actix_web::test]
async fn unsigned_webhooks_are_rejected_when_enforcement_is_on() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    // No candidate header at all, so no verdict could be reached. The audit entry still lands.
    store
        .expect_insert_webhook_log()
        .withf(|entry| entry.signature_valid.is_none())
        .times(1)
        .returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), signed_config("hushhush", true));
    let body = r#"{"customer_id": 42, "amount": 100}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature"));
}

#[actix_web::test]
async fn missigned_webhooks_are_rejected_when_enforcement_is_on() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store
        .expect_insert_webhook_log()
        .withf(|entry| entry.signature_valid == Some(false))
        .times(1)
        .returning(|entry| Ok(webhook_log_entry(entry)));
    let configure = configure_app(store, MockDirectory::new(), MockCrm::new(), signed_config("hushhush", true));
    let body = r#"{"customer_id": 42, "amount": 100}"#;
    let headers = [("x-splynx-signature", "deadbeef")];
    let (status, body) = post_request(WEBHOOK_PATH, body, &headers, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature"));
}

#[actix_web::test]
async fn a_bad_signature_is_audited_but_processed_when_enforcement_is_off() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store
        .expect_insert_webhook_log()
        .withf(|entry| entry.signature_valid == Some(false))
        .times(1)
        .returning(|entry| Ok(webhook_log_entry(entry)));
    // Splynx does not know this customer and the id is not a walk-in ident, so only the stored mapping
    // resolves it. Strategy 3 must not write the mapping back.
    store.expect_fetch_mapping().withf(|id| id == "9942").times(1).returning(|id| Ok(Some(customer_mapping(id, 55))));
    store
        .expect_insert_pending_payment()
        .withf(|p| {
            p.transaction_id.starts_with("SPLYNX-")
                && p.transaction_id.ends_with("-55")
                && p.client_id == 55
                && p.amount == Money::from_major_units(75)
        })
        .times(1)
        .returning(|p| Ok(payment_record(&p, PaymentStatus::Pending)));
    store.expect_mark_payment_success().times(1).returning(|txid, response| {
        let mut payment = stored_payment(txid, 55, Money::from_major_units(75), PaymentStatus::Success);
        payment.uisp_response = Some(response.to_string());
        Ok(payment)
    });
    store.expect_touch_last_payment().withf(|client_id, _at| *client_id == 55).times(1).returning(|_, _| Ok(()));
    let mut directory = MockDirectory::new();
    directory.expect_customer_login().withf(|id| id == "9942").times(1).returning(|_| Ok(None));
    let mut crm = MockCrm::new();
    crm.expect_submit_payment().times(1).returning(|_| Ok(r#"{"id": "pay-9"}"#.to_string()));
    let configure = configure_app(store, directory, crm, signed_config("hushhush", false));
    let body = r#"{"data": {"customer_id": "9942", "amount": 75}}"#;
    let headers = [("x-splynx-signature", "deadbeef")];
    let (status, body) = post_request(WEBHOOK_PATH, body, &headers, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Payment processed."));
    assert!(body.contains("pay-9"));
}

#[actix_web::test]
async fn a_correctly_signed_envelope_payment_is_forwarded() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store
        .expect_insert_webhook_log()
        .withf(|entry| entry.signature_valid == Some(true))
        .times(1)
        .returning(|entry| Ok(webhook_log_entry(entry)));
    store
        .expect_upsert_mapping()
        .withf(|m| m.splynx_customer_id == "12345" && m.uisp_client_id == 88)
        .times(1)
        .returning(|m| Ok(customer_mapping(&m.splynx_customer_id, m.uisp_client_id)));
    store
        .expect_insert_pending_payment()
        .withf(|p| {
            p.transaction_id == "TX-1001"
                && p.client_id == 88
                && p.splynx_customer_id.as_deref() == Some("12345")
                && p.amount == Money::from_major_units(150)
        })
        .times(1)
        .returning(|p| Ok(payment_record(&p, PaymentStatus::Pending)));
    store
        .expect_mark_payment_success()
        .withf(|txid, response| txid == "TX-1001" && response.contains("456"))
        .times(1)
        .returning(|txid, response| {
            let mut payment = stored_payment(txid, 88, Money::from_major_units(150), PaymentStatus::Success);
            payment.uisp_response = Some(response.to_string());
            Ok(payment)
        });
    store.expect_touch_last_payment().withf(|client_id, _at| *client_id == 88).times(1).returning(|_, _| Ok(()));
    let mut directory = MockDirectory::new();
    directory.expect_customer_login().withf(|id| id == "12345").times(1).returning(|_| Ok(Some("jdoe".to_string())));
    let mut crm = MockCrm::new();
    crm.expect_find_client_by_external_id()
        .withf(|ident| ident == "jdoe")
        .times(1)
        .returning(|ident| Ok(Some(crm_client(88, ident))));
    crm.expect_submit_payment()
        .withf(|s| s.client_id == 88 && s.provider_payment_id == "TX-1001" && s.amount == Money::from_major_units(150))
        .times(1)
        .returning(|_| Ok(r#"{"id": 456}"#.to_string()));
    let configure = configure_app(store, directory, crm, signed_config("hushhush", true));
    let body = r#"{"data": {"customer_id": 12345, "attributes": {"amount": 150.0, "transaction_id": "TX-1001"}}}"#;
    let signature = sign("hushhush", body);
    let headers = [("x-splynx-signature", signature.as_str())];
    let (status, body) = post_request(WEBHOOK_PATH, body, &headers, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Payment processed."));
    assert!(body.contains("TX-1001"));
    assert!(body.contains("456"));
}

#[actix_web::test]
async fn duplicate_transactions_replay_the_stored_outcome() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    store.expect_upsert_mapping().times(1).returning(|m| Ok(customer_mapping(&m.splynx_customer_id, m.uisp_client_id)));
    store
        .expect_insert_pending_payment()
        .times(1)
        .returning(|_| Err(LedgerError::DuplicateTransaction("TX-DUP".to_string())));
    store.expect_fetch_payment_by_transaction_id().withf(|txid| txid == "TX-DUP").times(1).returning(|txid| {
        let mut payment = stored_payment(txid, 88, Money::from_major_units(150), PaymentStatus::Success);
        payment.uisp_response = Some(r#"{"id": 777}"#.to_string());
        Ok(Some(payment))
    });
    let mut directory = MockDirectory::new();
    directory.expect_customer_login().times(1).returning(|_| Ok(Some("jdoe".to_string())));
    let mut crm = MockCrm::new();
    crm.expect_find_client_by_external_id().times(1).returning(|ident| Ok(Some(crm_client(88, ident))));
    // No submit_payment expectation: the replay must not contact UISP again.
    let configure = configure_app(store, directory, crm, open_config());
    let body = r#"{"customer_id": 12345, "amount": 150, "transaction_id": "TX-DUP"}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Payment already processed."));
    assert!(body.contains("777"));
}

#[actix_web::test]
async fn unresolvable_customers_get_a_404() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    store.expect_fetch_mapping().withf(|id| id == "31415").times(1).returning(|_| Ok(None));
    let mut directory = MockDirectory::new();
    directory.expect_customer_login().times(1).returning(|_| Ok(Some("ghost".to_string())));
    let mut crm = MockCrm::new();
    crm.expect_find_client_by_external_id().withf(|ident| ident == "ghost").times(1).returning(|_| Ok(None));
    let configure = configure_app(store, directory, crm, open_config());
    let body = r#"{"customer_id": 31415, "amount": 80}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("31415"));
    assert!(body.contains("ghost"));
}

#[actix_web::test]
async fn forwarding_failures_report_the_transaction_id() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_insert_webhook_log().times(1).returning(|entry| Ok(webhook_log_entry(entry)));
    store.expect_upsert_mapping().times(1).returning(|m| Ok(customer_mapping(&m.splynx_customer_id, m.uisp_client_id)));
    store
        .expect_insert_pending_payment()
        .withf(|p| p.transaction_id == "TX-FAIL" && p.client_id == 321)
        .times(1)
        .returning(|p| Ok(payment_record(&p, PaymentStatus::Pending)));
    store
        .expect_mark_payment_failed()
        .withf(|txid, message| txid == "TX-FAIL" && message.contains("502"))
        .times(1)
        .returning(|txid, message| {
            let mut payment = stored_payment(txid, 321, Money::from_major_units(500), PaymentStatus::Failed);
            payment.error_message = Some(message.to_string());
            Ok(payment)
        });
    let mut directory = MockDirectory::new();
    directory.expect_customer_login().withf(|id| id == "W2123").times(1).returning(|_| Ok(None));
    let mut crm = MockCrm::new();
    // The walk-in ident hits UISP directly once the directory comes up empty.
    crm.expect_find_client_by_external_id()
        .withf(|ident| ident == "W2123")
        .times(1)
        .returning(|ident| Ok(Some(crm_client(321, ident))));
    crm.expect_submit_payment()
        .times(1)
        .returning(|_| Err(CollaboratorError::RemoteResponse { status: 502, message: "bad gateway".to_string() }));
    let configure = configure_app(store, directory, crm, open_config());
    let body = r#"{"customer_id": "W2123", "amount": 500, "transaction_id": "TX-FAIL"}"#;
    let (status, body) = post_request(WEBHOOK_PATH, body, &[], configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("transactionId"));
    assert!(body.contains("TX-FAIL"));
    assert!(body.contains("bad gateway"));
}

fn configure_app(
    store: MockBridgeStore,
    directory: MockDirectory,
    crm: MockCrm,
    webhook: WebhookConfig,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentFlowApi::new(store, directory, crm, RetryPolicy::no_retries(), EventProducers::default());
        cfg.service(PaymentWebhookRoute::<MockBridgeStore, MockDirectory, MockCrm>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(ServerOptions { use_x_forwarded_for: false, use_forwarded: false }))
            .app_data(web::Data::new(webhook));
    }
}

fn open_config() -> WebhookConfig {
    WebhookConfig { secret: None, enforce_signatures: true }
}

fn signed_config(secret: &str, enforce_signatures: bool) -> WebhookConfig {
    WebhookConfig { secret: Some(Secret::new(secret.to_string())), enforce_signatures }
}

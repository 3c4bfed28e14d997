use bridge_common::Money;
use bridge_engine::{
    db_types::{
        ClientRecord, ClientUpsert, CustomerMapping, NewCustomerMapping, NewPayment, NewWebhookLog, PaymentRecord,
        PaymentStatus, SyncLog, SyncStatus, WebhookLogEntry,
    },
    traits::{
        ClientSyncStore, CollaboratorError, CrmClient, LedgerError, MappingStore, PaymentLedger, PaymentSubmission,
        SourceCustomer, SourceDirectory, SyncOutcome, TargetCrm,
    },
};
use chrono::{DateTime, Utc};
use mockall::mock;
use serde_json::json;

mock! {
    pub BridgeStore {}
    impl PaymentLedger for BridgeStore {
        fn url(&self) -> &str;
        async fn insert_pending_payment(&self, payment: NewPayment) -> Result<PaymentRecord, LedgerError>;
        async fn fetch_payment_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>, LedgerError>;
        async fn mark_payment_success(&self, transaction_id: &str, uisp_response: &str) -> Result<PaymentRecord, LedgerError>;
        async fn mark_payment_failed(&self, transaction_id: &str, error_message: &str) -> Result<PaymentRecord, LedgerError>;
        async fn record_retry_attempt(&self, transaction_id: &str) -> Result<PaymentRecord, LedgerError>;
        async fn insert_webhook_log(&self, entry: NewWebhookLog) -> Result<WebhookLogEntry, LedgerError>;
    }
    impl MappingStore for BridgeStore {
        async fn fetch_mapping(&self, splynx_customer_id: &str) -> Result<Option<CustomerMapping>, LedgerError>;
        async fn upsert_mapping(&self, mapping: NewCustomerMapping) -> Result<CustomerMapping, LedgerError>;
    }
    impl ClientSyncStore for BridgeStore {
        async fn upsert_client(&self, client: ClientUpsert) -> Result<ClientRecord, LedgerError>;
        async fn fetch_client_by_uisp_id(&self, uisp_id: i64) -> Result<Option<ClientRecord>, LedgerError>;
        async fn touch_last_payment(&self, uisp_id: i64, at: DateTime<Utc>) -> Result<(), LedgerError>;
        async fn create_sync_log(&self, sync_type: &str) -> Result<SyncLog, LedgerError>;
        async fn finalize_sync_log(&self, id: i64, outcome: SyncOutcome) -> Result<SyncLog, LedgerError>;
        async fn fetch_sync_log(&self, id: i64) -> Result<Option<SyncLog>, LedgerError>;
    }
}

mock! {
    pub Directory {}
    impl SourceDirectory for Directory {
        async fn customer_login(&self, customer_id: &str) -> Result<Option<String>, CollaboratorError>;
        async fn fetch_customers(&self, limit: u32) -> Result<Vec<SourceCustomer>, CollaboratorError>;
    }
}

mock! {
    pub Crm {}
    impl TargetCrm for Crm {
        async fn find_client_by_external_id(&self, external_id: &str) -> Result<Option<CrmClient>, CollaboratorError>;
        async fn fetch_client(&self, client_id: i64) -> Result<Option<CrmClient>, CollaboratorError>;
        async fn fetch_clients_page(&self, limit: u32, offset: u32) -> Result<Vec<CrmClient>, CollaboratorError>;
        async fn submit_payment(&self, payment: &PaymentSubmission) -> Result<String, CollaboratorError>;
    }
}

// Fixture builders for wiring mock return values. They echo the input back the way the real store would,
// with stand-ins for the generated columns.

pub fn webhook_log_entry(entry: NewWebhookLog) -> WebhookLogEntry {
    WebhookLogEntry {
        id: 1,
        payload: entry.payload,
        headers: entry.headers,
        source_ip: entry.source_ip,
        signature_valid: entry.signature_valid,
        received_at: Utc::now(),
    }
}

pub fn payment_record(payment: &NewPayment, status: PaymentStatus) -> PaymentRecord {
    let now = Utc::now();
    PaymentRecord {
        id: 1,
        transaction_id: payment.transaction_id.clone(),
        client_id: payment.client_id,
        splynx_customer_id: payment.splynx_customer_id.clone(),
        amount: payment.amount,
        currency_code: payment.currency_code.clone(),
        payment_type: payment.payment_type.clone(),
        payment_method: payment.payment_method.clone(),
        note: payment.note.clone(),
        status,
        uisp_response: None,
        error_message: None,
        retry_count: 0,
        last_retry_at: None,
        created_at: payment.created_at,
        received_at: now,
        updated_at: now,
    }
}

/// A stored payment for the mocks that only see a transaction id, like `mark_payment_success`.
pub fn stored_payment(transaction_id: &str, client_id: i64, amount: Money, status: PaymentStatus) -> PaymentRecord {
    let now = Utc::now();
    PaymentRecord {
        id: 1,
        transaction_id: transaction_id.to_string(),
        client_id,
        splynx_customer_id: None,
        amount,
        currency_code: "ZAR".to_string(),
        payment_type: None,
        payment_method: None,
        note: None,
        status,
        uisp_response: None,
        error_message: None,
        retry_count: 0,
        last_retry_at: None,
        created_at: now,
        received_at: now,
        updated_at: now,
    }
}

pub fn customer_mapping(splynx_customer_id: &str, uisp_client_id: i64) -> CustomerMapping {
    let now = Utc::now();
    CustomerMapping {
        id: 1,
        splynx_customer_id: splynx_customer_id.to_string(),
        uisp_client_id,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn crm_client(id: i64, user_ident: &str) -> CrmClient {
    CrmClient {
        id,
        user_ident: Some(user_ident.to_string()),
        name: Some(format!("Client {id}")),
        email: Some(format!("client{id}@example.com")),
        phone: None,
        account_balance: Money::from_major_units(0),
        account_outstanding: Money::from_major_units(0),
        is_active: true,
        is_suspended: false,
        raw: json!({ "id": id, "userIdent": user_ident }),
    }
}

pub fn client_record(client: &ClientUpsert) -> ClientRecord {
    ClientRecord {
        id: client.uisp_id,
        uisp_id: client.uisp_id,
        user_ident: client.user_ident.clone(),
        name: client.name.clone(),
        email: client.email.clone(),
        phone: client.phone.clone(),
        account_balance: client.account_balance,
        account_outstanding: client.account_outstanding,
        is_active: client.is_active,
        is_suspended: client.is_suspended,
        raw: client.raw.clone(),
        synced_at: Utc::now(),
        last_payment_at: None,
    }
}

pub fn sync_log(id: i64, sync_type: &str) -> SyncLog {
    SyncLog {
        id,
        sync_type: sync_type.to_string(),
        status: SyncStatus::InProgress,
        total_records: 0,
        synced_records: 0,
        failed_records: 0,
        error_summary: None,
        started_at: Utc::now(),
        finished_at: None,
    }
}

pub fn finalized_sync_log(id: i64, sync_type: &str, outcome: &SyncOutcome) -> SyncLog {
    SyncLog {
        id,
        sync_type: sync_type.to_string(),
        status: outcome.status,
        total_records: outcome.total_records,
        synced_records: outcome.synced_records,
        failed_records: outcome.failed_records,
        error_summary: outcome.error_summary.clone(),
        started_at: Utc::now(),
        finished_at: Some(Utc::now()),
    }
}

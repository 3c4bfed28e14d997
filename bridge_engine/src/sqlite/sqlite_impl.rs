//! `SqliteDatabase` is the concrete ledger store backing the bridge.
//!
//! It implements all three storage traits defined in the [`crate::traits`] module on top of a single
//! connection pool.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{clients, mappings, new_pool, payments, sync_logs, webhook_log};
use crate::{
    db_types::{
        ClientRecord,
        ClientUpsert,
        CustomerMapping,
        NewCustomerMapping,
        NewPayment,
        NewWebhookLog,
        PaymentRecord,
        SyncLog,
        WebhookLogEntry,
    },
    traits::{ClientSyncStore, LedgerError, MappingStore, PaymentLedger, SyncOutcome},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Called once at startup, and by the test harness against fresh databases.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl PaymentLedger for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_pending_payment(&self, payment: NewPayment) -> Result<PaymentRecord, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let record = payments::insert_payment(payment, &mut conn).await?;
        debug!("🗃️ Payment [{}] inserted with id {}", record.transaction_id, record.id);
        Ok(record)
    }

    async fn fetch_payment_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment(transaction_id, &mut conn).await
    }

    async fn mark_payment_success(
        &self,
        transaction_id: &str,
        uisp_response: &str,
    ) -> Result<PaymentRecord, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::mark_success(transaction_id, uisp_response, &mut conn).await
    }

    async fn mark_payment_failed(
        &self,
        transaction_id: &str,
        error_message: &str,
    ) -> Result<PaymentRecord, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::mark_failed(transaction_id, error_message, &mut conn).await
    }

    async fn record_retry_attempt(&self, transaction_id: &str) -> Result<PaymentRecord, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payments::record_retry_attempt(transaction_id, &mut conn).await
    }

    async fn insert_webhook_log(&self, entry: NewWebhookLog) -> Result<WebhookLogEntry, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        webhook_log::insert_webhook_log(entry, &mut conn).await
    }
}

impl MappingStore for SqliteDatabase {
    async fn fetch_mapping(&self, splynx_customer_id: &str) -> Result<Option<CustomerMapping>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        mappings::fetch_mapping(splynx_customer_id, &mut conn).await
    }

    async fn upsert_mapping(&self, mapping: NewCustomerMapping) -> Result<CustomerMapping, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let record = mappings::upsert_mapping(mapping, &mut conn).await?;
        debug!("🗃️ Mapping [{} -> {}] stored", record.splynx_customer_id, record.uisp_client_id);
        Ok(record)
    }
}

impl ClientSyncStore for SqliteDatabase {
    async fn upsert_client(&self, client: ClientUpsert) -> Result<ClientRecord, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let record = clients::upsert_client(client, &mut conn).await?;
        trace!("🗃️ Client [{}] cached with id {}", record.uisp_id, record.id);
        Ok(record)
    }

    async fn fetch_client_by_uisp_id(&self, uisp_id: i64) -> Result<Option<ClientRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        clients::fetch_client_by_uisp_id(uisp_id, &mut conn).await
    }

    async fn touch_last_payment(&self, uisp_id: i64, at: DateTime<Utc>) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        clients::touch_last_payment(uisp_id, at, &mut conn).await
    }

    async fn create_sync_log(&self, sync_type: &str) -> Result<SyncLog, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        sync_logs::create_sync_log(sync_type, &mut conn).await
    }

    async fn finalize_sync_log(&self, id: i64, outcome: SyncOutcome) -> Result<SyncLog, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        sync_logs::finalize_sync_log(id, outcome, &mut conn).await
    }

    async fn fetch_sync_log(&self, id: i64) -> Result<Option<SyncLog>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        sync_logs::fetch_sync_log(id, &mut conn).await
    }
}

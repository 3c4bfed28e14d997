use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Response,
};
use serde_json::Value;

use crate::{
    config::MirrorConfig,
    data_objects::{MirrorClient, MirrorPayment, MirrorPaymentStatus, MirrorSourceCustomer},
    MirrorApiError,
};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Client for the PostgREST-style reporting mirror.
///
/// All writes ask the store for `return=minimal`. Upserts use `resolution=merge-duplicates` against the
/// table's natural key so a repeated sync overwrites rather than duplicates.
#[derive(Clone)]
pub struct MirrorApi {
    config: MirrorConfig,
    client: Arc<Client>,
}

impl MirrorApi {
    pub fn new(config: MirrorConfig) -> Result<Self, MirrorApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let key = HeaderValue::from_str(config.service_key.reveal().as_str())
            .map_err(|e| MirrorApiError::Initialization(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key.reveal()))
            .map_err(|e| MirrorApiError::Initialization(e.to_string()))?;
        headers.insert("apikey", key);
        headers.insert("Authorization", bearer);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MirrorApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn check(&self, response: Response) -> Result<(), MirrorApiError> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let message = response.text().await.map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        Err(MirrorApiError::QueryError { status, message })
    }

    pub async fn insert_payment(&self, payment: &MirrorPayment) -> Result<(), MirrorApiError> {
        trace!("Mirroring payment {}", payment.transaction_id);
        let response = self
            .client
            .post(self.url("/payments"))
            .header("Prefer", "return=minimal")
            .json(payment)
            .send()
            .await
            .map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        self.check(response).await
    }

    pub async fn update_payment_status(
        &self,
        transaction_id: &str,
        status: MirrorPaymentStatus,
    ) -> Result<(), MirrorApiError> {
        trace!("Mirroring status change for payment {transaction_id}");
        let body = serde_json::json!({ "status": status });
        let response = self
            .client
            .patch(self.url("/payments"))
            .query(&[("transaction_id", format!("eq.{transaction_id}"))])
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        self.check(response).await
    }

    pub async fn upsert_clients(&self, clients: &[MirrorClient]) -> Result<(), MirrorApiError> {
        if clients.is_empty() {
            return Ok(());
        }
        trace!("Mirroring {} client records", clients.len());
        let response = self
            .client
            .post(self.url("/clients"))
            .query(&[("on_conflict", "uisp_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(clients)
            .send()
            .await
            .map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        self.check(response).await
    }

    pub async fn upsert_source_customers(&self, customers: &[MirrorSourceCustomer]) -> Result<(), MirrorApiError> {
        if customers.is_empty() {
            return Ok(());
        }
        trace!("Mirroring {} source customer records", customers.len());
        let response = self
            .client
            .post(self.url("/splynx_customers"))
            .query(&[("on_conflict", "splynx_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(customers)
            .send()
            .await
            .map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        self.check(response).await
    }

    /// Look up a mirrored source customer by its billing-system id.
    pub async fn source_customer_by_id(&self, splynx_id: i64) -> Result<Option<Value>, MirrorApiError> {
        let response = self
            .client
            .get(self.url("/splynx_customers"))
            .query(&[("splynx_id", format!("eq.{splynx_id}")), ("limit", "1".to_string())])
            .send()
            .await
            .map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MirrorApiError::RestResponseError(e.to_string()))?;
            return Err(MirrorApiError::QueryError { status, message });
        }
        let mut rows = response.json::<Vec<Value>>().await.map_err(|e| MirrorApiError::JsonError(e.to_string()))?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }
}

use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{config::UispConfig, data_objects::NewUispPayment, UispApiError, UispClient};

const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Upper bound on the single-fetch scan used when searching the client collection by external identifier.
const IDENT_SCAN_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct UispApi {
    config: UispConfig,
    client: Arc<Client>,
}

impl UispApi {
    pub fn new(config: UispConfig) -> Result<Self, UispApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.app_key.reveal().as_str())
            .map_err(|e| UispApiError::Initialization(e.to_string()))?;
        headers.insert("X-Auth-App-Key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| UispApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, UispApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| UispApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| UispApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| UispApiError::RestResponseError(e.to_string()))?;
            Err(UispApiError::QueryError { status, message })
        }
    }

    /// Fetch a single client record. Returns `None` when the id is unknown to UISP.
    pub async fn get_client(&self, client_id: i64) -> Result<Option<UispClient>, UispApiError> {
        let path = format!("/clients/{client_id}");
        debug!("Fetching UISP client {client_id}");
        match self.rest_query::<Value, ()>(Method::GET, &path, &[], None).await {
            Ok(value) => Ok(Some(UispClient::from_value(value)?)),
            Err(UispApiError::QueryError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// One page of the client collection.
    pub async fn fetch_clients_page(&self, limit: u32, offset: u32) -> Result<Vec<UispClient>, UispApiError> {
        let limit = limit.to_string();
        let offset = offset.to_string();
        let params = [("limit", limit.as_str()), ("offset", offset.as_str())];
        let values = self.rest_query::<Vec<Value>, ()>(Method::GET, "/clients", &params, None).await?;
        debug!("Fetched {} UISP clients (limit {limit}, offset {offset})", values.len());
        values.into_iter().map(UispClient::from_value).collect()
    }

    /// Search the client collection for the entry whose `userIdent` equals the given external identifier.
    ///
    /// UISP has no server-side filter for this field, so this is a bounded single-fetch scan filtered client-side.
    /// Callers must tolerate the cost.
    pub async fn find_client_by_user_ident(&self, ident: &str) -> Result<Option<UispClient>, UispApiError> {
        let clients = self.fetch_clients_page(IDENT_SCAN_LIMIT, 0).await?;
        let hit = clients.into_iter().find(|c| c.user_ident.as_deref() == Some(ident));
        match &hit {
            Some(c) => debug!("UISP client {} matches userIdent {ident}", c.id),
            None => debug!("No UISP client matches userIdent {ident}"),
        }
        Ok(hit)
    }

    /// Submit a payment. Returns the raw response body so callers can persist the downstream record verbatim.
    pub async fn create_payment(&self, payment: &NewUispPayment) -> Result<String, UispApiError> {
        let url = self.url("/payments");
        debug!("Submitting payment of {} to UISP client {}", payment.amount, payment.client_id);
        let response =
            self.client.post(url).json(payment).send().await.map_err(|e| UispApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| UispApiError::RestResponseError(e.to_string()))?;
        if status.is_success() {
            info!("UISP payment created for client {}", payment.client_id);
            Ok(body)
        } else {
            Err(UispApiError::QueryError { status: status.as_u16(), message: body })
        }
    }
}

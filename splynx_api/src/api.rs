use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::{config::SplynxConfig, data_objects::SplynxCustomer, SplynxApiError};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct SplynxApi {
    config: SplynxConfig,
    client: Arc<Client>,
}

impl SplynxApi {
    pub fn new(config: SplynxConfig) -> Result<Self, SplynxApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SplynxApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Builds the `Splynx-EA` authorization header. Splynx signs each request with an
    /// HMAC-SHA256 over `{nonce}{api_key}` keyed by the API secret, where the nonce is a unix timestamp that must
    /// not go backwards between calls.
    fn authorization_header(&self) -> Result<String, SplynxApiError> {
        let nonce = Utc::now().timestamp();
        let key = &self.config.api_key;
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.api_secret.reveal().as_bytes())
            .map_err(|e| SplynxApiError::SigningError(e.to_string()))?;
        mac.update(format!("{nonce}{key}").as_bytes());
        let signature = hex::encode_upper(mac.finalize().into_bytes());
        Ok(format!("Splynx-EA (key={key}&nonce={nonce}&signature={signature})"))
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
    ) -> Result<T, SplynxApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let auth = self.authorization_header()?;
        let mut req = self.client.request(method, url).header("Authorization", auth);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| SplynxApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| SplynxApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| SplynxApiError::RestResponseError(e.to_string()))?;
            Err(SplynxApiError::QueryError { status, message })
        }
    }

    /// Fetch a single customer record. Returns `None` when the id is unknown to Splynx.
    pub async fn get_customer(&self, customer_id: &str) -> Result<Option<SplynxCustomer>, SplynxApiError> {
        let path = format!("/admin/customers/customer/{customer_id}");
        debug!("Fetching Splynx customer {customer_id}");
        match self.rest_query::<Value, ()>(Method::GET, &path, &[], None).await {
            Ok(value) => {
                let customer = SplynxCustomer::from_value(value)?;
                debug!("Fetched Splynx customer {customer_id} (login: {:?})", customer.login);
                Ok(Some(customer))
            },
            Err(SplynxApiError::QueryError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch the login handle for a customer, the field UISP deployments use as the external identifier.
    pub async fn customer_login(&self, customer_id: &str) -> Result<Option<String>, SplynxApiError> {
        let customer = self.get_customer(customer_id).await?;
        Ok(customer.and_then(|c| c.login))
    }

    /// Bulk customer listing, bounded by `limit`.
    pub async fn fetch_customers(&self, limit: u32) -> Result<Vec<SplynxCustomer>, SplynxApiError> {
        let limit = limit.to_string();
        let params = [("limit", limit.as_str())];
        debug!("Fetching up to {limit} Splynx customers");
        let values = self.rest_query::<Vec<Value>, ()>(Method::GET, "/admin/customers/customer", &params, None).await?;
        let customers = values.into_iter().map(SplynxCustomer::from_value).collect::<Result<Vec<_>, _>>()?;
        info!("Fetched {} Splynx customers", customers.len());
        Ok(customers)
    }
}

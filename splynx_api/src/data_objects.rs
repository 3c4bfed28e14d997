use serde::Deserialize;
use serde_json::Value;

use crate::SplynxApiError;

/// A customer record from the Splynx customers collection.
///
/// Only the fields the bridge reads are typed. The complete payload is retained in `raw` so downstream consumers
/// (the mirror store in particular) keep whatever extra attributes the deployment has configured.
#[derive(Debug, Clone)]
pub struct SplynxCustomer {
    pub id: i64,
    pub login: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub raw: Value,
}

// Splynx is not consistent about numeric ids: single-record endpoints return numbers, list endpoints return strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumericId {
    Int(i64),
    Text(String),
}

impl NumericId {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumericId::Int(i) => Some(*i),
            NumericId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct CustomerFields {
    id: NumericId,
    login: Option<String>,
    name: Option<String>,
    status: Option<String>,
    email: Option<String>,
}

impl SplynxCustomer {
    pub fn from_value(value: Value) -> Result<Self, SplynxApiError> {
        let fields: CustomerFields =
            serde_json::from_value(value.clone()).map_err(|e| SplynxApiError::JsonError(e.to_string()))?;
        let id = fields
            .id
            .as_i64()
            .ok_or_else(|| SplynxApiError::JsonError(format!("customer id is not numeric: {:?}", fields.id)))?;
        Ok(Self { id, login: fields.login, name: fields.name, status: fields.status, email: fields.email, raw: value })
    }
}

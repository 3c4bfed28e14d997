use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::UispApiError;

/// Payment method id UISP assigns to "custom" provider payments.
pub const DEFAULT_PAYMENT_METHOD_ID: i64 = 8;

/// UISP renders payment times in the server's wall clock. The deployments this bridge serves run at UTC+02:00.
const UISP_UTC_OFFSET_SECS: i32 = 2 * 3600;

/// Render a timestamp the way the UISP payments endpoint expects it: local wall-clock time with an explicit offset,
/// e.g. `2024-06-01T14:03:55+0200`.
pub fn format_payment_time(ts: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(UISP_UTC_OFFSET_SECS) {
        Some(tz) => ts.with_timezone(&tz).format("%Y-%m-%dT%H:%M:%S%z").to_string(),
        None => ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }
}

//--------------------------------------     UispClient      ---------------------------------------------------------
/// A client record from the UISP CRM. Typed fields cover what the bridge needs for identity resolution and the local
/// client cache; the untouched payload is kept in `raw`.
#[derive(Debug, Clone)]
pub struct UispClient {
    pub id: i64,
    pub user_ident: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub is_lead: Option<bool>,
    pub is_archived: Option<bool>,
    pub has_suspended_service: Option<bool>,
    pub account_balance: Option<f64>,
    pub account_outstanding: Option<f64>,
    pub contacts: Vec<UispContact>,
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UispContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientFields {
    id: i64,
    user_ident: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    company_name: Option<String>,
    is_lead: Option<bool>,
    is_archived: Option<bool>,
    has_suspended_service: Option<bool>,
    account_balance: Option<f64>,
    account_outstanding: Option<f64>,
    #[serde(default)]
    contacts: Vec<UispContact>,
}

impl UispClient {
    pub fn from_value(value: Value) -> Result<Self, UispApiError> {
        let fields: ClientFields =
            serde_json::from_value(value.clone()).map_err(|e| UispApiError::JsonError(e.to_string()))?;
        Ok(Self {
            id: fields.id,
            user_ident: fields.user_ident,
            first_name: fields.first_name,
            last_name: fields.last_name,
            company_name: fields.company_name,
            is_lead: fields.is_lead,
            is_archived: fields.is_archived,
            has_suspended_service: fields.has_suspended_service,
            account_balance: fields.account_balance,
            account_outstanding: fields.account_outstanding,
            contacts: fields.contacts,
            raw: value,
        })
    }

    /// Person name if present, company name otherwise.
    pub fn display_name(&self) -> Option<String> {
        let person = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if person.is_empty() {
            self.company_name.clone()
        } else {
            Some(person)
        }
    }

    pub fn primary_email(&self) -> Option<String> {
        self.contacts.iter().find_map(|c| c.email.clone())
    }

    pub fn primary_phone(&self) -> Option<String> {
        self.contacts.iter().find_map(|c| c.phone.clone())
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived.unwrap_or(false)
    }

    pub fn is_suspended(&self) -> bool {
        self.has_suspended_service.unwrap_or(false)
    }
}

//--------------------------------------   NewUispPayment    ---------------------------------------------------------
/// Request body for the UISP payment submission endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUispPayment {
    pub client_id: i64,
    pub method: i64,
    /// Major units with two-decimal precision; UISP refuses integer cents.
    pub amount: f64,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub provider_name: String,
    pub provider_payment_id: String,
    pub provider_payment_time: String,
    pub apply_to_invoices_automatically: bool,
}

impl NewUispPayment {
    pub fn new(client_id: i64, amount: f64, provider_payment_id: String) -> Self {
        Self {
            client_id,
            method: DEFAULT_PAYMENT_METHOD_ID,
            amount,
            currency_code: None,
            note: None,
            provider_name: "Splynx".to_string(),
            provider_payment_id,
            provider_payment_time: format_payment_time(Utc::now()),
            apply_to_invoices_automatically: true,
        }
    }

    pub fn with_currency(mut self, currency_code: String) -> Self {
        self.currency_code = Some(currency_code);
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.note = Some(note);
        self
    }

    pub fn with_payment_time(mut self, ts: DateTime<Utc>) -> Self {
        self.provider_payment_time = format_payment_time(ts);
        self
    }

    pub fn with_method(mut self, method: i64) -> Self {
        self.method = method;
        self
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn payment_time_uses_fixed_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 3, 55).unwrap();
        assert_eq!(format_payment_time(ts), "2024-06-01T14:03:55+0200");
    }

    #[test]
    fn display_name_prefers_person() {
        let client = UispClient::from_value(serde_json::json!({
            "id": 7,
            "firstName": "Thandi",
            "lastName": "Ngwenya",
            "companyName": "Karoo Wireless",
            "contacts": [{"email": "thandi@example.com", "phone": null}]
        }))
        .unwrap();
        assert_eq!(client.display_name().unwrap(), "Thandi Ngwenya");
        assert_eq!(client.primary_email().unwrap(), "thandi@example.com");
        assert!(client.primary_phone().is_none());
    }

    #[test]
    fn display_name_falls_back_to_company() {
        let client = UispClient::from_value(serde_json::json!({"id": 8, "companyName": "Karoo Wireless"})).unwrap();
        assert_eq!(client.display_name().unwrap(), "Karoo Wireless");
    }
}

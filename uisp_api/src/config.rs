use bridge_common::Secret;
use log::*;

#[derive(Debug, Clone, Default)]
pub struct UispConfig {
    /// Base URL of the UISP CRM API, e.g. `https://uisp.example.com/crm/api/v1.0`
    pub base_url: String,
    pub app_key: Secret<String>,
}

impl UispConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("BRIDGE_UISP_URL").unwrap_or_else(|_| {
            warn!("🪛️ BRIDGE_UISP_URL not set, using (probably useless) default");
            "https://uisp.example.com/crm/api/v1.0".to_string()
        });
        let app_key = Secret::new(std::env::var("BRIDGE_UISP_APP_KEY").unwrap_or_else(|_| {
            warn!("🪛️ BRIDGE_UISP_APP_KEY not set, using (probably useless) default");
            "0000000000000000".to_string()
        }));
        Self { base_url, app_key }
    }
}

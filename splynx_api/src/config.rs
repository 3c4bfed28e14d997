use bridge_common::Secret;
use log::*;

#[derive(Debug, Clone, Default)]
pub struct SplynxConfig {
    /// Base URL of the Splynx REST API, e.g. `https://billing.example.com/api/2.0`
    pub base_url: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
}

impl SplynxConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("BRIDGE_SPLYNX_URL").unwrap_or_else(|_| {
            warn!("🪛️ BRIDGE_SPLYNX_URL not set, using (probably useless) default");
            "https://splynx.example.com/api/2.0".to_string()
        });
        let api_key = std::env::var("BRIDGE_SPLYNX_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ BRIDGE_SPLYNX_API_KEY not set, using (probably useless) default");
            "0000000000000000".to_string()
        });
        let api_secret = Secret::new(std::env::var("BRIDGE_SPLYNX_API_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ BRIDGE_SPLYNX_API_SECRET not set, using (probably useless) default");
            "0000000000000000".to_string()
        }));
        Self { base_url, api_key, api_secret }
    }
}

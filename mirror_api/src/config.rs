use bridge_common::Secret;
use log::*;

/// Connection details for the reporting mirror.
///
/// `base_url` is the REST root of the store, e.g. `https://abcdefgh.supabase.co/rest/v1`. The service key is
/// sent both as the `apikey` header and as a bearer token, which is what PostgREST-fronted stores expect.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub base_url: String,
    pub service_key: Secret<String>,
}

impl MirrorConfig {
    /// Reads the mirror configuration from the `BRIDGE_MIRROR_URL` and `BRIDGE_MIRROR_SERVICE_KEY` environment
    /// variables. The mirror is optional, so a missing url disables it rather than producing a default.
    pub fn new_from_env_or_default() -> Option<Self> {
        let base_url = match std::env::var("BRIDGE_MIRROR_URL") {
            Ok(url) => url,
            Err(_) => {
                info!("🪞️ BRIDGE_MIRROR_URL is not set. The reporting mirror is disabled.");
                return None;
            },
        };
        let service_key = std::env::var("BRIDGE_MIRROR_SERVICE_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ BRIDGE_MIRROR_SERVICE_KEY is not set, using (probably useless) default");
            String::default()
        });
        Some(Self { base_url, service_key: Secret::new(service_key) })
    }
}

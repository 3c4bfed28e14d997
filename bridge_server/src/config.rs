use std::{env, time::Duration};

use bridge_common::{helpers::parse_boolean_flag, Secret};
use bridge_engine::helpers::RetryPolicy;
use log::*;
use mirror_api::MirrorConfig;
use splynx_api::SplynxConfig;
use uisp_api::UispConfig;

const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
const DEFAULT_BRIDGE_PORT: u16 = 8340;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bridge_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Webhook signature settings for the Splynx intake endpoint.
    pub webhook: WebhookConfig,
    pub splynx: SplynxConfig,
    pub uisp: UispConfig,
    /// Mirror reporting is optional. `None` disables it entirely.
    pub mirror: Option<MirrorConfig>,
    /// Backoff schedule for the forward-to-UISP call.
    pub retry: RetryPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BRIDGE_HOST.to_string(),
            port: DEFAULT_BRIDGE_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            webhook: WebhookConfig::default(),
            splynx: SplynxConfig::default(),
            uisp: UispConfig::default(),
            mirror: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BRIDGE_HOST").ok().unwrap_or_else(|| DEFAULT_BRIDGE_HOST.into());
        let port = env::var("BRIDGE_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BRIDGE_PORT. {e} Using the default, {DEFAULT_BRIDGE_PORT}, \
                         instead."
                    );
                    DEFAULT_BRIDGE_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BRIDGE_PORT);
        let database_url = env::var("BRIDGE_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ BRIDGE_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}, instead.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for =
            env::var("BRIDGE_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("BRIDGE_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            webhook: WebhookConfig::from_env_or_default(),
            splynx: SplynxConfig::new_from_env_or_default(),
            uisp: UispConfig::new_from_env_or_default(),
            mirror: MirrorConfig::new_from_env_or_default(),
            retry: configure_retry_policy(),
        }
    }
}

//-----------------------------------------   WebhookConfig   ---------------------------------------------------------

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// The shared secret Splynx signs webhook payloads with. When unset, signatures cannot be checked at all.
    pub secret: Option<Secret<String>>,
    /// When true and a secret is configured, webhooks with a missing or invalid signature are rejected with a
    /// 401. When false, the verdict is still audited but the payment is processed anyway.
    pub enforce_signatures: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self { secret: None, enforce_signatures: true }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let secret = match env::var("BRIDGE_WEBHOOK_SECRET") {
            Ok(s) if !s.is_empty() => Some(Secret::new(s)),
            _ => {
                warn!("🪛️ BRIDGE_WEBHOOK_SECRET is not set. Incoming webhooks cannot be authenticated.");
                None
            },
        };
        let enforce_signatures = parse_boolean_flag(env::var("BRIDGE_ENFORCE_WEBHOOK_SIGNATURES").ok(), true);
        Self { secret, enforce_signatures }
    }
}

fn configure_retry_policy() -> RetryPolicy {
    let defaults = RetryPolicy::default();
    let max_retries = env::var("BRIDGE_MAX_RETRIES")
        .map_err(|_| info!("🪛️ BRIDGE_MAX_RETRIES is not set. Using the default value of {}.", defaults.max_retries))
        .and_then(|s| {
            s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid configuration value for BRIDGE_MAX_RETRIES. {e}"))
        })
        .ok()
        .unwrap_or(defaults.max_retries);
    let initial_delay = env::var("BRIDGE_RETRY_INITIAL_DELAY_MS")
        .map_err(|_| {
            info!(
                "🪛️ BRIDGE_RETRY_INITIAL_DELAY_MS is not set. Using the default value of {} ms.",
                defaults.initial_delay.as_millis()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| warn!("🪛️ Invalid configuration value for BRIDGE_RETRY_INITIAL_DELAY_MS. {e}"))
        })
        .ok()
        .unwrap_or(defaults.initial_delay);
    let max_delay = env::var("BRIDGE_RETRY_MAX_DELAY_MS")
        .map_err(|_| {
            info!(
                "🪛️ BRIDGE_RETRY_MAX_DELAY_MS is not set. Using the default value of {} ms.",
                defaults.max_delay.as_millis()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| warn!("🪛️ Invalid configuration value for BRIDGE_RETRY_MAX_DELAY_MS. {e}"))
        })
        .ok()
        .unwrap_or(defaults.max_delay);
    let multiplier = env::var("BRIDGE_RETRY_MULTIPLIER")
        .map_err(|_| info!("🪛️ BRIDGE_RETRY_MULTIPLIER is not set. Using the default value of {}.", defaults.multiplier))
        .and_then(|s| {
            s.parse::<u32>().map_err(|e| warn!("🪛️ Invalid configuration value for BRIDGE_RETRY_MULTIPLIER. {e}"))
        })
        .ok()
        .unwrap_or(defaults.multiplier);
    RetryPolicy::new(max_retries, initial_delay, max_delay, multiplier)
}

//-----------------------------------------   ServerOptions   ---------------------------------------------------------

/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}

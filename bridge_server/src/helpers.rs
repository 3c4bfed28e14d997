use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use log::{debug, trace};
use regex::Regex;
use serde_json::Value;
use sha2::Sha256;

/// Header names Splynx installations have used for the webhook signature over the years. Checked in order.
pub const SIGNATURE_HEADERS: [&str; 3] = ["x-splynx-signature", "x-webhook-signature", "x-signature"];

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    // Collect peer IP from x-forwarded-for, or forwarded headers _if_ `use_nnn` has been set to true
    // in the configuration. Otherwise, use the peer address from the connection info.
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result =
            req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()).and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        let re = Regex::new(r#"for=(?P<ip>[^;]+)"#).unwrap();
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| re.captures(v))
            .and_then(|caps| caps.name("ip"))
            .map(|m| m.as_str())
            .and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

/// Checks the webhook signature on a request against the raw body.
///
/// Returns `None` when no candidate signature header is present at all, otherwise whether the hex-encoded
/// HMAC-SHA256 of the body under `secret` matches the supplied value. The comparison is constant-time.
pub fn verify_webhook_signature(req: &HttpRequest, body: &[u8], secret: &str) -> Option<bool> {
    let supplied = SIGNATURE_HEADERS.iter().find_map(|name| req.headers().get(*name)).and_then(|v| v.to_str().ok())?;
    let Ok(sig_bytes) = hex::decode(supplied.trim()) else {
        return Some(false);
    };
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    Some(mac.verify_slice(&sig_bytes).is_ok())
}

/// Renders the request headers as a JSON object for the webhook audit trail.
pub fn render_headers(req: &HttpRequest) -> String {
    let map = req
        .headers()
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), Value::from(value.to_str().unwrap_or("<binary>"))))
        .collect::<serde_json::Map<String, Value>>();
    Value::Object(map).to_string()
}

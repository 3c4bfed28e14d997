mod retry;

use chrono::Utc;
pub use retry::{retry_with_policy, RetryPolicy};

/// Builds a transaction id for webhooks that did not carry one, from the intake time and the resolved client.
///
/// Two true duplicate deliveries without an original transaction id synthesize different ids and are therefore
/// not deduplicated. Only caller-supplied ids get the full idempotency guarantee.
pub fn synthesized_transaction_id(client_id: i64) -> String {
    format!("SPLYNX-{}-{}", Utc::now().timestamp_millis(), client_id)
}

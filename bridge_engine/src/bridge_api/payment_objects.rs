use bridge_common::Money;
use chrono::{DateTime, Utc};

use crate::db_types::PaymentRecord;

/// A normalized inbound payment: what is left of a webhook body once the intake has worked out which of the
/// three delivery shapes it arrived in and pulled the fields out. Only the customer and the amount are
/// guaranteed; everything else is carried through when present.
#[derive(Debug, Clone)]
pub struct PaymentIntake {
    pub source_customer_id: String,
    pub amount: Money,
    /// The caller's idempotency key. When absent, one is synthesized after resolution.
    pub transaction_id: Option<String>,
    pub currency_code: Option<String>,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    /// Business timestamp of the payment as supplied by the caller.
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentIntake {
    pub fn new<S: Into<String>>(source_customer_id: S, amount: Money) -> Self {
        Self {
            source_customer_id: source_customer_id.into(),
            amount,
            transaction_id: None,
            currency_code: None,
            payment_type: None,
            payment_method: None,
            note: None,
            created_at: None,
        }
    }

    pub fn with_transaction_id<S: Into<String>>(mut self, transaction_id: S) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_currency<S: Into<String>>(mut self, currency_code: S) -> Self {
        self.currency_code = Some(currency_code.into());
        self
    }

    pub fn with_payment_type<S: Into<String>>(mut self, payment_type: S) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn with_payment_method<S: Into<String>>(mut self, payment_method: S) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    pub fn with_note<S: Into<String>>(mut self, note: S) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// What the pipeline hands back to the webhook layer once a payment's fate is known.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: PaymentRecord,
    /// True when this webhook was a duplicate and the stored outcome was replayed without touching UISP.
    pub replayed: bool,
    /// The id of the downstream UISP payment record, when one could be read out of the response.
    pub uisp_payment_id: Option<String>,
}

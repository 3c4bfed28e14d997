use crate::{
    db_types::{ClientRecord, PaymentRecord},
    traits::SourceCustomer,
};

/// Fired as soon as a new payment has been ledgered as `pending`, before any forwarding attempt.
#[derive(Debug, Clone)]
pub struct PaymentReceivedEvent {
    pub payment: PaymentRecord,
}

impl PaymentReceivedEvent {
    pub fn new(payment: PaymentRecord) -> Self {
        Self { payment }
    }
}

/// Fired when a payment reaches a terminal state. The record's `status` field says which one.
#[derive(Debug, Clone)]
pub struct PaymentStatusChangedEvent {
    pub payment: PaymentRecord,
}

impl PaymentStatusChangedEvent {
    pub fn new(payment: PaymentRecord) -> Self {
        Self { payment }
    }
}

/// Fired once per page of a bulk client sync, with the records as they were stored.
#[derive(Debug, Clone)]
pub struct ClientsSyncedEvent {
    pub clients: Vec<ClientRecord>,
}

impl ClientsSyncedEvent {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        Self { clients }
    }
}

/// Fired when a Splynx customer sync run has fetched its batch.
#[derive(Debug, Clone)]
pub struct SourceCustomersSyncedEvent {
    pub customers: Vec<SourceCustomer>,
}

impl SourceCustomersSyncedEvent {
    pub fn new(customers: Vec<SourceCustomer>) -> Self {
        Self { customers }
    }
}

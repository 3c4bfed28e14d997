use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    ClientsSyncedEvent,
    EventHandler,
    EventProducer,
    Handler,
    PaymentReceivedEvent,
    PaymentStatusChangedEvent,
    SourceCustomersSyncedEvent,
};

/// The subscriptions a deployment wants, registered before the server starts. Each event accepts any number
/// of hooks; every hook gets its own channel and its own copy of the event stream, so one slow subscriber
/// never blocks another. An event with no hooks costs nothing at runtime.
#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_payment_received: Vec<Handler<PaymentReceivedEvent>>,
    pub on_payment_status_changed: Vec<Handler<PaymentStatusChangedEvent>>,
    pub on_clients_synced: Vec<Handler<ClientsSyncedEvent>>,
    pub on_source_customers_synced: Vec<Handler<SourceCustomersSyncedEvent>>,
}

impl EventHooks {
    pub fn on_payment_received<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentReceivedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_received.push(Arc::new(f));
        self
    }

    pub fn on_payment_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_status_changed.push(Arc::new(f));
        self
    }

    pub fn on_clients_synced<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ClientsSyncedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_clients_synced.push(Arc::new(f));
        self
    }

    pub fn on_source_customers_synced<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(SourceCustomersSyncedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_source_customers_synced.push(Arc::new(f));
        self
    }
}

#[derive(Default, Clone)]
pub struct EventProducers {
    pub payment_received: Vec<EventProducer<PaymentReceivedEvent>>,
    pub payment_status_changed: Vec<EventProducer<PaymentStatusChangedEvent>>,
    pub clients_synced: Vec<EventProducer<ClientsSyncedEvent>>,
    pub source_customers_synced: Vec<EventProducer<SourceCustomersSyncedEvent>>,
}

pub struct EventHandlers {
    pub on_payment_received: Vec<EventHandler<PaymentReceivedEvent>>,
    pub on_payment_status_changed: Vec<EventHandler<PaymentStatusChangedEvent>>,
    pub on_clients_synced: Vec<EventHandler<ClientsSyncedEvent>>,
    pub on_source_customers_synced: Vec<EventHandler<SourceCustomersSyncedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        Self {
            on_payment_received: hooks
                .on_payment_received
                .into_iter()
                .map(|f| EventHandler::new(buffer_size, f))
                .collect(),
            on_payment_status_changed: hooks
                .on_payment_status_changed
                .into_iter()
                .map(|f| EventHandler::new(buffer_size, f))
                .collect(),
            on_clients_synced: hooks.on_clients_synced.into_iter().map(|f| EventHandler::new(buffer_size, f)).collect(),
            on_source_customers_synced: hooks
                .on_source_customers_synced
                .into_iter()
                .map(|f| EventHandler::new(buffer_size, f))
                .collect(),
        }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        for handler in &self.on_payment_received {
            result.payment_received.push(handler.subscribe());
        }
        for handler in &self.on_payment_status_changed {
            result.payment_status_changed.push(handler.subscribe());
        }
        for handler in &self.on_clients_synced {
            result.clients_synced.push(handler.subscribe());
        }
        for handler in &self.on_source_customers_synced {
            result.source_customers_synced.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        for handler in self.on_payment_received {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        for handler in self.on_payment_status_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        for handler in self.on_clients_synced {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        for handler in self.on_source_customers_synced {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

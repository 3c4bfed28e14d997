mod api;
mod config;
mod data_objects;
mod error;

pub use api::UispApi;
pub use config::UispConfig;
pub use data_objects::{format_payment_time, NewUispPayment, UispClient, UispContact, DEFAULT_PAYMENT_METHOD_ID};
pub use error::UispApiError;

mod api;
mod config;
mod data_objects;
mod error;

pub use api::SplynxApi;
pub use config::SplynxConfig;
pub use data_objects::SplynxCustomer;
pub use error::SplynxApiError;

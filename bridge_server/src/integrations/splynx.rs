//! Adapts [`SplynxApi`] to the engine's [`SourceDirectory`] seam.
use bridge_engine::traits::{CollaboratorError, SourceCustomer, SourceDirectory};
use splynx_api::{SplynxApi, SplynxApiError, SplynxCustomer};

#[derive(Clone)]
pub struct SplynxDirectory {
    api: SplynxApi,
}

impl SplynxDirectory {
    pub fn new(api: SplynxApi) -> Self {
        Self { api }
    }
}

impl SourceDirectory for SplynxDirectory {
    async fn customer_login(&self, customer_id: &str) -> Result<Option<String>, CollaboratorError> {
        self.api.customer_login(customer_id).await.map_err(collaborator_error)
    }

    async fn fetch_customers(&self, limit: u32) -> Result<Vec<SourceCustomer>, CollaboratorError> {
        let customers = self.api.fetch_customers(limit).await.map_err(collaborator_error)?;
        Ok(customers.into_iter().map(source_customer_from).collect())
    }
}

fn source_customer_from(customer: SplynxCustomer) -> SourceCustomer {
    SourceCustomer {
        id: customer.id,
        login: customer.login,
        name: customer.name,
        email: customer.email,
        status: customer.status,
    }
}

fn collaborator_error(e: SplynxApiError) -> CollaboratorError {
    match e {
        SplynxApiError::QueryError { status, message } => CollaboratorError::RemoteResponse { status, message },
        SplynxApiError::JsonError(m) => CollaboratorError::Protocol(m),
        other => CollaboratorError::Network(other.to_string()),
    }
}

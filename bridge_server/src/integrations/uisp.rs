//! Adapts [`UispApi`] to the engine's [`TargetCrm`] seam.
use bridge_common::Money;
use bridge_engine::traits::{CollaboratorError, CrmClient, PaymentSubmission, TargetCrm};
use uisp_api::{NewUispPayment, UispApi, UispApiError, UispClient};

#[derive(Clone)]
pub struct UispCrm {
    api: UispApi,
}

impl UispCrm {
    pub fn new(api: UispApi) -> Self {
        Self { api }
    }
}

impl TargetCrm for UispCrm {
    async fn find_client_by_external_id(&self, external_id: &str) -> Result<Option<CrmClient>, CollaboratorError> {
        let client = self.api.find_client_by_user_ident(external_id).await.map_err(collaborator_error)?;
        Ok(client.map(crm_client_from))
    }

    async fn fetch_client(&self, client_id: i64) -> Result<Option<CrmClient>, CollaboratorError> {
        let client = self.api.get_client(client_id).await.map_err(collaborator_error)?;
        Ok(client.map(crm_client_from))
    }

    async fn fetch_clients_page(&self, limit: u32, offset: u32) -> Result<Vec<CrmClient>, CollaboratorError> {
        let clients = self.api.fetch_clients_page(limit, offset).await.map_err(collaborator_error)?;
        Ok(clients.into_iter().map(crm_client_from).collect())
    }

    async fn submit_payment(&self, payment: &PaymentSubmission) -> Result<String, CollaboratorError> {
        let mut downstream = NewUispPayment::new(
            payment.client_id,
            payment.amount.to_major_units(),
            payment.provider_payment_id.clone(),
        )
        .with_currency(payment.currency_code.clone())
        .with_payment_time(payment.paid_at);
        if let Some(method) = payment.method {
            downstream = downstream.with_method(method);
        }
        if let Some(note) = &payment.note {
            downstream = downstream.with_note(note.clone());
        }
        self.api.create_payment(&downstream).await.map_err(collaborator_error)
    }
}

/// A balance UISP did not supply (or supplied as garbage) lands as zero in the cache.
fn crm_client_from(client: UispClient) -> CrmClient {
    CrmClient {
        id: client.id,
        user_ident: client.user_ident.clone(),
        name: client.display_name(),
        email: client.primary_email(),
        phone: client.primary_phone(),
        account_balance: money_or_zero(client.account_balance),
        account_outstanding: money_or_zero(client.account_outstanding),
        is_active: client.is_active(),
        is_suspended: client.is_suspended(),
        raw: client.raw,
    }
}

fn money_or_zero(value: Option<f64>) -> Money {
    value.and_then(|v| Money::try_from_f64(v).ok()).unwrap_or_default()
}

fn collaborator_error(e: UispApiError) -> CollaboratorError {
    match e {
        UispApiError::QueryError { status, message } => CollaboratorError::RemoteResponse { status, message },
        UispApiError::JsonError(m) => CollaboratorError::Protocol(m),
        other => CollaboratorError::Network(other.to_string()),
    }
}

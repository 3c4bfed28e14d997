use crate::{
    db_types::{CustomerMapping, NewCustomerMapping},
    traits::LedgerError,
};

/// Storage contract for the persisted Splynx to UISP identity mappings.
#[allow(async_fn_in_trait)]
pub trait MappingStore {
    async fn fetch_mapping(&self, splynx_customer_id: &str) -> Result<Option<CustomerMapping>, LedgerError>;

    /// Insert the mapping, or overwrite the UISP client id and notes when one already exists for the Splynx
    /// customer id. There is at most one active mapping per Splynx customer.
    async fn upsert_mapping(&self, mapping: NewCustomerMapping) -> Result<CustomerMapping, LedgerError>;
}

use sqlx::SqliteConnection;

use crate::{
    db_types::{CustomerMapping, NewCustomerMapping},
    traits::LedgerError,
};

pub async fn fetch_mapping(
    splynx_customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<CustomerMapping>, LedgerError> {
    let mapping = sqlx::query_as(r#"SELECT * FROM customer_mappings WHERE splynx_customer_id = ?"#)
        .bind(splynx_customer_id)
        .fetch_optional(conn)
        .await?;
    Ok(mapping)
}

/// Inserts the mapping, or overwrites the UISP client id and notes when the Splynx customer id is already
/// mapped. The unique index on `splynx_customer_id` keeps this to one active mapping per customer.
pub async fn upsert_mapping(
    mapping: NewCustomerMapping,
    conn: &mut SqliteConnection,
) -> Result<CustomerMapping, LedgerError> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO customer_mappings (splynx_customer_id, uisp_client_id, notes)
            VALUES ($1, $2, $3)
            ON CONFLICT (splynx_customer_id) DO UPDATE SET
                uisp_client_id = excluded.uisp_client_id,
                notes = excluded.notes,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(mapping.splynx_customer_id)
    .bind(mapping.uisp_client_id)
    .bind(mapping.notes)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

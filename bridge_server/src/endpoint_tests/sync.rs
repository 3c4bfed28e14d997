use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bridge_engine::{
    db_types::SyncStatus,
    events::EventProducers,
    traits::{CollaboratorError, LedgerError, SourceCustomer},
    ClientSyncApi,
    SOURCE_FETCH_LIMIT,
    SYNC_PAGE_SIZE,
};

use super::helpers::{get_request, post_request};
use crate::{
    endpoint_tests::mocks::{
        client_record, crm_client, finalized_sync_log, sync_log, MockBridgeStore, MockCrm, MockDirectory,
    },
    routes::{health, SyncClientsRoute, SyncSourceCustomersRoute},
};

#[actix_web::test]
async fn the_health_check_answers() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/health", |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn a_full_client_sync_reports_its_numbers() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_create_sync_log().withf(|t| t == "uisp_clients").times(1).returning(|t| Ok(sync_log(7, t)));
    store.expect_upsert_client().times(2).returning(|c| Ok(client_record(&c)));
    store
        .expect_finalize_sync_log()
        .withf(|id, outcome| {
            *id == 7
                && outcome.status == SyncStatus::Completed
                && outcome.total_records == 2
                && outcome.synced_records == 2
                && outcome.failed_records == 0
        })
        .times(1)
        .returning(|id, outcome| Ok(finalized_sync_log(id, "uisp_clients", &outcome)));
    let mut crm = MockCrm::new();
    crm.expect_fetch_clients_page()
        .withf(|limit, offset| *limit == SYNC_PAGE_SIZE && *offset == 0)
        .times(1)
        .returning(|_, _| Ok(vec![crm_client(1, "alpha"), crm_client(2, "bravo")]));
    let configure = configure_sync(store, MockDirectory::new(), crm);
    let (status, body) = post_request("/sync/clients", "", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("uisp_clients"));
    assert!(body.contains(r#""status":"completed""#));
    assert!(body.contains(r#""totalRecords":2"#));
}

#[actix_web::test]
async fn the_sync_pages_until_a_short_page() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_create_sync_log().times(1).returning(|t| Ok(sync_log(8, t)));
    store.expect_upsert_client().times(100).returning(|c| Ok(client_record(&c)));
    store
        .expect_finalize_sync_log()
        .withf(|_, outcome| outcome.total_records == 100 && outcome.synced_records == 100)
        .times(1)
        .returning(|id, outcome| Ok(finalized_sync_log(id, "uisp_clients", &outcome)));
    let mut crm = MockCrm::new();
    // A full first page forces a second fetch, which comes back empty.
    crm.expect_fetch_clients_page().times(2).returning(|_, offset| {
        if offset == 0 {
            Ok((1..=100).map(|i| crm_client(i, &format!("client-{i}"))).collect())
        } else {
            Ok(vec![])
        }
    });
    let configure = configure_sync(store, MockDirectory::new(), crm);
    let (status, body) = post_request("/sync/clients", "", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""totalRecords":100"#));
}

#[actix_web::test]
async fn per_record_failures_do_not_kill_the_run() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_create_sync_log().times(1).returning(|t| Ok(sync_log(9, t)));
    store.expect_upsert_client().times(2).returning(|c| {
        if c.uisp_id == 2 {
            Err(LedgerError::DatabaseError("disk full".to_string()))
        } else {
            Ok(client_record(&c))
        }
    });
    store
        .expect_finalize_sync_log()
        .withf(|_, outcome| {
            outcome.status == SyncStatus::Completed
                && outcome.total_records == 2
                && outcome.synced_records == 1
                && outcome.failed_records == 1
        })
        .times(1)
        .returning(|id, outcome| Ok(finalized_sync_log(id, "uisp_clients", &outcome)));
    let mut crm = MockCrm::new();
    crm.expect_fetch_clients_page().times(1).returning(|_, _| Ok(vec![crm_client(1, "alpha"), crm_client(2, "bravo")]));
    let configure = configure_sync(store, MockDirectory::new(), crm);
    let (status, body) = post_request("/sync/clients", "", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""failedRecords":1"#));
}

#[actix_web::test]
async fn a_dead_page_fetch_fails_the_run() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_create_sync_log().times(1).returning(|t| Ok(sync_log(10, t)));
    store
        .expect_finalize_sync_log()
        .withf(|_, outcome| outcome.status == SyncStatus::Failed && outcome.error_summary.is_some())
        .times(1)
        .returning(|id, outcome| Ok(finalized_sync_log(id, "uisp_clients", &outcome)));
    let mut crm = MockCrm::new();
    crm.expect_fetch_clients_page()
        .times(1)
        .returning(|_, _| Err(CollaboratorError::Network("connection refused".to_string())));
    let configure = configure_sync(store, MockDirectory::new(), crm);
    let (status, body) = post_request("/sync/clients", "", &[], configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("connection refused"));
}

#[actix_web::test]
async fn a_customer_snapshot_sync_logs_its_run() {
    let _ = env_logger::try_init().ok();
    let mut store = MockBridgeStore::new();
    store.expect_create_sync_log().withf(|t| t == "splynx_customers").times(1).returning(|t| Ok(sync_log(3, t)));
    store
        .expect_finalize_sync_log()
        .withf(|id, outcome| {
            *id == 3 && outcome.status == SyncStatus::Completed && outcome.total_records == 3 && outcome.synced_records == 3
        })
        .times(1)
        .returning(|id, outcome| Ok(finalized_sync_log(id, "splynx_customers", &outcome)));
    let mut directory = MockDirectory::new();
    directory.expect_fetch_customers().withf(|limit| *limit == SOURCE_FETCH_LIMIT).times(1).returning(|_| {
        let customers = (1..=3)
            .map(|i| SourceCustomer {
                id: i,
                login: Some(format!("user{i}")),
                name: Some(format!("User {i}")),
                email: None,
                status: Some("active".to_string()),
            })
            .collect();
        Ok(customers)
    });
    let configure = configure_sync(store, directory, MockCrm::new());
    let (status, body) = post_request("/sync/customers", "", &[], configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("splynx_customers"));
    assert!(body.contains(r#""totalRecords":3"#));
}

fn configure_sync(store: MockBridgeStore, directory: MockDirectory, crm: MockCrm) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = ClientSyncApi::new(store, directory, crm, EventProducers::default());
        cfg.service(SyncClientsRoute::<MockBridgeStore, MockDirectory, MockCrm>::new())
            .service(SyncSourceCustomersRoute::<MockBridgeStore, MockDirectory, MockCrm>::new())
            .app_data(web::Data::new(api));
    }
}

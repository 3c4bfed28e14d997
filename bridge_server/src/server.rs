use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bridge_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    ClientSyncApi,
    PaymentFlowApi,
    SqliteDatabase,
};
use log::info;
use mirror_api::MirrorApi;
use splynx_api::SplynxApi;
use uisp_api::UispApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{
        mirror::register_mirror_hooks,
        refresh::register_client_refresh_hook,
        splynx::SplynxDirectory,
        uisp::UispCrm,
    },
    routes::{health, SyncClientsRoute, SyncSourceCustomersRoute},
    webhook::PaymentWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let directory = SplynxDirectory::new(
        SplynxApi::new(config.splynx.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?,
    );
    let crm =
        UispCrm::new(UispApi::new(config.uisp.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?);
    let mirror = match &config.mirror {
        Some(mirror_config) => {
            let mirror =
                MirrorApi::new(mirror_config.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
            info!("🪞️ Mirror reporting is enabled");
            Some(mirror)
        },
        None => None,
    };
    let mut hooks = EventHooks::default();
    register_client_refresh_hook(&mut hooks, db.clone(), directory.clone(), crm.clone(), mirror.clone());
    if let Some(mirror) = mirror {
        register_mirror_hooks(&mut hooks, mirror);
    }
    let handlers = EventHandlers::new(25, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, directory, crm, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    directory: SplynxDirectory,
    crm: UispCrm,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let webhook_config = config.webhook.clone();
    let retry = config.retry;
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), directory.clone(), crm.clone(), retry, producers.clone());
        let sync_api = ClientSyncApi::new(db.clone(), directory.clone(), crm.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bridge::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(sync_api))
            .app_data(web::Data::new(options))
            .app_data(web::Data::new(webhook_config.clone()))
            .service(health)
            .service(PaymentWebhookRoute::<SqliteDatabase, SplynxDirectory, UispCrm>::new())
            .service(SyncClientsRoute::<SqliteDatabase, SplynxDirectory, UispCrm>::new())
            .service(SyncSourceCustomersRoute::<SqliteDatabase, SplynxDirectory, UispCrm>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

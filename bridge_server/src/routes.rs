//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//! (The payment webhook intake lives in [`crate::webhook`] for exactly that reason.)
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! remote API calls) should be expressed as futures or asynchronous functions. Async handlers get executed concurrently
//! by worker threads and thus don't block execution.
use actix_web::{get, web, HttpResponse, Responder};
use bridge_engine::{
    traits::{ClientSyncStore, SourceDirectory, TargetCrm},
    ClientSyncApi,
};
use log::*;

use crate::{data_objects::SyncSummary, errors::ServerError};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Client sync  ------------------------------------------------
route!(sync_clients => Post "/sync/clients" impl ClientSyncStore, SourceDirectory, TargetCrm);
/// Runs a full UISP client sync and returns the finalized sync log.
///
/// The sync pages through the whole UISP client collection, upserting each record into the local cache.
/// Per-record failures are counted, not fatal; a dead page fetch fails the run.
pub async fn sync_clients<B, S, T>(api: web::Data<ClientSyncApi<B, S, T>>) -> Result<HttpResponse, ServerError>
where
    B: ClientSyncStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    debug!("🔄️ Full UISP client sync requested");
    let log = api.sync_all_clients().await?;
    Ok(HttpResponse::Ok().json(SyncSummary::from(log)))
}

route!(sync_source_customers => Post "/sync/customers" impl ClientSyncStore, SourceDirectory, TargetCrm);
/// Takes a fresh snapshot of the Splynx customer collection and pushes it to the reporting hooks.
pub async fn sync_source_customers<B, S, T>(
    api: web::Data<ClientSyncApi<B, S, T>>,
) -> Result<HttpResponse, ServerError>
where
    B: ClientSyncStore,
    S: SourceDirectory,
    T: TargetCrm,
{
    debug!("🔄️ Splynx customer snapshot sync requested");
    let log = api.sync_source_customers().await?;
    Ok(HttpResponse::Ok().json(SyncSummary::from(log)))
}

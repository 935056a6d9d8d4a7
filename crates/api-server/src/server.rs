use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use shared::error::CommonError;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::ApiService;
use crate::router::initiate_api_router;

/// How long in-flight requests may run once shutdown begins.
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StartAxumServerParams<F> {
    pub host: String,
    pub port: u16,
    pub api_service: ApiService,
    /// Resolves when the server should stop accepting connections.
    pub shutdown_signal: F,
}

/// Binds the API router and returns the serve future with its handle.
pub async fn start_axum_server<F>(
    params: StartAxumServerParams<F>,
) -> Result<
    (
        impl Future<Output = Result<(), std::io::Error>>,
        axum_server::Handle,
        SocketAddr,
    ),
    CommonError,
>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .map_err(|e| CommonError::AddrParseError { source: e })?;

    info!("Starting server on {}", addr);

    let handle = axum_server::Handle::new();

    let router = initiate_api_router(params.api_service)?.layer(CorsLayer::permissive());

    info!("Router initiated");

    let server_fut = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(router.into_make_service_with_connect_info::<SocketAddr>());

    let handle_clone = handle.clone();
    let shutdown_signal = params.shutdown_signal;
    tokio::spawn(async move {
        shutdown_signal.await;

        info!("Shutting down axum server, waiting for in-flight requests to complete...");
        handle_clone.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_TIMEOUT));
    });

    info!("Server bound");
    Ok((server_fut, handle, addr))
}

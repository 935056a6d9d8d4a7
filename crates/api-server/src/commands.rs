use api_server::config::ServeParams;
use api_server::factory::{create_api_service, load_sql_migrations};
use api_server::router::generate_openapi_spec;
use api_server::server::{StartAxumServerParams, start_axum_server};
use shared::error::CommonError;
use shared::libsql::{establish_db_connection, inject_auth_token_to_db_url};
use tracing::{error, info};

pub async fn cmd_serve(params: ServeParams) -> Result<(), CommonError> {
    let db_url = inject_auth_token_to_db_url(&params.db_conn_string, &params.db_auth_token)?;
    let (_db, conn) = establish_db_connection(&db_url, Some(load_sql_migrations())).await?;
    info!("Database ready");

    let api_service = create_api_service(conn, &params.api_service_config())?;

    let (server_fut, _handle, addr) = start_axum_server(StartAxumServerParams {
        host: params.host.clone(),
        port: params.port,
        api_service,
        shutdown_signal: ctrl_c(),
    })
    .await?;

    info!(%addr, "Listening");
    server_fut.await?;
    info!("Axum server shut down gracefully");

    Ok(())
}

pub fn cmd_openapi() -> Result<(), CommonError> {
    let spec = generate_openapi_spec();
    println!("{}", spec.to_pretty_json()?);
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {:?}", e);
        std::future::pending::<()>().await;
    }
    info!("Received ctrl-c");
}

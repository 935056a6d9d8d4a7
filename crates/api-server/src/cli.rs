use std::error::Error;

use api_server::config::ServeParams;
use clap::{Parser, Subcommand};
use shared::error::CommonError;

use crate::commands;

#[derive(Parser)]
#[command(version, about = "Task and profile HTTP API")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeParams),
    /// Print the OpenAPI document
    Openapi,
}

fn log_error_chain(err: &(dyn Error)) {
    let mut current: Option<&(dyn Error)> = err.source();

    while let Some(e) = current {
        eprintln!("Caused by: {e}");
        current = e.source();
    }
}

fn handle_error(err: &CommonError) {
    eprintln!("Error: {err}");
    log_error_chain(err);
    ::std::process::exit(1);
}

pub async fn run_cli(cli: Cli) -> Result<(), anyhow::Error> {
    let cmd_res = match cli.command {
        Commands::Serve(params) => commands::cmd_serve(params).await,
        Commands::Openapi => commands::cmd_openapi(),
    };

    if let Err(e) = &cmd_res {
        handle_error(e);
    }

    Ok(())
}

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use sockapi_web::Server;
use sockapi_web::config::{AppConfig, CliArgs};
use sockapi_web::endpoints;
use sockapi_web::store::JsonFileUserStore;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    let config = AppConfig::from_args(&args)?;

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(users_file = ?config.users_file, "using user store");
    let store = Arc::new(JsonFileUserStore::new(&config.users_file));
    let router = endpoints::router(store)?;

    let running = Server::builder()
        .address(config.bind_address.as_str())
        .router(router)
        .connection_config(config.connection_config())
        .build()?
        .start()
        .await?;

    tokio::signal::ctrl_c().await?;
    running.stop().await;
    Ok(())
}

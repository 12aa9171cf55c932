use anyhow::Context;
use dotenv::dotenv;
use publists::app_env::AppConfig;
use publists::{SharedData, api, db, logging, persistence};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let dotenv_loaded = dotenv().is_ok();
    logging::setup_logging_and_tracing(logging::init_env_filter()?, logging::exporters_from_env()?);
    if !dotenv_loaded {
        info!("No .env file found, using the process environment only");
    }

    let config = AppConfig::from_env()?;
    info!("Connecting to database...");
    let db = db::connect_sqlx(&config.database_url).await?;
    let ext_cxn = persistence::ExternalConnectivity::new(db)?;

    let port = config.port;
    let production = config.production;
    let router = api::build_router(Arc::new(SharedData { ext_cxn, config }));

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    info!(production, "Publists listening on port {port}");
    axum::serve(listener, router)
        .await
        .context("serving HTTP")?;

    Ok(())
}

use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

/// Opens a connection pool to the owner database and brings its schema up to date
pub async fn connect_sqlx(db_url: &str) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(2))
        .connect(db_url)
        .await
        .context("connecting to the owner database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("running database migrations")?;
    info!("Database schema is up to date");

    Ok(pool)
}

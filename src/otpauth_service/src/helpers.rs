use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, postgres::PgPoolOptions};

/// Connect to PostgreSQL and bring the schema up to date.
pub async fn configure_postgresql(database_url: &Secret<String>) -> Result<PgPool, sqlx::Error> {
    let pg_pool = get_postgres_pool(database_url.expose_secret()).await?;

    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    Ok(pg_pool)
}

pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

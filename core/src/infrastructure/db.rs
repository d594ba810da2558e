use sea_orm::{DatabaseConnection, DbErr, RuntimeErr, SqlxPostgresConnector};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::domain::common::DatabaseConfig;
use crate::domain::common::entities::app_errors::DaoError;

/// Build the shared connection pool and bring the schema up to date.
///
/// The returned connection is handed to repository constructors by the
/// caller; nothing in this crate holds a global session.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DaoError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.url())
        .await
        .map_err(|e| {
            error!("failed to connect to {}:{}: {}", config.host, config.port, e);
            DaoError::storage("database", DbErr::Conn(RuntimeErr::SqlxError(e)))
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("failed to apply migrations: {}", e);
            DaoError::storage("database", DbErr::Custom(e.to_string()))
        })?;
    info!("database schema is up to date");

    Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
}

use portfolio_core::PortfolioError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

#[derive(Clone)]
pub struct HoldingsDb {
    pool: SqlitePool,
}

impl HoldingsDb {
    /// Create a new database connection and make sure the schema exists.
    pub async fn new(database_url: &str) -> Result<Self, PortfolioError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(db_err)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    /// Initialize database schema, statement by statement since sqlx
    /// won't execute multiple statements in one query.
    async fn init_schema(&self) -> Result<(), PortfolioError> {
        let schema = include_str!("../../../schema.sql");

        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
            }
        }

        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub(crate) fn db_err(e: sqlx::Error) -> PortfolioError {
    PortfolioError::DatabaseError(e.to_string())
}

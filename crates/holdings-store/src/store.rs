use crate::db::{db_err, HoldingsDb};
use crate::models::HoldingRecord;
use portfolio_core::PortfolioError;

pub struct HoldingsStore {
    db: HoldingsDb,
}

impl HoldingsStore {
    pub fn new(db: HoldingsDb) -> Self {
        Self { db }
    }

    /// Get a reference to the database
    pub fn db(&self) -> &HoldingsDb {
        &self.db
    }

    /// Insert a new holding. A `(ticker, exchange)` pair already present
    /// for the user is a conflict the caller must resolve, never a
    /// silent merge.
    pub async fn add_holding(&self, record: HoldingRecord) -> Result<i64, PortfolioError> {
        let ticker = record.ticker.trim().to_uppercase();

        if self
            .get_by_ticker(&record.user_id, &ticker, &record.exchange)
            .await?
            .is_some()
        {
            return Err(PortfolioError::DuplicateHolding(format!(
                "{} on {}",
                ticker, record.exchange
            )));
        }

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO holdings (user_id, ticker, exchange, shares, purchase_price, purchase_date, sector, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&record.user_id)
        .bind(&ticker)
        .bind(&record.exchange)
        .bind(record.shares)
        .bind(record.purchase_price)
        .bind(&record.purchase_date)
        .bind(&record.sector)
        .bind(&record.notes)
        .fetch_one(self.db.pool())
        .await
        .map_err(db_err)?;

        Ok(id)
    }

    /// Get all of a user's holdings
    pub async fn get_holdings(&self, user_id: &str) -> Result<Vec<HoldingRecord>, PortfolioError> {
        sqlx::query_as::<_, HoldingRecord>(
            "SELECT * FROM holdings WHERE user_id = ? ORDER BY ticker, exchange",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(db_err)
    }

    /// Get one holding by row id
    pub async fn get_holding(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<HoldingRecord>, PortfolioError> {
        sqlx::query_as::<_, HoldingRecord>("SELECT * FROM holdings WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(db_err)
    }

    /// Get one holding by its (ticker, exchange) identity
    pub async fn get_by_ticker(
        &self,
        user_id: &str,
        ticker: &str,
        exchange: &str,
    ) -> Result<Option<HoldingRecord>, PortfolioError> {
        sqlx::query_as::<_, HoldingRecord>(
            "SELECT * FROM holdings WHERE user_id = ? AND ticker = ? AND exchange = ?",
        )
        .bind(user_id)
        .bind(ticker)
        .bind(exchange)
        .fetch_optional(self.db.pool())
        .await
        .map_err(db_err)
    }

    /// Update a holding. Moving it onto another holding's
    /// `(ticker, exchange)` identity is the same conflict as a duplicate
    /// insert.
    pub async fn update_holding(
        &self,
        id: i64,
        record: HoldingRecord,
    ) -> Result<(), PortfolioError> {
        let ticker = record.ticker.trim().to_uppercase();

        if let Some(existing) = self
            .get_by_ticker(&record.user_id, &ticker, &record.exchange)
            .await?
        {
            if existing.id != Some(id) {
                return Err(PortfolioError::DuplicateHolding(format!(
                    "{} on {}",
                    ticker, record.exchange
                )));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE holdings
            SET ticker = ?, exchange = ?, shares = ?, purchase_price = ?, purchase_date = ?, sector = ?, notes = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&ticker)
        .bind(&record.exchange)
        .bind(record.shares)
        .bind(record.purchase_price)
        .bind(&record.purchase_date)
        .bind(&record.sector)
        .bind(&record.notes)
        .bind(&record.user_id)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortfolioError::NotFound(format!("holding {id}")));
        }

        Ok(())
    }

    /// Delete a holding
    pub async fn delete_holding(&self, user_id: &str, id: i64) -> Result<(), PortfolioError> {
        let result = sqlx::query("DELETE FROM holdings WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(PortfolioError::NotFound(format!("holding {id}")));
        }

        Ok(())
    }
}

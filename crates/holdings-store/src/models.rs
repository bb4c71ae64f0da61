use chrono::NaiveDate;
use portfolio_core::Holding;
use serde::{Deserialize, Serialize};

/// One holdings row as persisted. The engine only ever sees the value
/// snapshot produced by `to_holding`, never a live record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HoldingRecord {
    pub id: Option<i64>,
    pub user_id: String,
    pub ticker: String,
    pub exchange: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: Option<String>,
    pub sector: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
}

impl HoldingRecord {
    pub fn to_holding(&self) -> Holding {
        Holding {
            ticker: self.ticker.clone(),
            exchange: self.exchange.clone(),
            shares: self.shares,
            purchase_price: self.purchase_price,
            purchase_date: self
                .purchase_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            sector: self.sector.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_holding_parses_date() {
        let record = HoldingRecord {
            id: Some(1),
            user_id: "u1".to_string(),
            ticker: "TCS".to_string(),
            exchange: "NSE".to_string(),
            shares: 10.0,
            purchase_price: 3000.0,
            purchase_date: Some("2024-06-15".to_string()),
            sector: Some("IT".to_string()),
            notes: None,
            created_at: None,
        };

        let holding = record.to_holding();
        assert_eq!(holding.ticker, "TCS");
        assert_eq!(
            holding.purchase_date,
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn test_to_holding_tolerates_bad_date() {
        let record = HoldingRecord {
            id: None,
            user_id: "u1".to_string(),
            ticker: "TCS".to_string(),
            exchange: "NSE".to_string(),
            shares: 10.0,
            purchase_price: 3000.0,
            purchase_date: Some("not-a-date".to_string()),
            sector: None,
            notes: None,
            created_at: None,
        };

        assert!(record.to_holding().purchase_date.is_none());
    }
}

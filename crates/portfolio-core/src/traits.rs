use crate::{PortfolioError, PriceMap};
use async_trait::async_trait;

/// Boundary to the external market data service. One call batches every
/// ticker the report needs; absent keys in the result mean "price
/// unknown", never zero.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_price_map(&self, tickers: &[String]) -> Result<PriceMap, PortfolioError>;
}

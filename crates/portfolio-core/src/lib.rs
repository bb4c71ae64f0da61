pub mod calendar;
pub mod correlation;
pub mod error;
pub mod models;
pub mod performance;
pub mod ranking;
pub mod report;
pub mod summary;
pub mod ticker;
pub mod traits;
pub mod valuation;

pub use calendar::{is_market_open, is_market_open_today};
pub use correlation::correlation_matrix;
pub use error::*;
pub use models::*;
pub use performance::{compute_performance, NIFTY_TICKER, SENSEX_TICKER};
pub use ranking::top_performers;
pub use report::compute_report;
pub use summary::compute_summary;
pub use ticker::normalize_ticker;
pub use traits::*;
pub use valuation::{valuate_holding, valuate_holdings};

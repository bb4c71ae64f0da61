use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid holding: {0}")]
    InvalidHolding(String),

    #[error("Holding already exists: {0}")]
    DuplicateHolding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

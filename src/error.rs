use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("No identities available in parent table {0}")]
    EmptyPool(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SeedResult<T> = Result<T, SeedError>;

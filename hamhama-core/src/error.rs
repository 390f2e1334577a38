use thiserror::Error;

/// Failure talking to the recipe database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Failed to get DB connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migration(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

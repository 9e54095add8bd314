//! CLI command implementations.

pub mod cart;

use rocket_cart::{ApiError, CartError, LoadError};
use thiserror::Error;

/// Errors that can end a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The API client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The persisted cart could not be loaded.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// The cart operation was not applied.
    #[error("{0}")]
    Rejected(#[from] CartError),
}

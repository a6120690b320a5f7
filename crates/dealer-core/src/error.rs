//! # Error Types
//!
//! Errors raised while constructing identifiers or converting documents.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier could not be parsed.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// A document did not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document serialized to something other than a JSON object.
    #[error("document for {0} is not a JSON object")]
    NotAnObject(&'static str),

    /// Review id space exhausted.
    #[error("review id overflow after {0}")]
    ReviewIdOverflow(i64),
}

/// Error parsing an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Not 24 hexadecimal digits.
    #[error("invalid store id: {0:?}")]
    InvalidStoreId(String),

    /// Neither a store id nor a number.
    #[error("invalid dealer id: {0:?}")]
    InvalidDealerId(String),
}

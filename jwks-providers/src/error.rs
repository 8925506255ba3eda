//! Enumerates errors of the key record and key set operations.

use thiserror::Error;

use jwks_crypto::CryptoProviderError;

#[derive(Debug, Error)]
pub enum JwkError {
    /// Malformed or semantically invalid input.
    #[error("Data error: {0}")]
    Data(String),
    /// Invalid use of the query operations.
    #[error("Operation error: {0}")]
    Operation(String),
    /// Provider failures, passed through unchanged.
    #[error("Crypto provider error: `{0}`")]
    CryptoProvider(#[from] CryptoProviderError),
}

impl JwkError {
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_operation_error(&self) -> bool {
        matches!(self, Self::Operation(_))
    }
}

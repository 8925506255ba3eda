use jwks_providers::error::JwkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeySetServiceError {
    #[error("Key set error: `{0}`")]
    JwkError(#[from] JwkError),
}

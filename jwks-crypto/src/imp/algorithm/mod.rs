//! Per-algorithm material handling used by [`CryptoProviderImpl`][super::CryptoProviderImpl].

use crate::{CryptoKey, CryptoProviderError, EncryptedData, GeneratedKey, JsonObject};

pub mod c20p;
pub mod es256;
pub mod hs256;

/// A single JWA algorithm.
///
/// Implementations only translate between JWK members and key material and run
/// the primitive. Usage and role checks are done by the provider.
#[cfg_attr(test, mockall::automock)]
pub trait JwaAlgorithm: Send + Sync {
    /// Key material from JWK members (`kty` and key parameters only).
    fn import(
        &self,
        jwk: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<CryptoKey, CryptoProviderError>;

    /// JWK key parameters of a handle, including `kty`.
    fn export(&self, key: &CryptoKey) -> Result<JsonObject, CryptoProviderError>;

    fn generate(
        &self,
        params: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<GeneratedKey, CryptoProviderError>;

    fn sign(&self, _key: &CryptoKey, _data: &[u8]) -> Result<Vec<u8>, CryptoProviderError> {
        Err(CryptoProviderError::NotSupported("sign".to_string()))
    }

    fn verify(
        &self,
        _key: &CryptoKey,
        _signature: &[u8],
        _data: &[u8],
    ) -> Result<bool, CryptoProviderError> {
        Err(CryptoProviderError::NotSupported("verify".to_string()))
    }

    fn encrypt(
        &self,
        _key: &CryptoKey,
        _data: &[u8],
        _aad: &[u8],
    ) -> Result<EncryptedData, CryptoProviderError> {
        Err(CryptoProviderError::NotSupported("encrypt".to_string()))
    }

    fn decrypt(
        &self,
        _key: &CryptoKey,
        _ciphertext: &[u8],
        _iv: &[u8],
        _tag: &[u8],
        _aad: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError> {
        Err(CryptoProviderError::NotSupported("decrypt".to_string()))
    }
}

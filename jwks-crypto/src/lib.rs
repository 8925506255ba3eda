//! Cryptographic operations on opaque key handles.
//!
//! This crate is the boundary between the JSON Web Key model and the actual
//! cryptography. Key material enters through [`CryptoProvider::import_key`] or
//! [`CryptoProvider::generate_key`] and is from then on only reachable through a
//! [`CryptoKey`] handle. It has been separated into its own crate so that the
//! algorithm implementations can be swapped or certified independently of the
//! key set model.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

pub mod imp;

/// A JSON object, as used for JWK members and generation parameters.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CryptoProviderError {
    #[error("Missing algorithm: `{0}`")]
    MissingAlgorithm(String),
    #[error("Invalid key data: `{0}`")]
    InvalidKeyData(String),
    #[error("Invalid access: `{0}`")]
    InvalidAccess(String),
    #[error("Not supported: `{0}`")]
    NotSupported(String),
    #[error("Could not generate key: `{0}`")]
    CouldNotGenerate(String),
    #[error("Could not sign: `{0}`")]
    CouldNotSign(String),
    #[error("Could not verify: `{0}`")]
    CouldNotVerify(String),
    #[error("Could not encrypt: `{0}`")]
    CouldNotEncrypt(String),
    #[error("Could not decrypt: `{0}`")]
    CouldNotDecrypt(String),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum HasherError {
    #[error("Could not hash")]
    CouldNotHash,
}

/// Role of a key handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Public,
    Private,
    Secret,
}

/// Opaque key handle produced by a [`CryptoProvider`].
///
/// The material is only interpreted by the provider that created the handle.
/// Handles are intentionally not `Clone`: a handle has exactly one owner.
pub struct CryptoKey {
    key_type: KeyType,
    algorithm: String,
    usages: Vec<String>,
    extractable: bool,
    material: Zeroizing<Vec<u8>>,
}

impl CryptoKey {
    pub fn new(
        key_type: KeyType,
        algorithm: impl Into<String>,
        usages: Vec<String>,
        extractable: bool,
        material: Vec<u8>,
    ) -> Self {
        Self {
            key_type,
            algorithm: algorithm.into(),
            usages,
            extractable,
            material: Zeroizing::new(material),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn usages(&self) -> &[String] {
        &self.usages
    }

    pub fn extractable(&self) -> bool {
        self.extractable
    }

    /// Whether `usage` (a `key_ops` value) was granted to this handle.
    pub fn allows(&self, usage: &str) -> bool {
        self.usages.iter().any(|granted| granted == usage)
    }

    pub(crate) fn material(&self) -> &[u8] {
        &self.material
    }

    pub(crate) fn with_usages(mut self, usages: Vec<String>) -> Self {
        self.usages = usages;
        self
    }
}

impl fmt::Debug for CryptoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoKey")
            .field("key_type", &self.key_type)
            .field("algorithm", &self.algorithm)
            .field("usages", &self.usages)
            .field("extractable", &self.extractable)
            .finish_non_exhaustive()
    }
}

/// Result of [`CryptoProvider::generate_key`].
#[derive(Debug)]
pub enum GeneratedKey {
    Pair {
        private_key: CryptoKey,
        public_key: CryptoKey,
    },
    Secret(CryptoKey),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Provides hashing.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Hasher: Send + Sync {
    /// Digest encoded as base64url without padding.
    fn hash_base64(&self, input: &[u8]) -> Result<String, HasherError>;

    fn hash(&self, input: &[u8]) -> Result<Vec<u8>, HasherError>;
}

/// Imports, exports and generates keys and runs algorithms against them.
///
/// Every operation is keyed by a JWA algorithm identifier (`ES256`, `HS256`, ...).
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Imports JWK members into a new handle.
    ///
    /// Usages are taken from `key_ops` (or derived from `use`), extractability
    /// from `ext`. Explicit `key_ops` the key's role cannot hold are rejected.
    async fn import_key(
        &self,
        algorithm: &str,
        jwk: &JsonObject,
    ) -> Result<CryptoKey, CryptoProviderError>;

    /// Exports a handle as JWK members, including `alg`, `key_ops` and `ext`.
    async fn export_key(&self, key: &CryptoKey) -> Result<JsonObject, CryptoProviderError>;

    /// Generates new key material. `params` may carry `key_ops`, `ext` and
    /// algorithm-specific parameters.
    async fn generate_key(
        &self,
        algorithm: &str,
        params: &JsonObject,
    ) -> Result<GeneratedKey, CryptoProviderError>;

    async fn sign(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        data: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError>;

    async fn verify(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, CryptoProviderError>;

    /// Authenticated encryption. An empty `aad` is equivalent to no additional data.
    async fn encrypt(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        data: &[u8],
        aad: &[u8],
    ) -> Result<EncryptedData, CryptoProviderError>;

    /// An empty `tag` means the tag is appended to `ciphertext`.
    async fn decrypt(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        ciphertext: &[u8],
        iv: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError>;
}

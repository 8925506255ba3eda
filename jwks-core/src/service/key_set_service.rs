use std::sync::Arc;

use jwks_crypto::{CryptoProvider, JsonObject};
use jwks_providers::{
    http_client::HttpClient,
    jwk::Jwk,
    jwk_set::{JwkSet, Params},
};
use serde_json::Value;

use super::error::KeySetServiceError;
use crate::model::KeyAlgorithmType;

/// Creates key sets and records wired to the configured crypto provider and
/// HTTP client.
pub struct KeySetService {
    pub crypto: Arc<dyn CryptoProvider>,
    pub http_client: Arc<dyn HttpClient>,
    pub params: Params,
}

impl KeySetService {
    pub fn new(
        crypto: Arc<dyn CryptoProvider>,
        http_client: Arc<dyn HttpClient>,
        params: Params,
    ) -> Self {
        Self {
            crypto,
            http_client,
            params,
        }
    }

    pub fn create_key_set(&self) -> JwkSet {
        JwkSet::new(self.crypto.clone(), self.http_client.clone(), self.params)
    }

    /// A key set carrying `metadata`; a `keys` member is ignored.
    pub fn key_set_from_metadata(&self, metadata: JsonObject) -> JwkSet {
        self.create_key_set().with_metadata(metadata)
    }

    pub fn key_set_from_keys(&self, keys: Vec<Jwk>) -> JwkSet {
        self.create_key_set().with_keys(keys)
    }

    /// Generates keys into a new key set.
    pub async fn generate_keys(&self, data: Value) -> Result<JwkSet, KeySetServiceError> {
        let mut key_set = self.create_key_set();
        let generated = key_set.generate_keys(data).await?;
        tracing::debug!(count = generated.len(), "generated key set");

        Ok(key_set)
    }

    /// Generates a keypair (or secret) with the default usages.
    pub async fn generate_key_pair(
        &self,
        algorithm: KeyAlgorithmType,
    ) -> Result<JwkSet, KeySetServiceError> {
        self.generate_keys(Value::String(algorithm.to_string())).await
    }

    /// Imports keys into a new key set.
    pub async fn import_keys(&self, data: Value) -> Result<JwkSet, KeySetServiceError> {
        let mut key_set = self.create_key_set();
        let imported = key_set.import_keys(data).await?;
        tracing::debug!(count = imported.len(), "imported key set");

        Ok(key_set)
    }

    /// Imports a single key record outside any key set.
    pub async fn import_key(
        &self,
        data: Value,
        options: Option<JsonObject>,
    ) -> Result<Jwk, KeySetServiceError> {
        Ok(Jwk::import_key(self.crypto.clone(), data, options, self.params.kid_policy).await?)
    }
}

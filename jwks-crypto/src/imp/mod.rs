use std::{collections::HashMap, sync::Arc};

use serde_json::{json, Value};

use crate::{
    CryptoKey, CryptoProvider, CryptoProviderError, EncryptedData, GeneratedKey, JsonObject,
    KeyType,
};

pub mod algorithm;
pub mod hasher;
pub mod utilities;

use algorithm::JwaAlgorithm;


const PRIVATE_USAGES: [&str; 5] = ["sign", "decrypt", "unwrapKey", "deriveKey", "deriveBits"];
const PUBLIC_USAGES: [&str; 3] = ["verify", "encrypt", "wrapKey"];

#[derive(Clone)]
pub struct CryptoProviderImpl {
    algorithms: HashMap<String, Arc<dyn JwaAlgorithm>>,
}

impl CryptoProviderImpl {
    pub fn new(algorithms: HashMap<String, Arc<dyn JwaAlgorithm>>) -> Self {
        Self { algorithms }
    }

    fn get_algorithm(&self, algorithm: &str) -> Result<Arc<dyn JwaAlgorithm>, CryptoProviderError> {
        Ok(self
            .algorithms
            .get(algorithm)
            .ok_or(CryptoProviderError::MissingAlgorithm(algorithm.to_owned()))?
            .clone())
    }

    /// Resolves the algorithm for an operation on `key`, checking that the handle
    /// belongs to it and was granted `usage`.
    fn authorize(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        usage: &str,
    ) -> Result<Arc<dyn JwaAlgorithm>, CryptoProviderError> {
        if key.algorithm() != algorithm {
            return Err(CryptoProviderError::InvalidAccess(format!(
                "key is bound to `{}`, not `{algorithm}`",
                key.algorithm()
            )));
        }
        if !key.allows(usage) {
            return Err(CryptoProviderError::InvalidAccess(format!(
                "key usages do not permit `{usage}`"
            )));
        }
        self.get_algorithm(algorithm)
    }
}

/// Usages a key of the given role may hold.
pub fn usages_for_role(key_type: KeyType, requested: &[String]) -> Vec<String> {
    requested
        .iter()
        .filter(|usage| match key_type {
            KeyType::Private => PRIVATE_USAGES.contains(&usage.as_str()),
            KeyType::Public => PUBLIC_USAGES.contains(&usage.as_str()),
            KeyType::Secret => true,
        })
        .cloned()
        .collect()
}

fn requested_usages(jwk: &JsonObject) -> Result<Vec<String>, CryptoProviderError> {
    match jwk.get("key_ops") {
        Some(Value::Array(ops)) => ops
            .iter()
            .map(|op| {
                op.as_str().map(str::to_owned).ok_or_else(|| {
                    CryptoProviderError::InvalidKeyData("`key_ops` must hold strings".to_string())
                })
            })
            .collect(),
        Some(_) => Err(CryptoProviderError::InvalidKeyData(
            "`key_ops` must be an array".to_string(),
        )),
        None => Ok(match jwk.get("use").and_then(Value::as_str) {
            Some("sig") => vec!["sign".to_string(), "verify".to_string()],
            Some("enc") => ["encrypt", "decrypt", "wrapKey", "unwrapKey"]
                .map(str::to_owned)
                .to_vec(),
            _ => vec![],
        }),
    }
}

fn requested_extractable(jwk: &JsonObject) -> bool {
    jwk.get("ext").and_then(Value::as_bool).unwrap_or(true)
}

#[async_trait::async_trait]
impl CryptoProvider for CryptoProviderImpl {
    async fn import_key(
        &self,
        algorithm: &str,
        jwk: &JsonObject,
    ) -> Result<CryptoKey, CryptoProviderError> {
        let implementation = self.get_algorithm(algorithm)?;
        let usages = requested_usages(jwk)?;

        let key = implementation.import(jwk, usages, requested_extractable(jwk))?;
        let usages = usages_for_role(key.key_type(), key.usages());
        if jwk.contains_key("key_ops") && usages.len() != key.usages().len() {
            return Err(CryptoProviderError::InvalidKeyData(format!(
                "`key_ops` {:?} not permitted for a {:?} key",
                key.usages(),
                key.key_type()
            )));
        }
        Ok(key.with_usages(usages))
    }

    async fn export_key(&self, key: &CryptoKey) -> Result<JsonObject, CryptoProviderError> {
        if !key.extractable() {
            return Err(CryptoProviderError::InvalidAccess(
                "key is not extractable".to_string(),
            ));
        }
        let implementation = self.get_algorithm(key.algorithm())?;

        let mut jwk = implementation.export(key)?;
        jwk.insert("alg".to_string(), json!(key.algorithm()));
        jwk.insert("key_ops".to_string(), json!(key.usages()));
        jwk.insert("ext".to_string(), json!(key.extractable()));
        Ok(jwk)
    }

    async fn generate_key(
        &self,
        algorithm: &str,
        params: &JsonObject,
    ) -> Result<GeneratedKey, CryptoProviderError> {
        tracing::debug!(algorithm, "generating key");
        let implementation = self.get_algorithm(algorithm)?;
        let usages = requested_usages(params)?;

        Ok(
            match implementation.generate(params, usages.clone(), requested_extractable(params))? {
                GeneratedKey::Pair {
                    private_key,
                    public_key,
                } => GeneratedKey::Pair {
                    private_key: private_key
                        .with_usages(usages_for_role(KeyType::Private, &usages)),
                    public_key: public_key.with_usages(usages_for_role(KeyType::Public, &usages)),
                },
                secret @ GeneratedKey::Secret(_) => secret,
            },
        )
    }

    async fn sign(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        data: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError> {
        self.authorize(algorithm, key, "sign")?.sign(key, data)
    }

    async fn verify(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, CryptoProviderError> {
        self.authorize(algorithm, key, "verify")?
            .verify(key, signature, data)
    }

    async fn encrypt(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        data: &[u8],
        aad: &[u8],
    ) -> Result<EncryptedData, CryptoProviderError> {
        self.authorize(algorithm, key, "encrypt")?
            .encrypt(key, data, aad)
    }

    async fn decrypt(
        &self,
        algorithm: &str,
        key: &CryptoKey,
        ciphertext: &[u8],
        iv: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError> {
        self.authorize(algorithm, key, "decrypt")?
            .decrypt(key, ciphertext, iv, tag, aad)
    }
}

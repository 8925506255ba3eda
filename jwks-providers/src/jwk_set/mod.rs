//! JSON Web Key Sets.
//!
//! A [`JwkSet`] holds an ordered list of key records plus free-form
//! metadata. Records enter the set only through [`JwkSet::import_keys`] and
//! [`JwkSet::generate_keys`] (or the constructors) and are never changed in
//! place afterwards.
//!
//! Imports and generations are resolved first and appended afterwards: if any
//! part of a request fails, the set is left untouched.

use std::sync::Arc;

use jwks_crypto::{CryptoProvider, KeyType};
use serde_json::Value;

use crate::{
    common_models::JsonObject,
    error::JwkError,
    http_client::HttpClient,
    jwk::Jwk,
};

pub mod generate;
pub mod import;
pub mod model;
pub mod query;


pub use model::{Keys, Params};
use model::Resolved;
use query::Predicate;

pub struct JwkSet {
    keys: Vec<Arc<Jwk>>,
    metadata: JsonObject,
    crypto: Arc<dyn CryptoProvider>,
    http_client: Arc<dyn HttpClient>,
    params: Params,
}

impl JwkSet {
    pub fn new(
        crypto: Arc<dyn CryptoProvider>,
        http_client: Arc<dyn HttpClient>,
        params: Params,
    ) -> Self {
        Self {
            keys: vec![],
            metadata: JsonObject::new(),
            crypto,
            http_client,
            params,
        }
    }

    /// Takes ownership of already constructed records.
    pub fn with_keys(mut self, keys: Vec<Jwk>) -> Self {
        self.keys = keys.into_iter().map(Arc::new).collect();
        self
    }

    /// Copies `metadata` onto the set. A `keys` member is not metadata and is
    /// dropped.
    pub fn with_metadata(mut self, mut metadata: JsonObject) -> Self {
        if metadata.remove("keys").is_some() {
            tracing::warn!("ignoring `keys` member passed as key set metadata");
        }
        self.metadata = metadata;
        self
    }

    pub fn keys(&self) -> &[Arc<Jwk>] {
        &self.keys
    }

    pub fn metadata(&self) -> &JsonObject {
        &self.metadata
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Protected header for `jwk` under this set's header policy.
    pub fn protected_header(
        &self,
        jwk: &Jwk,
        extra: Option<JsonObject>,
    ) -> Result<JsonObject, JwkError> {
        jwk.protected_header(extra, self.params.header_policy)
    }

    pub fn filter(&self, predicate: &Predicate) -> Result<Vec<Arc<Jwk>>, JwkError> {
        let mut matched = vec![];
        for jwk in &self.keys {
            if predicate.matches(jwk)? {
                matched.push(jwk.clone());
            }
        }
        Ok(matched)
    }

    pub fn find(&self, predicate: &Predicate) -> Result<Option<Arc<Jwk>>, JwkError> {
        for jwk in &self.keys {
            if predicate.matches(jwk)? {
                return Ok(Some(jwk.clone()));
            }
        }
        Ok(None)
    }

    /// Records whose bound handle is a public key.
    pub fn public_keys(&self) -> Vec<Arc<Jwk>> {
        self.keys
            .iter()
            .filter(|jwk| jwk.key_type() == Some(KeyType::Public))
            .cloned()
            .collect()
    }

    /// The whole set as JWKS JSON, private records included.
    pub fn export_keys(&self) -> Result<String, JwkError> {
        self.document(&self.keys)
    }

    /// The set restricted to public records, safe to publish.
    pub fn public_jwks(&self) -> Result<String, JwkError> {
        self.document(&self.public_keys())
    }

    fn document(&self, keys: &[Arc<Jwk>]) -> Result<String, JwkError> {
        let mut document = self.metadata.clone();
        document.insert(
            "keys".to_string(),
            Value::Array(
                keys.iter()
                    .map(|jwk| Value::Object(jwk.to_json_object()))
                    .collect(),
            ),
        );

        serde_json::to_string(&document).map_err(|err| JwkError::Data(err.to_string()))
    }

    fn commit(&mut self, resolved: Resolved) -> Keys {
        match resolved {
            Resolved::Key(jwk) => {
                let jwk = Arc::new(jwk);
                self.keys.push(jwk.clone());
                Keys::One(jwk)
            }
            Resolved::Many(items) => {
                Keys::Many(items.into_iter().map(|item| self.commit(item)).collect())
            }
            Resolved::KeySet { metadata, keys } => {
                self.metadata.extend(metadata);
                self.commit(*keys)
            }
        }
    }
}

use futures::{
    future::{try_join_all, BoxFuture},
    FutureExt,
};
use jwks_crypto::{CryptoKey, GeneratedKey};
use serde_json::{json, Value};

use super::{model::Resolved, JwkSet, Keys};
use crate::{
    common_models::JsonObject,
    error::JwkError,
    jwk::{thumbprint::thumbprint, Jwk},
};

const DEFAULT_KEY_OPS: [&str; 2] = ["sign", "verify"];

/// Shape of a generation request.
#[derive(Debug, PartialEq)]
pub enum GenerateRequest {
    List(Vec<Value>),
    /// Algorithm identifier, generated with the default usages.
    Algorithm(String),
    /// `alg` plus generation parameters forwarded to the crypto provider.
    Descriptor { alg: String, params: JsonObject },
}

impl GenerateRequest {
    pub fn classify(data: Value) -> Result<Self, JwkError> {
        match data {
            Value::Array(items) => Ok(Self::List(items)),
            Value::String(alg) if !alg.is_empty() => Ok(Self::Algorithm(alg)),
            Value::Object(mut params) => match params.remove("alg") {
                Some(Value::String(alg)) if !alg.is_empty() => {
                    Ok(Self::Descriptor { alg, params })
                }
                _ => Err(JwkError::Data(
                    "key descriptor requires `alg`".to_string(),
                )),
            },
            _ => Err(JwkError::Data("invalid input".to_string())),
        }
    }
}

impl JwkSet {
    /// Generates keys for an algorithm identifier, a key descriptor or a list
    /// of these.
    ///
    /// Each generation yields `[private, public]` sharing one `kid`, or
    /// `[secret]` for symmetric algorithms.
    pub async fn generate_keys(&mut self, data: Value) -> Result<Keys, JwkError> {
        let resolved = self.resolve_generation(data).await?;
        Ok(self.commit(resolved))
    }

    fn resolve_generation(&self, data: Value) -> BoxFuture<'_, Result<Resolved, JwkError>> {
        async move {
            match GenerateRequest::classify(data)? {
                GenerateRequest::List(items) => {
                    let resolved = try_join_all(
                        items.into_iter().map(|item| self.resolve_generation(item)),
                    )
                    .await?;
                    Ok(Resolved::Many(resolved))
                }
                GenerateRequest::Algorithm(alg) => self.generate(&alg, JsonObject::new()).await,
                GenerateRequest::Descriptor { alg, params } => self.generate(&alg, params).await,
            }
        }
        .boxed()
    }

    async fn generate(&self, alg: &str, mut params: JsonObject) -> Result<Resolved, JwkError> {
        params
            .entry("key_ops")
            .or_insert_with(|| json!(DEFAULT_KEY_OPS));
        let kid = match params.remove("kid") {
            None => None,
            Some(Value::String(kid)) if !kid.is_empty() => Some(kid),
            Some(_) => {
                return Err(JwkError::Data(
                    "`kid` must be a non-empty string".to_string(),
                ))
            }
        };

        tracing::debug!(algorithm = alg, "generating keys");

        match self.crypto.generate_key(alg, &params).await? {
            GeneratedKey::Pair {
                private_key,
                public_key,
            } => {
                let public = self.crypto.export_key(&public_key).await?;
                let options = kid_options(kid, &public)?;

                let private_jwk = Jwk::from_crypto_key(
                    self.crypto.clone(),
                    private_key,
                    Some(options.clone()),
                    self.params.kid_policy,
                )
                .await?;
                let public_jwk = self.bound(public, public_key, options)?;

                Ok(Resolved::Many(vec![
                    Resolved::Key(private_jwk),
                    Resolved::Key(public_jwk),
                ]))
            }
            GeneratedKey::Secret(secret_key) => {
                let secret = self.crypto.export_key(&secret_key).await?;
                let options = kid_options(kid, &secret)?;
                let secret_jwk = self.bound(secret, secret_key, options)?;

                Ok(Resolved::Many(vec![Resolved::Key(secret_jwk)]))
            }
        }
    }

    fn bound(
        &self,
        exported: JsonObject,
        crypto_key: CryptoKey,
        options: JsonObject,
    ) -> Result<Jwk, JwkError> {
        Ok(Jwk::new(
            Value::Object(exported),
            Some(options),
            self.params.kid_policy,
        )?
        .bind(self.crypto.clone(), crypto_key))
    }
}

/// The `kid` shared by every record of one generation.
fn kid_options(kid: Option<String>, exported: &JsonObject) -> Result<JsonObject, JwkError> {
    let kid = match kid {
        Some(kid) => kid,
        None => thumbprint(exported)?,
    };

    let mut options = JsonObject::new();
    options.insert("kid".to_string(), json!(kid));
    Ok(options)
}

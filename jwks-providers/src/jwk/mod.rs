//! The key record: one validated JSON Web Key, optionally bound to a crypto
//! provider handle.
//!
//! A record is built from JWK members (an object or its JSON text) merged
//! with construction options. It always carries `kty`, `alg` and `kid`; how
//! a missing `kid` is handled is decided by [`KidPolicy`]. The provider handle
//! is attached once, by [`Jwk::import_key`] or [`Jwk::from_crypto_key`], and
//! never serialized.

use std::{fmt, sync::Arc};

use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use jwks_crypto::{CryptoKey, CryptoProvider, KeyType};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{json, Value};

use crate::{
    common_models::{JsonObject, KeyUse, Kty},
    error::JwkError,
};

pub mod header;
pub mod model;
pub mod thumbprint;

#[cfg(test)]
mod test;

pub use model::{EncryptedOutput, HeaderPolicy, KidPolicy};
use thumbprint::thumbprint;

struct KeyBinding {
    crypto_key: CryptoKey,
    provider: Arc<dyn CryptoProvider>,
}

pub struct Jwk {
    kty: Kty,
    alg: String,
    kid: String,
    /// Every member other than `kty`, `alg` and `kid`.
    members: JsonObject,
    binding: Option<KeyBinding>,
}

/// Merges construction options into JWK data.
///
/// A member present in both with different values is rejected, a member
/// present in only one of them is adopted.
pub fn merge_members(
    mut data: JsonObject,
    options: Option<JsonObject>,
) -> Result<JsonObject, JwkError> {
    for (name, value) in options.unwrap_or_default() {
        match data.get(&name) {
            Some(existing) if existing != &value => {
                return Err(JwkError::Data(format!(
                    "conflicting `{name}` between data and options"
                )));
            }
            Some(_) => {}
            None => {
                data.insert(name, value);
            }
        }
    }
    Ok(data)
}

fn parse_data(data: Value) -> Result<JsonObject, JwkError> {
    let data = match data {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|_| JwkError::Data("invalid JWK JSON string".to_string()))?,
        other => other,
    };

    match data {
        Value::Object(members) => Ok(members),
        _ => Err(JwkError::Data("JWK must be a JSON object".to_string())),
    }
}

fn required_string(members: &JsonObject, name: &str) -> Result<String, JwkError> {
    match members.get(name) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(JwkError::Data(format!("`{name}` must be a non-empty string"))),
        None => Err(JwkError::Data(format!("missing `{name}`"))),
    }
}

fn validate_usage(members: &JsonObject) -> Result<(), JwkError> {
    let key_use = members.get("use");
    let key_ops = members.get("key_ops");

    if let Some(key_use) = key_use {
        key_use
            .as_str()
            .and_then(|key_use| key_use.parse::<KeyUse>().ok())
            .ok_or_else(|| JwkError::Data(format!("invalid `use` {key_use}")))?;
    }

    if let Some(key_ops) = key_ops {
        let valid = key_ops
            .as_array()
            .is_some_and(|ops| ops.iter().all(Value::is_string));
        if !valid {
            return Err(JwkError::Data(
                "`key_ops` must be an array of strings".to_string(),
            ));
        }
    }

    if key_use.is_none() && key_ops.is_none() {
        return Err(JwkError::Data(
            "one of `key_ops` or `use` is required".to_string(),
        ));
    }

    Ok(())
}

pub(crate) fn encode_base64url(bytes: &[u8]) -> Result<String, JwkError> {
    Base64UrlSafeNoPadding::encode_to_string(bytes).map_err(|err| JwkError::Data(err.to_string()))
}

pub(crate) fn decode_base64url(name: &str, value: &str) -> Result<Vec<u8>, JwkError> {
    Base64UrlSafeNoPadding::decode_to_vec(value, None)
        .map_err(|_| JwkError::Data(format!("`{name}` is not valid base64url")))
}

impl Jwk {
    /// Validates `data` (a JSON object or its JSON text) merged with `options`.
    ///
    /// The result is not bound to any crypto handle.
    pub fn new(
        data: Value,
        options: Option<JsonObject>,
        kid_policy: KidPolicy,
    ) -> Result<Self, JwkError> {
        let mut members = merge_members(parse_data(data)?, options)?;

        let kty = members
            .get("kty")
            .and_then(Value::as_str)
            .ok_or_else(|| JwkError::Data("missing `kty`".to_string()))?;
        let kty = kty
            .parse::<Kty>()
            .map_err(|_| JwkError::Data(format!("unsupported kty `{kty}`")))?;
        let alg = required_string(&members, "alg")?;
        validate_usage(&members)?;

        let kid = match (members.get("kid"), kid_policy) {
            (Some(_), _) => required_string(&members, "kid")?,
            (None, KidPolicy::Strict) => return Err(JwkError::Data("missing `kid`".to_string())),
            (None, KidPolicy::Thumbprint) => {
                let kid = thumbprint(&members)?;
                tracing::debug!(%kid, "derived kid from thumbprint");
                kid
            }
        };

        for name in ["kty", "alg", "kid"] {
            members.remove(name);
        }

        Ok(Self {
            kty,
            alg,
            kid,
            members,
            binding: None,
        })
    }

    /// Validates the data and imports the key material into `provider`.
    pub async fn import_key(
        provider: Arc<dyn CryptoProvider>,
        data: Value,
        options: Option<JsonObject>,
        kid_policy: KidPolicy,
    ) -> Result<Self, JwkError> {
        let jwk = Self::new(data, options, kid_policy)?;
        let crypto_key = provider
            .import_key(&jwk.alg, &jwk.to_json_object())
            .await?;

        Ok(jwk.bind(provider, crypto_key))
    }

    /// Builds a record from an existing handle, binding that same handle.
    pub async fn from_crypto_key(
        provider: Arc<dyn CryptoProvider>,
        crypto_key: CryptoKey,
        options: Option<JsonObject>,
        kid_policy: KidPolicy,
    ) -> Result<Self, JwkError> {
        let exported = provider.export_key(&crypto_key).await?;
        let jwk = Self::new(Value::Object(exported), options, kid_policy)?;

        Ok(jwk.bind(provider, crypto_key))
    }

    pub(crate) fn bind(mut self, provider: Arc<dyn CryptoProvider>, crypto_key: CryptoKey) -> Self {
        self.binding = Some(KeyBinding {
            crypto_key,
            provider,
        });
        self
    }

    pub fn kty(&self) -> Kty {
        self.kty
    }

    pub fn alg(&self) -> &str {
        &self.alg
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn key_use(&self) -> Option<KeyUse> {
        self.members
            .get("use")
            .and_then(Value::as_str)
            .and_then(|key_use| key_use.parse().ok())
    }

    pub fn key_ops(&self) -> Vec<&str> {
        self.members
            .get("key_ops")
            .and_then(Value::as_array)
            .map(|ops| ops.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// A member other than `kty`, `alg` and `kid`.
    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Any member of the JWK, by name.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "kty" => Some(json!(self.kty.as_ref())),
            "alg" => Some(json!(self.alg)),
            "kid" => Some(json!(self.kid)),
            _ => self.members.get(name).cloned(),
        }
    }

    pub fn crypto_key(&self) -> Option<&CryptoKey> {
        self.binding.as_ref().map(|binding| &binding.crypto_key)
    }

    /// Role of the bound handle.
    pub fn key_type(&self) -> Option<KeyType> {
        self.crypto_key().map(CryptoKey::key_type)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn to_json_object(&self) -> JsonObject {
        let mut object = self.members.clone();
        object.insert("kty".to_string(), json!(self.kty.as_ref()));
        object.insert("alg".to_string(), json!(self.alg));
        object.insert("kid".to_string(), json!(self.kid));
        object
    }

    pub fn thumbprint(&self) -> Result<String, JwkError> {
        thumbprint(&self.to_json_object())
    }

    fn binding(&self) -> Result<&KeyBinding, JwkError> {
        self.binding
            .as_ref()
            .ok_or_else(|| JwkError::Data("key is not imported".to_string()))
    }

    /// Signs `message`, returning the base64url encoded signature.
    pub async fn sign(&self, message: &[u8]) -> Result<String, JwkError> {
        let binding = self.binding()?;
        let signature = binding
            .provider
            .sign(&self.alg, &binding.crypto_key, message)
            .await?;

        encode_base64url(&signature)
    }

    pub async fn verify(&self, message: &[u8], signature: &str) -> Result<bool, JwkError> {
        let binding = self.binding()?;
        let signature = decode_base64url("signature", signature)?;

        Ok(binding
            .provider
            .verify(&self.alg, &binding.crypto_key, &signature, message)
            .await?)
    }

    pub async fn encrypt(
        &self,
        message: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<EncryptedOutput, JwkError> {
        let binding = self.binding()?;
        let encrypted = binding
            .provider
            .encrypt(
                &self.alg,
                &binding.crypto_key,
                message,
                aad.unwrap_or_default(),
            )
            .await?;

        Ok(EncryptedOutput {
            iv: encode_base64url(&encrypted.iv)?,
            ciphertext: encode_base64url(&encrypted.ciphertext)?,
            tag: encode_base64url(&encrypted.tag)?,
            aad: aad.map(encode_base64url).transpose()?,
        })
    }

    /// Decrypts base64url encoded input. Without `tag` the tag is expected
    /// at the end of `ciphertext`.
    pub async fn decrypt(
        &self,
        ciphertext: &str,
        iv: &str,
        tag: Option<&str>,
        aad: Option<&str>,
    ) -> Result<Vec<u8>, JwkError> {
        let binding = self.binding()?;
        let ciphertext = decode_base64url("ciphertext", ciphertext)?;
        let iv = decode_base64url("iv", iv)?;
        let tag = tag
            .map(|tag| decode_base64url("tag", tag))
            .transpose()?
            .unwrap_or_default();
        let aad = aad
            .map(|aad| decode_base64url("aad", aad))
            .transpose()?
            .unwrap_or_default();

        Ok(binding
            .provider
            .decrypt(&self.alg, &binding.crypto_key, &ciphertext, &iv, &tag, &aad)
            .await?)
    }
}

impl PartialEq for Jwk {
    fn eq(&self, other: &Self) -> bool {
        self.kty == other.kty
            && self.alg == other.alg
            && self.kid == other.kid
            && self.members == other.members
    }
}

impl Serialize for Jwk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len() + 3))?;
        map.serialize_entry("kty", &self.kty)?;
        map.serialize_entry("alg", &self.alg)?;
        map.serialize_entry("kid", &self.kid)?;
        for (name, value) in &self.members {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("alg", &self.alg)
            .field("kid", &self.kid)
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("key_type", &self.key_type())
            .finish()
    }
}

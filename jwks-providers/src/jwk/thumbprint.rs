//! RFC 7638 JWK thumbprints.

use std::collections::BTreeMap;

use jwks_crypto::{imp::hasher::sha256::SHA256, Hasher};
use serde_json::Value;

use crate::{
    common_models::{JsonObject, Kty},
    error::JwkError,
};

/// Computes the thumbprint of a JWK given as JSON members.
///
/// Only the required members of the key type take part, serialized in
/// lexicographic order without whitespace, hashed with SHA-256 and encoded
/// as base64url without padding.
pub fn thumbprint(jwk: &JsonObject) -> Result<String, JwkError> {
    let kty = jwk
        .get("kty")
        .and_then(Value::as_str)
        .and_then(|kty| kty.parse::<Kty>().ok())
        .ok_or_else(|| JwkError::Data("invalid kty".to_string()))?;

    let canonical = kty
        .thumbprint_members()
        .iter()
        .map(|name| {
            let value = jwk.get(*name).and_then(Value::as_str).ok_or_else(|| {
                JwkError::Data(format!("thumbprint requires member `{name}`"))
            })?;
            Ok((*name, value))
        })
        .collect::<Result<BTreeMap<&str, &str>, JwkError>>()?;

    let serialized =
        serde_json::to_vec(&canonical).map_err(|err| JwkError::Data(err.to_string()))?;

    SHA256 {}
        .hash_base64(&serialized)
        .map_err(|err| JwkError::Data(err.to_string()))
}

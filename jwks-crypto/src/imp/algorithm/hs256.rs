//! HMAC using SHA-256.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use super::JwaAlgorithm;
use crate::{
    imp::utilities::{
        decode_base64url, encode_base64url, expect_kty, generate_random_bytes, required_member,
    },
    CryptoKey, CryptoProviderError, GeneratedKey, JsonObject, KeyType,
};

pub const HS256: &str = "HS256";

const DEFAULT_KEY_LENGTH_BITS: u64 = 256;
const MAX_KEY_LENGTH_BITS: u64 = 8192;

type HmacSha256 = Hmac<Sha256>;

pub struct Hs256;

impl Hs256 {
    fn mac(key: &CryptoKey) -> Result<HmacSha256, CryptoProviderError> {
        HmacSha256::new_from_slice(key.material())
            .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))
    }
}

impl JwaAlgorithm for Hs256 {
    fn import(
        &self,
        jwk: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<CryptoKey, CryptoProviderError> {
        expect_kty(jwk, "oct")?;
        let secret = decode_base64url(required_member(jwk, "k")?)?;
        if secret.is_empty() {
            return Err(CryptoProviderError::InvalidKeyData(
                "empty HMAC key".to_string(),
            ));
        }

        Ok(CryptoKey::new(
            KeyType::Secret,
            HS256,
            usages,
            extractable,
            secret,
        ))
    }

    fn export(&self, key: &CryptoKey) -> Result<JsonObject, CryptoProviderError> {
        let mut jwk = JsonObject::new();
        jwk.insert("kty".to_string(), json!("oct"));
        jwk.insert("k".to_string(), json!(encode_base64url(key.material())?));
        Ok(jwk)
    }

    fn generate(
        &self,
        params: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<GeneratedKey, CryptoProviderError> {
        let bits = match params.get("length") {
            None => DEFAULT_KEY_LENGTH_BITS,
            Some(length) => length.as_u64().ok_or_else(|| {
                CryptoProviderError::CouldNotGenerate("`length` must be a number".to_string())
            })?,
        };
        if bits == 0 || bits % 8 != 0 || bits > MAX_KEY_LENGTH_BITS {
            return Err(CryptoProviderError::CouldNotGenerate(format!(
                "invalid HMAC key length {bits}"
            )));
        }

        Ok(GeneratedKey::Secret(CryptoKey::new(
            KeyType::Secret,
            HS256,
            usages,
            extractable,
            generate_random_bytes((bits / 8) as usize),
        )))
    }

    fn sign(&self, key: &CryptoKey, data: &[u8]) -> Result<Vec<u8>, CryptoProviderError> {
        let mut mac = Self::mac(key)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(
        &self,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, CryptoProviderError> {
        let mut mac = Self::mac(key)?;
        mac.update(data);
        Ok(mac.verify_slice(signature).is_ok())
    }
}

//! ChaCha20-Poly1305 authenticated encryption with a 256-bit key.

use chacha20poly1305::{
    aead::{Aead, Payload},
    AeadCore, ChaCha20Poly1305, KeyInit, Nonce,
};
use rand::rngs::OsRng;
use serde_json::json;

use super::JwaAlgorithm;
use crate::{
    imp::utilities::{
        decode_base64url, encode_base64url, expect_kty, generate_random_bytes, required_member,
    },
    CryptoKey, CryptoProviderError, EncryptedData, GeneratedKey, JsonObject, KeyType,
};

pub const C20P: &str = "C20P";

const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

pub struct C20p;

impl C20p {
    fn cipher(key: &CryptoKey) -> Result<ChaCha20Poly1305, CryptoProviderError> {
        ChaCha20Poly1305::new_from_slice(key.material())
            .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))
    }
}

impl JwaAlgorithm for C20p {
    fn import(
        &self,
        jwk: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<CryptoKey, CryptoProviderError> {
        expect_kty(jwk, "oct")?;
        let secret = decode_base64url(required_member(jwk, "k")?)?;
        if secret.len() != KEY_LENGTH {
            return Err(CryptoProviderError::InvalidKeyData(format!(
                "C20P key must be {KEY_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        Ok(CryptoKey::new(
            KeyType::Secret,
            C20P,
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
        _params: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<GeneratedKey, CryptoProviderError> {
        Ok(GeneratedKey::Secret(CryptoKey::new(
            KeyType::Secret,
            C20P,
            usages,
            extractable,
            generate_random_bytes(KEY_LENGTH),
        )))
    }

    fn encrypt(
        &self,
        key: &CryptoKey,
        data: &[u8],
        aad: &[u8],
    ) -> Result<EncryptedData, CryptoProviderError> {
        let cipher = Self::cipher(key)?;
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let mut ciphertext = cipher
            .encrypt(&nonce, Payload { msg: data, aad })
            .map_err(|err| CryptoProviderError::CouldNotEncrypt(err.to_string()))?;
        let tag = ciphertext.split_off(ciphertext.len() - TAG_LENGTH);

        Ok(EncryptedData {
            iv: nonce.to_vec(),
            ciphertext,
            tag,
        })
    }

    fn decrypt(
        &self,
        key: &CryptoKey,
        ciphertext: &[u8],
        iv: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoProviderError> {
        if iv.len() != NONCE_LENGTH {
            return Err(CryptoProviderError::CouldNotDecrypt(format!(
                "iv must be {NONCE_LENGTH} bytes, got {}",
                iv.len()
            )));
        }
        let cipher = Self::cipher(key)?;
        let sealed = [ciphertext, tag].concat();

        cipher
            .decrypt(
                Nonce::from_slice(iv),
                Payload {
                    msg: &sealed,
                    aad,
                },
            )
            .map_err(|err| CryptoProviderError::CouldNotDecrypt(err.to_string()))
    }
}

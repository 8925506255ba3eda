use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{CryptoProviderError, JsonObject};

pub fn generate_random_bytes(length: usize) -> Vec<u8> {
    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes = vec![0u8; length];
    rng.fill_bytes(&mut bytes);
    bytes
}

pub fn encode_base64url(input: &[u8]) -> Result<String, CryptoProviderError> {
    Base64UrlSafeNoPadding::encode_to_string(input)
        .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))
}

pub fn decode_base64url(input: &str) -> Result<Vec<u8>, CryptoProviderError> {
    Base64UrlSafeNoPadding::decode_to_vec(input, None)
        .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))
}

/// Reads a required string member of a JWK.
pub fn required_member<'a>(jwk: &'a JsonObject, name: &str) -> Result<&'a str, CryptoProviderError> {
    jwk.get(name)
        .and_then(|value| value.as_str())
        .ok_or_else(|| CryptoProviderError::InvalidKeyData(format!("missing `{name}`")))
}

/// Fails unless the JWK `kty` equals `expected`.
pub fn expect_kty(jwk: &JsonObject, expected: &str) -> Result<(), CryptoProviderError> {
    let kty = required_member(jwk, "kty")?;
    if kty != expected {
        return Err(CryptoProviderError::InvalidKeyData(format!(
            "expected kty `{expected}`, got `{kty}`"
        )));
    }
    Ok(())
}

//! ECDSA using P-256 and SHA-256.

use p256::{
    ecdsa::{
        signature::{Signer as _, Verifier as _},
        Signature, SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
    PublicKey, SecretKey,
};
use serde_json::Value;

use super::JwaAlgorithm;
use crate::{
    imp::utilities::expect_kty, CryptoKey, CryptoProviderError, GeneratedKey, JsonObject, KeyType,
};

pub const ES256: &str = "ES256";

const EC_MEMBERS: [&str; 5] = ["kty", "crv", "x", "y", "d"];

pub struct Es256;

impl Es256 {
    fn ec_members(jwk: &JsonObject) -> JsonObject {
        jwk.iter()
            .filter(|(name, _)| EC_MEMBERS.contains(&name.as_str()))
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect()
    }

    fn to_object(value: Value) -> Result<JsonObject, CryptoProviderError> {
        match value {
            Value::Object(object) => Ok(object),
            _ => Err(CryptoProviderError::InvalidKeyData(
                "EC JWK did not serialize to an object".to_string(),
            )),
        }
    }
}

impl JwaAlgorithm for Es256 {
    fn import(
        &self,
        jwk: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<CryptoKey, CryptoProviderError> {
        expect_kty(jwk, "EC")?;
        let members = serde_json::to_string(&Self::ec_members(jwk))
            .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))?;

        if jwk.contains_key("d") {
            let secret_key = SecretKey::from_jwk_str(&members).map_err(|err| {
                CryptoProviderError::InvalidKeyData(format!("invalid EC private key: {err}"))
            })?;

            Ok(CryptoKey::new(
                KeyType::Private,
                ES256,
                usages,
                extractable,
                secret_key.to_bytes().to_vec(),
            ))
        } else {
            let public_key = PublicKey::from_jwk_str(&members).map_err(|err| {
                CryptoProviderError::InvalidKeyData(format!("invalid EC public key: {err}"))
            })?;

            Ok(CryptoKey::new(
                KeyType::Public,
                ES256,
                usages,
                extractable,
                public_key.to_encoded_point(false).as_bytes().to_vec(),
            ))
        }
    }

    fn export(&self, key: &CryptoKey) -> Result<JsonObject, CryptoProviderError> {
        let jwk = match key.key_type() {
            KeyType::Private => SecretKey::from_slice(key.material())
                .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))?
                .to_jwk(),
            KeyType::Public => PublicKey::from_sec1_bytes(key.material())
                .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))?
                .to_jwk(),
            KeyType::Secret => {
                return Err(CryptoProviderError::InvalidKeyData(
                    "ES256 keys are never secret keys".to_string(),
                ))
            }
        };

        let value = serde_json::to_value(&jwk)
            .map_err(|err| CryptoProviderError::InvalidKeyData(err.to_string()))?;
        Self::to_object(value)
    }

    fn generate(
        &self,
        _params: &JsonObject,
        usages: Vec<String>,
        extractable: bool,
    ) -> Result<GeneratedKey, CryptoProviderError> {
        let secret_key = SecretKey::random(&mut rand::thread_rng());
        let public_key = secret_key.public_key();

        Ok(GeneratedKey::Pair {
            private_key: CryptoKey::new(
                KeyType::Private,
                ES256,
                usages.clone(),
                extractable,
                secret_key.to_bytes().to_vec(),
            ),
            // public keys are always extractable
            public_key: CryptoKey::new(
                KeyType::Public,
                ES256,
                usages,
                true,
                public_key.to_encoded_point(false).as_bytes().to_vec(),
            ),
        })
    }

    fn sign(&self, key: &CryptoKey, data: &[u8]) -> Result<Vec<u8>, CryptoProviderError> {
        let signing_key = SigningKey::from_slice(key.material()).map_err(|err| {
            CryptoProviderError::CouldNotSign(format!("couldn't initialize secret key: {err}"))
        })?;

        let signature: Signature = signing_key.sign(data);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(
        &self,
        key: &CryptoKey,
        signature: &[u8],
        data: &[u8],
    ) -> Result<bool, CryptoProviderError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(key.material()).map_err(|err| {
            CryptoProviderError::CouldNotVerify(format!(
                "couldn't initialize verifying key: {err}"
            ))
        })?;

        let Ok(signature) = Signature::from_slice(signature) else {
            return Ok(false);
        };

        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}

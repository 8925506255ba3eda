use std::sync::Arc;

use jwks_crypto::{
    CryptoKey, CryptoProviderError, EncryptedData, JsonObject, KeyType, MockCryptoProvider,
};
use serde_json::{json, Value};

use super::{merge_members, thumbprint::thumbprint, HeaderPolicy, Jwk, KidPolicy};
use crate::{
    common_models::{KeyUse, Kty},
    error::JwkError,
};

const RSA_N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

fn object(value: Value) -> JsonObject {
    match value {
        Value::Object(object) => object,
        _ => panic!("not an object"),
    }
}

fn ec_jwk() -> Value {
    json!({
        "kty": "EC",
        "crv": "P-256",
        "x": "73a4dOjchLnvNZQClbAqhNGWTv2edQKayJ5OqU9xdmI",
        "y": "CmMhgetVMliOoukeVhXrYsNGxLDKuEnzlWio2LsDwug",
        "alg": "ES256",
        "kid": "ec-1",
        "key_ops": ["sign", "verify"]
    })
}

fn private_handle() -> CryptoKey {
    CryptoKey::new(
        KeyType::Private,
        "ES256",
        vec!["sign".to_string()],
        true,
        vec![],
    )
}

#[test]
fn test_thumbprint_rfc7638_example() {
    let jwk = object(json!({
        "kty": "RSA",
        "n": RSA_N,
        "e": "AQAB",
        "alg": "RS256",
        "kid": "2011-04-29"
    }));

    assert_eq!(
        "NzbLsXh8uDCcd-6MNwXF4W_7noWXFZAfHkxZsRGC9Xs",
        thumbprint(&jwk).unwrap()
    );
}

#[test]
fn test_thumbprint_ignores_order_and_extra_members() {
    let canonical = object(json!({
        "crv": "P-256",
        "kty": "EC",
        "x": "73a4dOjchLnvNZQClbAqhNGWTv2edQKayJ5OqU9xdmI",
        "y": "CmMhgetVMliOoukeVhXrYsNGxLDKuEnzlWio2LsDwug"
    }));
    let decorated = object(ec_jwk());

    let expected = "45BLsBiWcghaEf_NF70Gf5oQcYLHaAtks0C48tT5SJ4";
    assert_eq!(expected, thumbprint(&canonical).unwrap());
    assert_eq!(expected, thumbprint(&decorated).unwrap());
    assert_eq!(thumbprint(&decorated).unwrap(), thumbprint(&decorated).unwrap());
}

#[test]
fn test_thumbprint_oct() {
    let jwk = object(json!({
        "kty": "oct",
        "k": "5hPNmHk7tTFZxLiBEmenM58ZF0dup1Z9YHmDhU26_t4"
    }));

    assert_eq!(
        "25BH4hLm8A-gw20EHx8QvfDRCt3hKhFRYz9E_2Tge2c",
        thumbprint(&jwk).unwrap()
    );
}

#[test]
fn test_thumbprint_invalid_kty() {
    for jwk in [
        json!({ "kty": "OKP", "crv": "Ed25519", "x": "AAAA" }),
        json!({ "crv": "P-256", "x": "AAAA", "y": "AAAA" }),
    ] {
        let result = thumbprint(&object(jwk));
        assert!(matches!(result, Err(JwkError::Data(message)) if message == "invalid kty"));
    }
}

#[test]
fn test_thumbprint_missing_member() {
    let result = thumbprint(&object(json!({ "kty": "RSA", "e": "AQAB" })));
    assert!(result.unwrap_err().is_data_error());
}

#[test]
fn test_merge_members() {
    let data = object(json!({ "alg": "ES256", "kty": "EC" }));

    let merged = merge_members(
        data.clone(),
        Some(object(json!({ "alg": "ES256", "kid": "1" }))),
    )
    .unwrap();
    assert_eq!(
        object(json!({ "alg": "ES256", "kty": "EC", "kid": "1" })),
        merged
    );

    let result = merge_members(data, Some(object(json!({ "alg": "RS256" }))));
    assert!(matches!(result, Err(JwkError::Data(message)) if message.contains("`alg`")));
}

#[test]
fn test_new_conflicting_alg_or_kid() {
    let result = Jwk::new(
        ec_jwk(),
        Some(object(json!({ "alg": "ES384" }))),
        KidPolicy::Strict,
    );
    assert!(result.unwrap_err().is_data_error());

    let result = Jwk::new(
        ec_jwk(),
        Some(object(json!({ "kid": "other" }))),
        KidPolicy::Strict,
    );
    assert!(result.unwrap_err().is_data_error());
}

#[test]
fn test_new_adopts_options() {
    let mut data = object(ec_jwk());
    data.remove("alg");
    data.remove("kid");

    let jwk = Jwk::new(
        Value::Object(data),
        Some(object(json!({ "alg": "ES256", "kid": "ec-1", "use": "sig" }))),
        KidPolicy::Strict,
    )
    .unwrap();

    assert_eq!(Kty::Ec, jwk.kty());
    assert_eq!("ES256", jwk.alg());
    assert_eq!("ec-1", jwk.kid());
    assert_eq!(Some(KeyUse::Sig), jwk.key_use());
    assert_eq!(vec!["sign", "verify"], jwk.key_ops());
    assert!(!jwk.is_bound());
}

#[test]
fn test_new_same_value_in_data_and_options() {
    let jwk = Jwk::new(
        ec_jwk(),
        Some(object(json!({ "alg": "ES256", "kid": "ec-1" }))),
        KidPolicy::Strict,
    )
    .unwrap();

    assert_eq!("ES256", jwk.alg());
    assert_eq!("ec-1", jwk.kid());
}

#[test]
fn test_new_from_json_string() {
    let from_string = Jwk::new(json!(ec_jwk().to_string()), None, KidPolicy::Strict).unwrap();
    let from_object = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();
    assert_eq!(from_object, from_string);

    let result = Jwk::new(json!("{not json"), None, KidPolicy::Strict);
    assert!(
        matches!(result, Err(JwkError::Data(message)) if message == "invalid JWK JSON string")
    );
}

#[test]
fn test_new_missing_kid_by_policy() {
    let mut data = object(ec_jwk());
    data.remove("kid");

    let result = Jwk::new(Value::Object(data.clone()), None, KidPolicy::Strict);
    assert!(result.unwrap_err().is_data_error());

    let jwk = Jwk::new(Value::Object(data), None, KidPolicy::Thumbprint).unwrap();
    assert_eq!("45BLsBiWcghaEf_NF70Gf5oQcYLHaAtks0C48tT5SJ4", jwk.kid());
    assert_eq!(jwk.kid(), jwk.thumbprint().unwrap());
}

#[test]
fn test_new_validation() {
    let cases = [
        json!({ "kty": "EC", "kid": "1", "key_ops": ["sign"] }),
        json!({ "kty": "EC", "alg": 256, "kid": "1", "key_ops": ["sign"] }),
        json!({ "kty": "OKP", "alg": "EdDSA", "kid": "1", "key_ops": ["sign"] }),
        json!({ "alg": "ES256", "kid": "1", "key_ops": ["sign"] }),
        json!({ "kty": "EC", "alg": "ES256", "kid": 1, "key_ops": ["sign"] }),
        json!({ "kty": "EC", "alg": "ES256", "kid": "1" }),
        json!({ "kty": "EC", "alg": "ES256", "kid": "1", "use": "wrap" }),
        json!({ "kty": "EC", "alg": "ES256", "kid": "1", "key_ops": "sign" }),
        json!([1, 2, 3]),
    ];

    for data in cases {
        let result = Jwk::new(data.clone(), None, KidPolicy::Strict);
        assert!(result.unwrap_err().is_data_error(), "accepted {data}");
    }
}

#[test]
fn test_round_trip_through_json() {
    let mut data = object(ec_jwk());
    data.insert("x-custom".to_string(), json!({ "nested": [1, 2] }));
    let jwk = Jwk::new(Value::Object(data.clone()), None, KidPolicy::Strict).unwrap();

    let exported = serde_json::to_string(&jwk).unwrap();
    let reconstructed = Jwk::new(
        serde_json::from_str(&exported).unwrap(),
        None,
        KidPolicy::Strict,
    )
    .unwrap();

    assert_eq!(jwk, reconstructed);
    assert_eq!(data, jwk.to_json_object());
    assert_eq!(Some(json!("EC")), jwk.field("kty"));
    assert_eq!(Some(&json!({ "nested": [1, 2] })), jwk.member("x-custom"));
}

#[tokio::test]
async fn test_import_key_binds_handle() {
    let mut provider = MockCryptoProvider::default();
    provider
        .expect_import_key()
        .times(1)
        .withf(|algorithm, jwk| {
            assert_eq!("ES256", algorithm);
            assert_eq!(Some(&json!("ec-1")), jwk.get("kid"));
            true
        })
        .returning(|_, _| Ok(private_handle()));

    let jwk = Jwk::import_key(Arc::new(provider), ec_jwk(), None, KidPolicy::Strict)
        .await
        .unwrap();

    assert!(jwk.is_bound());
    assert_eq!(Some(KeyType::Private), jwk.key_type());
}

#[tokio::test]
async fn test_import_key_propagates_provider_error() {
    let mut provider = MockCryptoProvider::default();
    provider
        .expect_import_key()
        .times(1)
        .returning(|_, _| Err(CryptoProviderError::InvalidKeyData("bad point".to_string())));

    let result = Jwk::import_key(Arc::new(provider), ec_jwk(), None, KidPolicy::Strict).await;
    assert!(matches!(
        result,
        Err(JwkError::CryptoProvider(CryptoProviderError::InvalidKeyData(_)))
    ));
}

#[tokio::test]
async fn test_import_key_rejects_invalid_data_before_provider() {
    let provider = MockCryptoProvider::default();

    let result = Jwk::import_key(
        Arc::new(provider),
        json!({ "kty": "EC" }),
        None,
        KidPolicy::Strict,
    )
    .await;
    assert!(result.unwrap_err().is_data_error());
}

#[tokio::test]
async fn test_from_crypto_key_binds_original_handle() {
    let mut provider = MockCryptoProvider::default();
    provider
        .expect_export_key()
        .times(1)
        .returning(|_| Ok(object(ec_jwk())));

    let handle = CryptoKey::new(
        KeyType::Public,
        "ES256",
        vec!["verify".to_string()],
        true,
        vec![4, 2],
    );
    let jwk = Jwk::from_crypto_key(
        Arc::new(provider),
        handle,
        Some(object(json!({ "kid": "ec-1" }))),
        KidPolicy::Strict,
    )
    .await
    .unwrap();

    let bound = jwk.crypto_key().unwrap();
    assert_eq!(KeyType::Public, bound.key_type());
    assert_eq!(["verify".to_string()], bound.usages());
    assert_eq!("ec-1", jwk.kid());
}

#[tokio::test]
async fn test_sign_and_verify() {
    let mut provider = MockCryptoProvider::default();
    provider
        .expect_import_key()
        .returning(|_, _| Ok(private_handle()));
    provider
        .expect_sign()
        .times(1)
        .withf(|algorithm, _, data| {
            assert_eq!("ES256", algorithm);
            assert_eq!(b"message", data);
            true
        })
        .returning(|_, _, _| Ok(vec![1, 2, 3]));
    provider
        .expect_verify()
        .times(1)
        .withf(|_, _, signature, _| {
            assert_eq!(&[1u8, 2, 3], signature);
            true
        })
        .returning(|_, _, _, _| Ok(true));

    let jwk = Jwk::import_key(Arc::new(provider), ec_jwk(), None, KidPolicy::Strict)
        .await
        .unwrap();

    let signature = jwk.sign(b"message").await.unwrap();
    assert_eq!("AQID", signature);
    assert!(jwk.verify(b"message", &signature).await.unwrap());

    let result = jwk.verify(b"message", "not base64url!").await;
    assert!(result.unwrap_err().is_data_error());
}

#[tokio::test]
async fn test_unbound_key_operations() {
    let jwk = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();

    let result = jwk.sign(b"message").await;
    assert!(matches!(result, Err(JwkError::Data(message)) if message == "key is not imported"));
    assert!(jwk.encrypt(b"message", None).await.is_err());
}

#[tokio::test]
async fn test_encrypt_and_decrypt() {
    let mut provider = MockCryptoProvider::default();
    provider.expect_import_key().returning(|_, _| {
        Ok(CryptoKey::new(
            KeyType::Secret,
            "C20P",
            vec!["encrypt".to_string(), "decrypt".to_string()],
            true,
            vec![],
        ))
    });
    provider
        .expect_encrypt()
        .times(2)
        .returning(|_, _, _, _| {
            Ok(EncryptedData {
                iv: vec![1],
                ciphertext: vec![2],
                tag: vec![3],
            })
        });
    provider
        .expect_decrypt()
        .times(1)
        .withf(|_, _, ciphertext, iv, tag, aad| {
            assert_eq!(&[2u8], ciphertext);
            assert_eq!(&[1u8], iv);
            assert!(tag.is_empty());
            assert_eq!(b"header", aad);
            true
        })
        .returning(|_, _, _, _, _, _| Ok(b"plaintext".to_vec()));

    let jwk = Jwk::import_key(
        Arc::new(provider),
        json!({
            "kty": "oct",
            "k": "5hPNmHk7tTFZxLiBEmenM58ZF0dup1Z9YHmDhU26_t4",
            "alg": "C20P",
            "use": "enc"
        }),
        None,
        KidPolicy::Thumbprint,
    )
    .await
    .unwrap();
    assert_eq!("25BH4hLm8A-gw20EHx8QvfDRCt3hKhFRYz9E_2Tge2c", jwk.kid());

    let without_aad = jwk.encrypt(b"plaintext", None).await.unwrap();
    assert_eq!(None, without_aad.aad);
    assert!(serde_json::to_value(&without_aad)
        .unwrap()
        .get("aad")
        .is_none());

    let with_aad = jwk.encrypt(b"plaintext", Some(b"header".as_slice())).await.unwrap();
    assert_eq!("AQ", with_aad.iv);
    assert_eq!("Ag", with_aad.ciphertext);
    assert_eq!("Aw", with_aad.tag);
    assert_eq!(Some("aGVhZGVy".to_string()), with_aad.aad);

    let plaintext = jwk
        .decrypt(&with_aad.ciphertext, &with_aad.iv, None, with_aad.aad.as_deref())
        .await
        .unwrap();
    assert_eq!(b"plaintext".to_vec(), plaintext);
}

#[test]
fn test_protected_header() {
    let jwk = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();

    let header = jwk
        .protected_header(Some(object(json!({ "typ": "JWT" }))), HeaderPolicy::Standard)
        .unwrap();
    assert_eq!(
        object(json!({ "alg": "ES256", "kid": "ec-1", "typ": "JWT" })),
        header
    );
}

#[test]
fn test_protected_header_jku_forces_kid() {
    let jwk = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();

    let header = jwk
        .protected_header(
            Some(object(json!({
                "jku": "https://example.com/jwks.json",
                "kid": "someone-else"
            }))),
            HeaderPolicy::Standard,
        )
        .unwrap();
    assert_eq!(Some(&json!("ec-1")), header.get("kid"));
}

#[test]
fn test_protected_header_requires_signing_usage() {
    let jwk = Jwk::new(
        json!({
            "kty": "oct",
            "k": "5hPNmHk7tTFZxLiBEmenM58ZF0dup1Z9YHmDhU26_t4",
            "alg": "C20P",
            "kid": "enc-1",
            "use": "enc"
        }),
        None,
        KidPolicy::Strict,
    )
    .unwrap();

    let result = jwk.protected_header(None, HeaderPolicy::Standard);
    assert!(
        matches!(result, Err(JwkError::Data(message)) if message == "invalid key usage option")
    );
}

#[test]
fn test_protected_header_use_sig_is_enough() {
    let mut data = object(ec_jwk());
    data.remove("key_ops");
    data.insert("use".to_string(), json!("sig"));
    let jwk = Jwk::new(Value::Object(data), None, KidPolicy::Strict).unwrap();

    assert!(jwk.protected_header(None, HeaderPolicy::Standard).is_ok());
}

#[test]
fn test_protected_header_rejects_alg_and_empty_kid() {
    let jwk = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();

    let result = jwk.protected_header(
        Some(object(json!({ "alg": "none" }))),
        HeaderPolicy::Standard,
    );
    assert!(result.unwrap_err().is_data_error());

    let result = jwk.protected_header(Some(object(json!({ "kid": "" }))), HeaderPolicy::Standard);
    assert!(result.unwrap_err().is_data_error());
}

#[test]
fn test_protected_header_key_reference_required() {
    let jwk = Jwk::new(ec_jwk(), None, KidPolicy::Strict).unwrap();

    let result = jwk.protected_header(None, HeaderPolicy::KeyReferenceRequired);
    assert!(result.unwrap_err().is_data_error());

    let result = jwk.protected_header(
        Some(object(json!({ "jku": "https://a", "jwc": "b" }))),
        HeaderPolicy::KeyReferenceRequired,
    );
    assert!(result.unwrap_err().is_data_error());

    let header = jwk
        .protected_header(
            Some(object(json!({ "jwc": "certificate" }))),
            HeaderPolicy::KeyReferenceRequired,
        )
        .unwrap();
    assert_eq!(Some(&json!("certificate")), header.get("jwc"));
}

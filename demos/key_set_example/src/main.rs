use std::sync::Arc;

use jwks_core::{model::KeyAlgorithmType, JwksCore};
use jwks_providers::{
    common_models::Kty, http_client::imp::reqwest_client::ReqwestClient,
    jwk_set::query::Predicate,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .init();

    let core = JwksCore::new(None, Arc::new(ReqwestClient::default()));

    let mut key_set = core
        .key_set_service
        .generate_key_pair(KeyAlgorithmType::Es256)
        .await
        .expect("Key pair generation failed");

    key_set
        .generate_keys(json!({ "alg": "HS256", "kid": "mac", "length": 512 }))
        .await
        .expect("Secret generation failed");
    tracing::info!(keys = key_set.keys().len(), "generated key set");

    let signing_key = Predicate::from_json(json!({
        "kty": "EC",
        "key_ops": { "$contains": "sign" }
    }))
    .expect("Invalid predicate");
    let signer = key_set
        .find(&signing_key)
        .expect("Query failed")
        .expect("No signing key");
    let verifier = key_set
        .find(&Predicate::function(|jwk| {
            Ok(jwk.key_ops().contains(&"verify") && jwk.kty() == Kty::Ec)
        }))
        .expect("Query failed")
        .expect("No verification key");

    let header = key_set
        .protected_header(&signer, None)
        .expect("Header creation failed");
    println!("Protected header: {}", json!(header));

    let message = b"The quick brown fox";
    let signature = signer.sign(message).await.expect("Signing failed");

    match verifier.verify(message, &signature).await {
        Ok(true) => println!("Successfully verified"),
        _ => println!("Signature is incorrect"),
    }

    println!(
        "Public JWKS: {}",
        key_set.public_jwks().expect("Serialization failed")
    );
}

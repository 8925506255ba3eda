//! **JWKS Core** is the service layer over the key record and key set
//! providers.
//!
//! ## Repository structure
//!
//! * **Crypto** (`jwks-crypto`): the crypto provider boundary and a software
//!   implementation of ES256, HS256 and ChaCha20-Poly1305. All key material
//!   lives behind opaque handles.
//! * **Providers** (`jwks-providers`): JSON Web Keys, RFC 7638 thumbprints,
//!   key sets with import, generation, queries and the public projection.
//! * **Core**: wires the bundled crypto provider and exposes the
//!   [`service::key_set_service::KeySetService`].
//!
//! ## Getting started
//!
//! ```ignore rust
//! // `None` initializes the core with the default configuration
//! let core = JwksCore::new(None, Arc::new(ReqwestClient::default()));
//!
//! let key_set = core
//!     .key_set_service
//!     .generate_key_pair(KeyAlgorithmType::Es256)
//!     .await?;
//! println!("{}", key_set.public_jwks()?);
//! ```

use std::{collections::HashMap, sync::Arc};

use config::JwksCoreConfig;
use jwks_crypto::imp::{
    algorithm::{c20p::C20p, es256::Es256, hs256::Hs256, JwaAlgorithm},
    CryptoProviderImpl,
};
use jwks_providers::http_client::{imp::reqwest_client::ReqwestClient, HttpClient};
use model::KeyAlgorithmType;
use service::key_set_service::KeySetService;

pub mod config;
pub mod model;
pub mod service;

pub struct JwksCore {
    pub key_set_service: KeySetService,
}

impl Default for JwksCore {
    fn default() -> Self {
        Self::new(None, Arc::new(ReqwestClient::default()))
    }
}

impl JwksCore {
    pub fn new(config: Option<JwksCoreConfig>, client: Arc<dyn HttpClient>) -> Self {
        let config = config.unwrap_or_default();

        // initialize crypto provider
        let algorithms: HashMap<String, Arc<dyn JwaAlgorithm>> = HashMap::from_iter(vec![
            (KeyAlgorithmType::Es256.to_string(), Arc::new(Es256) as _),
            (KeyAlgorithmType::Hs256.to_string(), Arc::new(Hs256) as _),
            (KeyAlgorithmType::C20p.to_string(), Arc::new(C20p) as _),
        ]);
        let crypto_provider = Arc::new(CryptoProviderImpl::new(algorithms));

        let key_set_service =
            KeySetService::new(crypto_provider, client, config.key_set.into());

        Self { key_set_service }
    }
}

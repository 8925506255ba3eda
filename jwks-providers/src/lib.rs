//! JSON Web Keys and JSON Web Key Sets on top of an opaque crypto provider.
//!
//! * [`jwk`]: the key record, RFC 7638 thumbprints and protected headers
//! * [`jwk_set`]: ordered key sets: import from heterogeneous sources,
//!   keypair generation, queries and the public projection
//! * [`http_client`]: the transport used to fetch remote key sets
//!
//! All cryptography is delegated to a [`jwks_crypto::CryptoProvider`].

pub mod common_models;
pub mod error;
pub mod http_client;
pub mod jwk;
pub mod jwk_set;

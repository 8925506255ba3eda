use serde::{Deserialize, Serialize};

/// How a key record obtains its `kid` when neither the data nor the
/// construction options carry one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KidPolicy {
    /// A record without a `kid` is rejected.
    Strict,
    /// A missing `kid` is the RFC 7638 thumbprint of the record.
    #[default]
    Thumbprint,
}

/// Requirements on protected headers built from a key record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderPolicy {
    #[default]
    Standard,
    /// Exactly one of `jku` or `jwc` must be present.
    KeyReferenceRequired,
}

/// Output of [`super::Jwk::encrypt`], all members base64url encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedOutput {
    pub iv: String,
    pub ciphertext: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad: Option<String>,
}

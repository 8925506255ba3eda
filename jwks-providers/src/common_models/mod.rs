use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use jwks_crypto::JsonObject;

/// JWK `kty` values understood by the key record.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum Kty {
    #[serde(rename = "RSA")]
    #[strum(serialize = "RSA")]
    Rsa,
    #[serde(rename = "EC")]
    #[strum(serialize = "EC")]
    Ec,
    #[serde(rename = "oct")]
    #[strum(serialize = "oct")]
    Oct,
}

impl Kty {
    /// Members hashed by the RFC 7638 thumbprint, in lexicographic order.
    pub fn thumbprint_members(&self) -> &'static [&'static str] {
        match self {
            Kty::Rsa => &["e", "kty", "n"],
            Kty::Ec => &["crv", "kty", "x", "y"],
            Kty::Oct => &["k", "kty"],
        }
    }

    /// Members that only a private (or secret) key carries.
    pub fn private_members(&self) -> &'static [&'static str] {
        match self {
            Kty::Rsa => &["d", "p", "q", "dp", "dq", "qi", "oth"],
            Kty::Ec => &["d"],
            Kty::Oct => &["k"],
        }
    }
}

/// JWK `use` values.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyUse {
    Sig,
    Enc,
}

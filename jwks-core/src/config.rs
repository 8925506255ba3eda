use jwks_providers::{
    jwk::{HeaderPolicy, KidPolicy},
    jwk_set::Params,
};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JwksCoreConfig {
    pub key_set: KeySetConfig,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeySetConfig {
    pub kid_policy: KidPolicy,
    pub header_policy: HeaderPolicy,
}

impl From<KeySetConfig> for Params {
    fn from(config: KeySetConfig) -> Self {
        Self {
            kid_policy: config.kid_policy,
            header_policy: config.header_policy,
        }
    }
}

use serde_json::{json, Value};

use super::{model::HeaderPolicy, Jwk};
use crate::{
    common_models::{JsonObject, KeyUse},
    error::JwkError,
};

impl Jwk {
    /// Builds a JWS protected header `{alg, kid, ...extra}` for this key.
    ///
    /// The key must be intended for signing. When `jku` is given the header
    /// `kid` is always this key's `kid`.
    pub fn protected_header(
        &self,
        extra: Option<JsonObject>,
        policy: HeaderPolicy,
    ) -> Result<JsonObject, JwkError> {
        let can_sign =
            self.key_ops().contains(&"sign") || self.key_use() == Some(KeyUse::Sig);
        if !can_sign {
            return Err(JwkError::Data("invalid key usage option".to_string()));
        }

        let mut header = JsonObject::new();
        header.insert("alg".to_string(), json!(self.alg()));
        header.insert("kid".to_string(), json!(self.kid()));

        for (name, value) in extra.unwrap_or_default() {
            if name == "alg" && value.as_str() != Some(self.alg()) {
                return Err(JwkError::Data(format!(
                    "header `alg` {value} does not match key `alg` `{}`",
                    self.alg()
                )));
            }
            header.insert(name, value);
        }

        if header.contains_key("jku") {
            header.insert("kid".to_string(), json!(self.kid()));
        }

        for name in ["alg", "kid"] {
            match header.get(name).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => {}
                _ => return Err(JwkError::Data(format!("header `{name}` is required"))),
            }
        }

        if policy == HeaderPolicy::KeyReferenceRequired
            && header.contains_key("jku") == header.contains_key("jwc")
        {
            return Err(JwkError::Data(
                "exactly one of `jku` or `jwc` is required".to_string(),
            ));
        }

        Ok(header)
    }
}

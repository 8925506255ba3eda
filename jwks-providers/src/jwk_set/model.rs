use std::sync::Arc;

use serde::Deserialize;

use crate::{
    common_models::JsonObject,
    jwk::{HeaderPolicy, Jwk, KidPolicy},
};

/// Policies applied to every record a key set imports or generates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    pub kid_policy: KidPolicy,
    pub header_policy: HeaderPolicy,
}

/// Records returned by an import or generation, shaped like the request.
#[derive(Clone, Debug)]
pub enum Keys {
    One(Arc<Jwk>),
    Many(Vec<Keys>),
}

impl Keys {
    /// All records, depth first in request order.
    pub fn flatten(&self) -> Vec<Arc<Jwk>> {
        match self {
            Keys::One(jwk) => vec![jwk.clone()],
            Keys::Many(keys) => keys.iter().flat_map(Keys::flatten).collect(),
        }
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        match self {
            Keys::One(_) => 1,
            Keys::Many(keys) => keys.iter().map(Keys::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_one(&self) -> Option<&Arc<Jwk>> {
        match self {
            Keys::One(jwk) => Some(jwk),
            Keys::Many(_) => None,
        }
    }
}

/// Records resolved but not yet appended to a key set.
pub(crate) enum Resolved {
    Key(Jwk),
    Many(Vec<Resolved>),
    KeySet {
        metadata: JsonObject,
        keys: Box<Resolved>,
    },
}

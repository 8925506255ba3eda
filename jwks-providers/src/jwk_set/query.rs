//! Predicates over key records.
//!
//! A predicate is either a closure or a declarative [`KeyMatcher`] built from
//! a JSON object such as `{"kty": "EC", "alg": {"$in": ["ES256", "ES384"]}}`.

use serde_json::Value;

use crate::{common_models::JsonObject, error::JwkError, jwk::Jwk};

type PredicateFn = dyn Fn(&Jwk) -> Result<bool, JwkError> + Send + Sync;

pub enum Predicate {
    Function(Box<PredicateFn>),
    Declarative(KeyMatcher),
}

impl Predicate {
    pub fn function(
        predicate: impl Fn(&Jwk) -> Result<bool, JwkError> + Send + Sync + 'static,
    ) -> Self {
        Self::Function(Box::new(predicate))
    }

    /// Builds a declarative predicate; only JSON objects are accepted.
    pub fn from_json(value: Value) -> Result<Self, JwkError> {
        match value {
            Value::Object(fields) => Ok(Self::Declarative(KeyMatcher::from_object(fields)?)),
            _ => Err(JwkError::Operation("invalid predicate".to_string())),
        }
    }

    pub fn matches(&self, jwk: &Jwk) -> Result<bool, JwkError> {
        match self {
            Self::Function(predicate) => predicate(jwk),
            Self::Declarative(matcher) => Ok(matcher.matches(jwk)),
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Predicate::Function(..)"),
            Self::Declarative(_) => f.write_str("Predicate::Declarative(..)"),
        }
    }
}

impl From<KeyMatcher> for Predicate {
    fn from(matcher: KeyMatcher) -> Self {
        Self::Declarative(matcher)
    }
}

/// Matches one record field. `None` is an absent field.
pub trait FieldMatcher: Send + Sync {
    fn matches(&self, value: Option<&Value>) -> bool;
}

pub struct Equals(pub Value);

impl FieldMatcher for Equals {
    fn matches(&self, value: Option<&Value>) -> bool {
        value == Some(&self.0)
    }
}

/// `{"$in": [...]}`
pub struct OneOf(pub Vec<Value>);

impl FieldMatcher for OneOf {
    fn matches(&self, value: Option<&Value>) -> bool {
        value.is_some_and(|value| self.0.contains(value))
    }
}

/// `{"$contains": v}`: an array field holding `v`.
pub struct Contains(pub Value);

impl FieldMatcher for Contains {
    fn matches(&self, value: Option<&Value>) -> bool {
        value
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(&self.0))
    }
}

/// `{"$exists": bool}`
pub struct Exists(pub bool);

impl FieldMatcher for Exists {
    fn matches(&self, value: Option<&Value>) -> bool {
        value.is_some() == self.0
    }
}

/// All field matchers must hold.
#[derive(Default)]
pub struct KeyMatcher {
    fields: Vec<(String, Box<dyn FieldMatcher>)>,
}

impl KeyMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, matcher: impl FieldMatcher + 'static) -> Self {
        self.fields.push((field.into(), Box::new(matcher)));
        self
    }

    pub fn from_object(fields: JsonObject) -> Result<Self, JwkError> {
        let mut matcher = Self::new();

        for (field, expected) in fields {
            match expected {
                Value::Object(operators) if is_operator_object(&operators) => {
                    for (operator, argument) in operators {
                        matcher
                            .fields
                            .push((field.clone(), operator_matcher(&operator, argument)?));
                    }
                }
                expected => matcher.fields.push((field, Box::new(Equals(expected)))),
            }
        }

        Ok(matcher)
    }

    pub fn matches(&self, jwk: &Jwk) -> bool {
        self.fields
            .iter()
            .all(|(field, matcher)| matcher.matches(jwk.field(field).as_ref()))
    }
}

fn is_operator_object(object: &JsonObject) -> bool {
    !object.is_empty() && object.keys().all(|key| key.starts_with('$'))
}

fn operator_matcher(operator: &str, argument: Value) -> Result<Box<dyn FieldMatcher>, JwkError> {
    let matcher: Box<dyn FieldMatcher> = match (operator, argument) {
        ("$in", Value::Array(values)) => Box::new(OneOf(values)),
        ("$contains", value) => Box::new(Contains(value)),
        ("$exists", Value::Bool(exists)) => Box::new(Exists(exists)),
        ("$in" | "$exists", argument) => {
            return Err(JwkError::Operation(format!(
                "invalid argument {argument} for `{operator}`"
            )))
        }
        (operator, _) => {
            return Err(JwkError::Operation(format!(
                "unknown operator `{operator}`"
            )))
        }
    };
    Ok(matcher)
}

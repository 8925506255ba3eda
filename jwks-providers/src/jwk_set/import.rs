use std::path::{Path, PathBuf};

use futures::{
    future::{try_join_all, BoxFuture},
    FutureExt,
};
use serde_json::Value;
use url::Url;

use super::{model::Resolved, JwkSet, Keys};
use crate::{common_models::JsonObject, error::JwkError, jwk::Jwk};

/// Shape of an import request.
#[derive(Debug, PartialEq)]
pub enum ImportSource {
    List(Vec<Value>),
    Json(String),
    Url(Url),
    File(PathBuf),
    KeySet { metadata: JsonObject, keys: Vec<Value> },
    Key(JsonObject),
}

impl ImportSource {
    pub fn classify(data: Value) -> Result<Self, JwkError> {
        match data {
            Value::Array(items) => Ok(Self::List(items)),
            Value::String(text) if !text.is_empty() => {
                let trimmed = text.trim_start();
                if trimmed.starts_with('{') || trimmed.starts_with('[') {
                    Ok(Self::Json(text))
                } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
                    Url::parse(trimmed)
                        .map(Self::Url)
                        .map_err(|err| JwkError::Data(format!("invalid URL `{text}`: {err}")))
                } else {
                    Ok(Self::File(PathBuf::from(text)))
                }
            }
            Value::Object(mut members) => match members.remove("keys") {
                Some(Value::Array(keys)) => Ok(Self::KeySet {
                    metadata: members,
                    keys,
                }),
                Some(_) => Err(JwkError::Data(
                    "key set `keys` must be an array".to_string(),
                )),
                None => Ok(Self::Key(members)),
            },
            _ => Err(JwkError::Data("invalid input".to_string())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Json(_) => "json",
            Self::Url(_) => "url",
            Self::File(_) => "file",
            Self::KeySet { .. } => "key set",
            Self::Key(_) => "key",
        }
    }
}

/// A fetched or read document must be a JWK (set) or a list of them.
fn document(value: Value, source: &str) -> Result<Value, JwkError> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        _ => Err(JwkError::Data(format!(
            "`{source}` does not contain a JWK or a JWK set"
        ))),
    }
}

async fn read_file(path: &Path) -> Result<Value, JwkError> {
    tracing::debug!(path = %path.display(), "reading keys from file");

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| JwkError::Data(format!("cannot read `{}`: {err}", path.display())))?;
    let value = serde_json::from_str(&text)
        .map_err(|err| JwkError::Data(format!("invalid JSON in `{}`: {err}", path.display())))?;

    document(value, &path.display().to_string())
}

impl JwkSet {
    /// Imports keys from an object, a JSON string, a URL, a file path, a key
    /// set document or a list of any of these.
    ///
    /// A single key yields [`Keys::One`], everything else [`Keys::Many`] in
    /// input order. Key set metadata is merged into this set.
    pub async fn import_keys(&mut self, data: Value) -> Result<Keys, JwkError> {
        let resolved = self.resolve_import(data).await?;
        Ok(self.commit(resolved))
    }

    fn resolve_import(&self, data: Value) -> BoxFuture<'_, Result<Resolved, JwkError>> {
        async move {
            let source = ImportSource::classify(data)?;
            tracing::debug!(source = source.kind(), "resolving key import");

            match source {
                ImportSource::List(items) => {
                    let resolved =
                        try_join_all(items.into_iter().map(|item| self.resolve_import(item)))
                            .await?;
                    Ok(Resolved::Many(resolved))
                }
                ImportSource::Json(text) => {
                    let value = serde_json::from_str(&text)
                        .map_err(|err| JwkError::Data(format!("invalid JSON input: {err}")))?;
                    self.resolve_import(value).await
                }
                ImportSource::Url(url) => {
                    let value = self.fetch(&url).await?;
                    self.resolve_import(value).await
                }
                ImportSource::File(path) => {
                    let value = read_file(&path).await?;
                    self.resolve_import(value).await
                }
                ImportSource::KeySet { metadata, keys } => {
                    let keys = self.resolve_import(Value::Array(keys)).await?;
                    Ok(Resolved::KeySet {
                        metadata,
                        keys: Box::new(keys),
                    })
                }
                ImportSource::Key(members) => {
                    let jwk = Jwk::import_key(
                        self.crypto.clone(),
                        Value::Object(members),
                        None,
                        self.params.kid_policy,
                    )
                    .await?;
                    Ok(Resolved::Key(jwk))
                }
            }
        }
        .boxed()
    }

    async fn fetch(&self, url: &Url) -> Result<Value, JwkError> {
        tracing::debug!(%url, "fetching keys");

        let value: Value = self
            .http_client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|err| JwkError::Data(format!("cannot fetch `{url}`: {err}")))?;

        document(value, url.as_str())
    }
}

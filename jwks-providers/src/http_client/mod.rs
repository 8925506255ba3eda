//! Minimal HTTP transport used to fetch remote key sets.

pub mod imp;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> RequestBuilder;

    async fn send(&self, url: &str, headers: Option<Headers>) -> Result<Response, Error>;
}

pub type Headers = HashMap<String, String>;

#[derive(Debug)]
pub struct StatusCode(pub u16);

#[derive(Debug)]
pub struct Response {
    pub body: Vec<u8>,
    pub headers: Headers,
    pub status: StatusCode,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Other HTTP client error: {0}")]
    Other(String),
    #[error("HTTP status code is error: {0}")]
    StatusCodeIsError(StatusCode),
}

impl Response {
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::StatusCodeIsError(self.status))
        }
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(Error::JsonError)
    }
}

impl StatusCode {
    pub fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A GET request under construction.
pub struct RequestBuilder {
    client: Arc<dyn HttpClient>,
    headers: Headers,
    url: String,
}

impl RequestBuilder {
    pub fn new(client: Arc<dyn HttpClient>, url: &str) -> Self {
        Self {
            client,
            headers: Headers::default(),
            url: url.to_string(),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub async fn send(self) -> Result<Response, Error> {
        let headers = if self.headers.is_empty() {
            None
        } else {
            Some(self.headers)
        };

        self.client.send(&self.url, headers).await
    }
}

use crate::domain::snapshot::DeviceSnapshot;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, instrument};

pub fn system_info_url(host: &str) -> String {
    format!("http://{}/api/system/info", host)
}

/// Reads the system info document of a single miner. One call is one request, failures are not retried.
#[async_trait]
pub trait SystemInfoSource: Debug + Send + Sync {
    async fn fetch(&self, host: &str) -> Result<DeviceSnapshot, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpSystemInfoSource {
    client: Client,
}

impl HttpSystemInfoSource {
    pub fn new(client: Client) -> Self {
        HttpSystemInfoSource { client }
    }
}

#[async_trait]
impl SystemInfoSource for HttpSystemInfoSource {
    #[instrument(skip(self))]
    async fn fetch(&self, host: &str) -> Result<DeviceSnapshot, FetchError> {
        let response = self
            .client
            .get(system_info_url(host))
            .send()
            .await
            .map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpError(status));
        }

        let body = response.bytes().await.map_err(|e| FetchError::NetworkUnreachable(e.to_string()))?;
        let document = match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(document)) => document,
            Ok(other) => return Err(FetchError::MalformedJson(format!("expected an object, got {}", json_type(&other)))),
            Err(e) => return Err(FetchError::MalformedJson(e.to_string())),
        };

        let snapshot = DeviceSnapshot::from_object(document);
        debug!("Fetched {} known value(s) from '{}'", snapshot.len(), host);
        Ok(snapshot)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("HTTP error: {0}")]
    HttpError(StatusCode),
    #[error("malformed JSON: {0}")]
    MalformedJson(String),
}

//! REST adapters for the hosted platform (auth, PostgREST, storage).

mod auth;
mod refresh;
mod rest;

pub use auth::SupabaseAuthClient;
pub use refresh::RefreshPolicy;
pub use rest::SupabaseRestClient;

use crate::{PlatformError, PlatformResult};
use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use url::Url;

/// Connection settings shared by the REST adapters.
#[derive(Debug, Clone)]
pub struct SupabaseEndpoint {
    base_url: Url,
    anon_key: String,
    http: reqwest::Client,
}

impl SupabaseEndpoint {
    pub fn new(base_url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            base_url,
            anon_key: anon_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Like [`SupabaseEndpoint::new`] with a caller-built HTTP client.
    pub fn with_client(base_url: Url, anon_key: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url,
            anon_key: anon_key.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Project reference: the first label of the host.
    pub fn project_ref(&self) -> PlatformResult<String> {
        self.base_url
            .host_str()
            .and_then(|host| host.split('.').next())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PlatformError::Config(format!("no host in {}", self.base_url)))
    }

    fn url(&self, path: &str) -> PlatformResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Request with the API key and the given bearer (the anon key when
    /// no user token is available).
    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = bearer.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }
}

/// Error payloads from the auth server and PostgREST share no schema; this
/// accepts the fields of both.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorBody {
    fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => self.error.clone(),
        }
    }

    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Turn a non-success response into a [`PlatformError`]. Bodies are logged
/// only as a length and digest.
async fn error_from_response(response: reqwest::Response, context: &str) -> PlatformError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status.as_u16(), &body, context)
}

fn error_from_body(status: u16, body: &str, context: &str) -> PlatformError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let body_summary = summarize_response_body(body);
    tracing::warn!(status, body_summary = %body_summary, context, "platform request failed");

    let message = parsed
        .message()
        .unwrap_or_else(|| format!("{context}: HTTP {status}"));
    PlatformError::from_api(status, parsed.code(), message)
}

//! PostgREST and storage client.

use super::{error_from_response, SupabaseEndpoint};
use crate::{AuthService, DataStore, Filter, ObjectStorage, PlatformError, PlatformResult};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Media type asking PostgREST for exactly one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// [`DataStore`] and [`ObjectStorage`] over the platform's REST API.
///
/// Requests carry the signed-in user's access token when an auth service
/// is attached, so row-level security applies; otherwise the anon key.
#[derive(Clone)]
pub struct SupabaseRestClient {
    endpoint: SupabaseEndpoint,
    auth: Option<Arc<dyn AuthService>>,
}

impl SupabaseRestClient {
    pub fn new(endpoint: SupabaseEndpoint) -> Self {
        Self {
            endpoint,
            auth: None,
        }
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    async fn bearer(&self) -> PlatformResult<Option<String>> {
        match &self.auth {
            Some(auth) => Ok(auth.current_session().await?.map(|s| s.access_token)),
            None => Ok(None),
        }
    }

    fn table_url(&self, table: &str, filter: &Filter) -> PlatformResult<Url> {
        let mut url = self.endpoint.url(&format!("/rest/v1/{table}"))?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        single: bool,
        body: Option<&Value>,
        context: &str,
    ) -> PlatformResult<reqwest::Response> {
        let bearer = self.bearer().await?;
        let mut request = self.endpoint.request(method, url, bearer.as_deref());
        request = request.header(
            "Accept",
            if single { SINGLE_OBJECT } else { "application/json" },
        );
        if let Some(body) = body {
            request = request
                .header("Prefer", "return=representation")
                .json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, context).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl DataStore for SupabaseRestClient {
    async fn select(&self, table: &str, filter: &Filter) -> PlatformResult<Vec<Value>> {
        let url = self.table_url(table, filter)?;
        debug!(table, "select");
        let response = self.send(Method::GET, url, false, None, "select").await?;
        Ok(response.json().await?)
    }

    async fn select_single(&self, table: &str, filter: &Filter) -> PlatformResult<Value> {
        let url = self.table_url(table, filter)?;
        debug!(table, "select single");
        let response = self.send(Method::GET, url, true, None, "select").await?;
        Ok(response.json().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> PlatformResult<Value> {
        let url = self.table_url(table, &Filter::new())?;
        debug!(table, "insert");
        let response = self
            .send(Method::POST, url, true, Some(&row), "insert")
            .await?;
        Ok(response.json().await?)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> PlatformResult<Value> {
        if filter.eq.is_empty() {
            return Err(PlatformError::Config(format!(
                "refusing unfiltered update of {table}"
            )));
        }
        let url = self.table_url(table, filter)?;
        debug!(table, "update");
        let response = self
            .send(Method::PATCH, url, true, Some(&patch), "update")
            .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> PlatformResult<()> {
        if filter.eq.is_empty() {
            return Err(PlatformError::Config(format!(
                "refusing unfiltered delete of {table}"
            )));
        }
        let url = self.table_url(table, filter)?;
        debug!(table, "delete");
        self.send(Method::DELETE, url, false, None, "delete").await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for SupabaseRestClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> PlatformResult<String> {
        let url = self
            .endpoint
            .url(&format!("/storage/v1/object/{bucket}/{path}"))?;
        let bearer = self.bearer().await?;

        let response = self
            .endpoint
            .request(Method::POST, url, bearer.as_deref())
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "upload").await);
        }

        let public = self
            .endpoint
            .url(&format!("/storage/v1/object/public/{bucket}/{path}"))?;
        debug!(bucket, path, "uploaded object");
        Ok(public.to_string())
    }

    async fn signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in: Duration,
    ) -> PlatformResult<String> {
        let url = self
            .endpoint
            .url(&format!("/storage/v1/object/sign/{bucket}/{path}"))?;
        let bearer = self.bearer().await?;

        let response = self
            .endpoint
            .request(Method::POST, url, bearer.as_deref())
            .json(&serde_json::json!({ "expiresIn": expires_in.as_secs() }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "sign").await);
        }

        let signed: SignedUrlResponse = response.json().await?;
        let full = self
            .endpoint
            .url(&format!("/storage/v1{}", signed.signed_url))?;
        Ok(full.to_string())
    }
}

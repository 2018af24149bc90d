//! API-destination (HTTP) target adapter, grounded on
//! `targets/api_destination_target.py`.
//!
//! Connection auth (`Basic` / `ApiKey`) is resolved through
//! [`ConnectionResolver`] and [`SecretsClient`]; `OAuthClientCredentials`
//! is accepted but not exchanged for a token (see DESIGN.md).

use super::PipeTarget;
use crate::clients::{ConnectionAuthType, ConnectionResolver, SecretsClient};
use crate::errors::TargetError;
use crate::params::HttpTargetParameters;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Default headers sent on every request, overridable by
/// `header_parameters`.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Sends each event as one HTTP request to an API destination.
pub struct HttpDestinationTarget {
    http: reqwest::Client,
    connections: Arc<dyn ConnectionResolver>,
    secrets: Arc<dyn SecretsClient>,
    api_destination_name: String,
    params: HttpTargetParameters,
}

impl HttpDestinationTarget {
    /// Builds a target bound to one API destination.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        connections: Arc<dyn ConnectionResolver>,
        secrets: Arc<dyn SecretsClient>,
        api_destination_name: impl Into<String>,
        params: HttpTargetParameters,
    ) -> Self {
        Self {
            http,
            connections,
            secrets,
            api_destination_name: api_destination_name.into(),
            params,
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        let mut url = endpoint.to_string();
        for value in &self.params.path_parameter_values {
            url = url.replacen('*', value, 1);
        }
        if self.params.query_string_parameters.is_empty() {
            return url;
        }
        let query: Vec<String> = self
            .params
            .query_string_parameters
            .iter()
            .filter(|p| !p.is_value_secret)
            .map(|p| format!("{}={}", p.key, p.value))
            .collect();
        if query.is_empty() {
            url
        } else {
            format!("{url}?{}", query.join("&"))
        }
    }

    async fn auth_header(
        &self,
        connection_arn: &str,
    ) -> Result<Option<(String, String)>, TargetError> {
        let connection = self
            .connections
            .describe_connection(connection_arn)
            .await
            .map_err(|e| TargetError::Internal(e.0))?;

        match connection.authorization_type {
            ConnectionAuthType::Basic => {
                let secret = self
                    .secrets
                    .get_secret_json(&connection.secret_arn)
                    .await
                    .map_err(|e| TargetError::Internal(e.0))?;
                let user = secret.get("username").and_then(Value::as_str).unwrap_or("");
                let pass = secret.get("password").and_then(Value::as_str).unwrap_or("");
                let token = BASE64.encode(format!("{user}:{pass}"));
                Ok(Some(("Authorization".to_string(), format!("Basic {token}"))))
            }
            ConnectionAuthType::ApiKey => {
                let secret = self
                    .secrets
                    .get_secret_json(&connection.secret_arn)
                    .await
                    .map_err(|e| TargetError::Internal(e.0))?;
                let name = secret.get("name").and_then(Value::as_str).unwrap_or("").to_string();
                let value = secret.get("value").and_then(Value::as_str).unwrap_or("").to_string();
                if name.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some((name, value)))
                }
            }
            ConnectionAuthType::OAuthClientCredentials => {
                warn!(
                    connection_arn,
                    "OAuthClientCredentials authorization is not exchanged for a token"
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PipeTarget for HttpDestinationTarget {
    async fn send(&self, events: &[Value]) -> Result<(), TargetError> {
        let destination = self
            .connections
            .describe_api_destination(&self.api_destination_name)
            .await
            .map_err(|e| TargetError::Internal(e.0))?;

        let url = self.build_url(&destination.invocation_endpoint);
        let method = reqwest::Method::from_bytes(destination.http_method.as_bytes())
            .map_err(|e| TargetError::CustomerInvocation(format!("invalid http method: {e}")))?;

        let auth_header = match destination.connection_arn.as_deref() {
            Some(arn) => self.auth_header(arn).await?,
            None => None,
        };

        for event in events {
            let mut request = self.http.request(method.clone(), &url);
            request = request.header("Content-Type", DEFAULT_CONTENT_TYPE);
            if let Some((name, value)) = &auth_header {
                request = request.header(name.as_str(), value.as_str());
            }
            for header in &self.params.header_parameters {
                request = request.header(header.key.as_str(), header.value.as_str());
            }

            let body = match event {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            request = request.body(body);

            let response = request.send().await.map_err(|e| {
                TargetError::Internal(format!("request to {url} failed: {e}"))
            })?;

            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(TargetError::CustomerInvocation(format!(
                    "authentication to {url} failed with status {status}"
                )));
            }
            if status.as_u16() >= 400 {
                warn!(%url, %status, "api destination responded with a non-success status");
            }
        }

        Ok(())
    }
}

//! reqwest-backed broker client

use crate::core::error::PublishError;
use crate::core::traits::{BrokerClient, BrokerResponse};
use crate::security::BrokerAuth;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use url::Url;

const JSON: &str = "application/json";

/// HTTP client for the broker REST API
///
/// `Accept` and `Authorization` are installed as default headers, so every
/// request sent through this client carries them.
#[derive(Debug, Clone)]
pub struct HttpBrokerClient {
    client: reqwest::Client,
}

impl HttpBrokerClient {
    /// Create a client authenticating with `auth`
    pub fn new(auth: &BrokerAuth) -> Result<Self, PublishError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        if let Some(value) = auth.authorization_header() {
            let mut header = HeaderValue::from_str(value.expose_secret())
                .map_err(|_| PublishError::InvalidHeader {
                    header: "Authorization",
                })?;
            header.set_sensitive(true);
            headers.insert(AUTHORIZATION, header);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("pact-broker-publisher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PublishError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl BrokerClient for HttpBrokerClient {
    async fn put_json(&self, url: &Url, body: Vec<u8>) -> Result<BrokerResponse, PublishError> {
        let transport_error = |e: reqwest::Error| PublishError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        tracing::debug!(%url, bytes = body.len(), "PUT");

        let response = self
            .client
            .put(url.as_str())
            .header(CONTENT_TYPE, JSON)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        tracing::debug!(%url, status = status.as_u16(), "broker responded");

        Ok(BrokerResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

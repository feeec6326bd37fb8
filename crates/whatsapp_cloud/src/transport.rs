//! HTTP transport for outbound messages
//!
//! The client only knows how to build envelopes; getting them to the Graph
//! API is the job of a [`MessageTransport`]. [`GraphApiTransport`] is the
//! production implementation on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::WhatsAppClientConfig;
use crate::error::WhatsAppError;

/// Successful (2xx) response as returned by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, `Null` when the body was empty
    pub body: Value,
}

impl TransportResponse {
    /// Deserialize the body into a typed response
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, WhatsAppError> {
        Ok(T::deserialize(&self.body)?)
    }

    /// `wamid.` of the first accepted message
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.body.get("messages")?.get(0)?.get("id")?.as_str()
    }
}

/// API response for a sent message
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<ContactInfo>,
    #[serde(default)]
    pub messages: Vec<MessageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ContactInfo {
    pub input: String,
    pub wa_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageInfo {
    pub id: String,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: i32,
    message: String,
}

/// Posts a JSON body to the messages endpoint
///
/// Implementations return `Err` for anything other than a 2xx response.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Send one envelope
    async fn post_json(&self, body: &Value) -> Result<TransportResponse, WhatsAppError>;
}

/// `reqwest` transport for the Meta Graph API
#[derive(Debug, Clone)]
pub struct GraphApiTransport {
    client: Client,
    url: String,
    access_token: SecretString,
}

impl GraphApiTransport {
    /// Create a transport posting to the config's messages endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.messages_url(),
            access_token: config.access_token.clone(),
        })
    }

    /// Endpoint this transport posts to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessageTransport for GraphApiTransport {
    #[instrument(skip(self, body), fields(url = %self.url))]
    async fn post_json(&self, body: &Value) -> Result<TransportResponse, WhatsAppError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), body_len = text.len(), "Graph API responded");

        if status.is_success() {
            let body = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text)?
            };
            return Ok(TransportResponse {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(error) => Err(WhatsAppError::Api {
                status: status.as_u16(),
                code: error.error.code,
                message: error.error.message,
            }),
            Err(_) => Err(WhatsAppError::Status {
                status: status.as_u16(),
                body: text,
            }),
        }
    }
}

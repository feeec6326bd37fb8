//! Client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::WhatsAppError;

/// What to do when interactive items fail shape validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractivePolicy {
    /// Send the message anyway with an empty `action` object
    #[default]
    Permissive,
    /// Refuse to send and return [`WhatsAppError::InvalidInteractive`]
    Strict,
}

/// WhatsApp Cloud API client configuration
#[derive(Clone, Deserialize)]
pub struct WhatsAppClientConfig {
    /// Meta Graph API access token
    #[serde(default = "empty_secret")]
    pub access_token: SecretString,

    /// Phone number ID from WhatsApp Business
    #[serde(default)]
    pub phone_number_id: String,

    /// API version (default: v18.0)
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Graph API base URL (default: <https://graph.facebook.com>)
    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Handling of interactive items that fail validation
    #[serde(default)]
    pub interactive_policy: InteractivePolicy,

    /// Label of the button that opens a list message (default: "Abrir")
    #[serde(default = "default_list_button_label")]
    pub list_button_label: String,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_graph_url() -> String {
    "https://graph.facebook.com".to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_list_button_label() -> String {
    "Abrir".to_string()
}

impl Default for WhatsAppClientConfig {
    fn default() -> Self {
        Self {
            access_token: empty_secret(),
            phone_number_id: String::new(),
            api_version: default_api_version(),
            graph_url: default_graph_url(),
            timeout_secs: default_timeout(),
            interactive_policy: InteractivePolicy::default(),
            list_button_label: default_list_button_label(),
        }
    }
}

impl std::fmt::Debug for WhatsAppClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppClientConfig")
            .field("access_token", &"[REDACTED]")
            .field("phone_number_id", &self.phone_number_id)
            .field("api_version", &self.api_version)
            .field("graph_url", &self.graph_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("interactive_policy", &self.interactive_policy)
            .field("list_button_label", &self.list_button_label)
            .finish()
    }
}

impl WhatsAppClientConfig {
    /// Create a config with the required credentials and defaults elsewhere
    #[must_use]
    pub fn new(phone_number_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            phone_number_id: phone_number_id.into(),
            ..Self::default()
        }
    }

    /// Set the Graph API version
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the Graph API base URL
    #[must_use]
    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the interactive validation policy
    #[must_use]
    pub const fn with_interactive_policy(mut self, policy: InteractivePolicy) -> Self {
        self.interactive_policy = policy;
        self
    }

    /// Set the list message button label
    #[must_use]
    pub fn with_list_button_label(mut self, label: impl Into<String>) -> Self {
        self.list_button_label = label.into();
        self
    }

    /// Endpoint that accepts outbound messages
    #[must_use]
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.graph_url.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id
        )
    }

    /// Check that the credentials are present
    pub fn validate(&self) -> Result<(), WhatsAppError> {
        if self.access_token.expose_secret().is_empty() {
            return Err(WhatsAppError::config("access_token is required"));
        }
        if self.phone_number_id.is_empty() {
            return Err(WhatsAppError::config("phone_number_id is required"));
        }
        Ok(())
    }
}

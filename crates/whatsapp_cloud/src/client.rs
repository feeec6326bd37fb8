//! WhatsApp client for sending messages
//!
//! Builds Cloud API envelopes and hands them to a [`MessageTransport`].

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::config::{InteractivePolicy, WhatsAppClientConfig};
use crate::error::WhatsAppError;
use crate::message::{
    ButtonReply, Envelope, InteractiveAction, InteractiveKind, ListSection, MediaKind,
    OutboundMessage,
};
use crate::transport::{GraphApiTransport, MessageTransport, TransportResponse};

/// WhatsApp client for the Meta Graph API
///
/// Holds only immutable configuration and a shared transport, so one
/// instance can serve concurrent sends.
pub struct WhatsAppClient<T = GraphApiTransport> {
    transport: Arc<T>,
    config: WhatsAppClientConfig,
}

impl<T> Clone for WhatsAppClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for WhatsAppClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppClient")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}

impl WhatsAppClient {
    /// Create a client that talks to the Graph API over HTTP
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        config.validate()?;
        let transport = GraphApiTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: MessageTransport> WhatsAppClient<T> {
    /// Create a client on top of a custom transport
    ///
    /// Credentials are not checked here; the transport owns authorization.
    #[must_use]
    pub fn with_transport(config: WhatsAppClientConfig, transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    /// Client configuration
    #[must_use]
    pub fn config(&self) -> &WhatsAppClientConfig {
        &self.config
    }

    /// Send a prepared envelope
    ///
    /// Transport errors are logged and returned unchanged. Nothing is retried.
    #[instrument(skip(self, envelope), fields(to = %envelope.to, message_type = %envelope.message_type))]
    pub async fn dispatch(&self, envelope: &Envelope) -> Result<TransportResponse, WhatsAppError> {
        let body = envelope.to_json()?;

        match self.transport.post_json(&body).await {
            Ok(response) => {
                debug!(status = response.status, "WhatsApp message accepted");
                Ok(response)
            },
            Err(e) => {
                error!(error = %e, to = %envelope.to, "WhatsApp API error");
                Err(e)
            },
        }
    }

    /// Send a text message
    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send_text(
        &self,
        to: &str,
        body: &str,
        reply_to: Option<&str>,
    ) -> Result<TransportResponse, WhatsAppError> {
        debug!(message_len = body.len(), "Sending WhatsApp text message");
        let envelope = OutboundMessage::text(body).into_envelope(to, reply_to);
        self.dispatch(&envelope).await
    }

    /// Send a button or list message from untyped items
    ///
    /// Each item is validated against the shape for `kind`. What happens when
    /// one fails depends on [`InteractivePolicy`].
    #[instrument(skip(self, prompt, items), fields(to = %to, kind = ?kind, items = items.len()))]
    pub async fn send_interactive(
        &self,
        to: &str,
        kind: InteractiveKind,
        prompt: &str,
        items: &[Value],
        reply_to: Option<&str>,
    ) -> Result<TransportResponse, WhatsAppError> {
        let action = self.interactive_action(kind, items)?;
        let envelope = OutboundMessage::interactive(kind, prompt, action).into_envelope(to, reply_to);
        self.dispatch(&envelope).await
    }

    /// Send a button message from typed replies
    #[instrument(skip(self, prompt, buttons), fields(to = %to, buttons = buttons.len()))]
    pub async fn send_buttons(
        &self,
        to: &str,
        prompt: &str,
        buttons: &[ButtonReply],
        reply_to: Option<&str>,
    ) -> Result<TransportResponse, WhatsAppError> {
        let action = InteractiveAction::buttons(buttons);
        let envelope = OutboundMessage::interactive(InteractiveKind::Button, prompt, action)
            .into_envelope(to, reply_to);
        self.dispatch(&envelope).await
    }

    /// Send a list message from typed sections
    #[instrument(skip(self, prompt, sections), fields(to = %to, sections = sections.len()))]
    pub async fn send_list(
        &self,
        to: &str,
        prompt: &str,
        sections: &[ListSection],
        reply_to: Option<&str>,
    ) -> Result<TransportResponse, WhatsAppError> {
        let action = InteractiveAction::list(self.config.list_button_label.as_str(), sections);
        let envelope = OutboundMessage::interactive(InteractiveKind::List, prompt, action)
            .into_envelope(to, reply_to);
        self.dispatch(&envelope).await
    }

    /// Send an image or document by link
    #[instrument(skip(self, link, caption), fields(to = %to, kind = ?kind))]
    pub async fn send_media(
        &self,
        to: &str,
        kind: MediaKind,
        link: &str,
        caption: Option<&str>,
        reply_to: Option<&str>,
    ) -> Result<TransportResponse, WhatsAppError> {
        let envelope = OutboundMessage::media(kind, link, caption.map(str::to_owned))
            .into_envelope(to, reply_to);
        self.dispatch(&envelope).await
    }

    /// Validate `items` and build the `action` object, applying the policy
    pub fn interactive_action(
        &self,
        kind: InteractiveKind,
        items: &[Value],
    ) -> Result<InteractiveAction, WhatsAppError> {
        match InteractiveAction::from_items(kind, items, &self.config.list_button_label) {
            Ok(action) => Ok(action),
            Err((index, reason)) => match self.config.interactive_policy {
                InteractivePolicy::Permissive => {
                    warn!(index, %reason, "Interactive item invalid, sending empty action");
                    Ok(InteractiveAction::Empty {})
                },
                InteractivePolicy::Strict => Err(WhatsAppError::InvalidInteractive {
                    index,
                    reason: reason.to_string(),
                }),
            },
        }
    }
}

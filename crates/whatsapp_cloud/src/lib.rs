//! WhatsApp Cloud API client
//!
//! Builds outbound message envelopes (text, interactive, media), sends them
//! through a pluggable transport, and reads inbound webhook payloads.
//!
//! # Example
//!
//! ```no_run
//! use whatsapp_cloud::{ButtonReply, WhatsAppClient, WhatsAppClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WhatsAppClientConfig::new("123456789", "EAAG...");
//! let client = WhatsAppClient::new(config)?;
//!
//! client.send_text("491234567890", "Hello!", None).await?;
//! client
//!     .send_buttons(
//!         "491234567890",
//!         "Continue?",
//!         &[ButtonReply::new("yes", "Yes"), ButtonReply::new("no", "No")],
//!         None,
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod guards;
pub mod message;
pub mod transport;
pub mod webhook;

pub use client::WhatsAppClient;
pub use config::{InteractivePolicy, WhatsAppClientConfig};
pub use error::WhatsAppError;
pub use guards::{ShapeError, is_button_reply, is_list_reply, validate_button_reply, validate_list_reply};
pub use message::{
    ButtonReply, Envelope, InteractiveAction, InteractiveKind, ListRow, ListSection, MediaKind,
    MessageType, OutboundMessage,
};
pub use transport::{GraphApiTransport, MessageTransport, SendMessageResponse, TransportResponse};
pub use webhook::{
    InboundText, InteractiveReply, WebhookPayload, contact_name, contact_number,
    extract_text_messages, text_message,
};

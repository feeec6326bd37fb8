//! Outbound message model and envelope construction
//!
//! An [`OutboundMessage`] is the type-specific part of a send. Wrapping it in
//! an [`Envelope`] adds the fields every Cloud API message carries
//! (`messaging_product`, `recipient_type`, `to`, `type`, optional `context`).
//! The type-specific object is keyed by the message type string, so a text
//! message serializes as `{"type": "text", "text": {...}}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::guards::{ShapeError, validate_button_reply, validate_list_reply};

/// Top-level message type as understood by the Cloud API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text
    Text,
    /// Button or list message
    Interactive,
    /// Image by link
    Image,
    /// Document by link
    Document,
}

impl MessageType {
    /// Wire name, also used as the key of the type-specific object
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Interactive => "interactive",
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interactive message flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveKind {
    /// Up to a handful of quick-reply buttons
    Button,
    /// A menu of sections and rows behind a single button
    List,
}

/// Media kinds that can be sent by link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image (jpeg/png)
    Image,
    /// Document (pdf, etc.)
    Document,
}

impl From<MediaKind> for MessageType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => Self::Image,
            MediaKind::Document => Self::Document,
        }
    }
}

/// A quick-reply button definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonReply {
    /// Identifier echoed back when the user taps the button
    pub id: String,
    /// Button label
    pub title: String,
}

impl ButtonReply {
    /// Create a button
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One selectable row of a list section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    /// Identifier echoed back when the user picks the row
    pub id: String,
    /// Row label
    pub title: String,
    /// Secondary text under the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A titled group of rows in a list message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    /// Section heading
    pub title: String,
    /// Rows in display order
    pub rows: Vec<ListRow>,
}

/// Button entry in the `action.buttons` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: ButtonReply,
}

impl From<ButtonReply> for ReplyButton {
    fn from(reply: ButtonReply) -> Self {
        Self {
            kind: "reply",
            reply,
        }
    }
}

/// The `action` object of an interactive message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InteractiveAction {
    /// `{"buttons": [...]}`
    Buttons {
        /// Reply buttons in display order
        buttons: Vec<ReplyButton>,
    },
    /// `{"button": <label>, "sections": [...]}`
    List {
        /// Label of the button that opens the list
        button: String,
        /// Sections in display order
        sections: Vec<ListSection>,
    },
    /// `{}`, sent when items did not validate under the permissive policy
    Empty {},
}

impl InteractiveAction {
    /// Button action from typed replies
    #[must_use]
    pub fn buttons(replies: &[ButtonReply]) -> Self {
        Self::Buttons {
            buttons: replies.iter().cloned().map(ReplyButton::from).collect(),
        }
    }

    /// List action from typed sections
    #[must_use]
    pub fn list(label: impl Into<String>, sections: &[ListSection]) -> Self {
        Self::List {
            button: label.into(),
            sections: sections.to_vec(),
        }
    }

    /// Build an action from untyped items
    ///
    /// Every item must pass the validator for `kind`. On the first failure
    /// the index of the item and the reason are returned.
    ///
    /// Items are sent in their validated typed form, so fields beyond
    /// `id`/`title` (buttons) or `title`/`rows` and `id`/`title`/`description`
    /// (list sections and rows) are dropped.
    pub fn from_items(
        kind: InteractiveKind,
        items: &[Value],
        list_label: &str,
    ) -> Result<Self, (usize, ShapeError)> {
        match kind {
            InteractiveKind::Button => {
                let replies = validate_all(items, validate_button_reply)?;
                Ok(Self::buttons(&replies))
            },
            InteractiveKind::List => Ok(Self::List {
                button: list_label.to_string(),
                sections: validate_all(items, validate_list_reply)?,
            }),
        }
    }

    /// Whether this is the empty fallback action
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty {})
    }
}

fn validate_all<T>(
    items: &[Value],
    validate: impl Fn(&Value) -> Result<T, ShapeError>,
) -> Result<Vec<T>, (usize, ShapeError)> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| validate(item).map_err(|e| (i, e)))
        .collect()
}

/// `{"body": ...}` of a text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    /// Message text
    pub body: String,
}

/// Text shown above the buttons or list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveBody {
    /// Prompt text
    pub text: String,
}

/// `{"type", "body", "action"}` of an interactive message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveContent {
    /// Button or list
    #[serde(rename = "type")]
    pub kind: InteractiveKind,
    /// Prompt
    pub body: InteractiveBody,
    /// Buttons, list sections or the empty fallback
    pub action: InteractiveAction,
}

/// `{"link", "caption"}` of a media message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaContent {
    /// Publicly reachable URL of the media
    pub link: String,
    /// Caption; left out of the JSON when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Type-specific part of an outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Plain text
    Text(TextContent),
    /// Button or list message
    Interactive(InteractiveContent),
    /// Image or document by link
    Media {
        /// Which media type
        kind: MediaKind,
        /// Link and caption
        content: MediaContent,
    },
}

impl OutboundMessage {
    /// Text message
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(TextContent { body: body.into() })
    }

    /// Interactive message with a prepared action
    #[must_use]
    pub fn interactive(
        kind: InteractiveKind,
        prompt: impl Into<String>,
        action: InteractiveAction,
    ) -> Self {
        Self::Interactive(InteractiveContent {
            kind,
            body: InteractiveBody {
                text: prompt.into(),
            },
            action,
        })
    }

    /// Media message by link
    #[must_use]
    pub fn media(kind: MediaKind, link: impl Into<String>, caption: Option<String>) -> Self {
        Self::Media {
            kind,
            content: MediaContent {
                link: link.into(),
                caption,
            },
        }
    }

    /// Wire type of this message
    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Text(_) => MessageType::Text,
            Self::Interactive(_) => MessageType::Interactive,
            Self::Media { kind, .. } => (*kind).into(),
        }
    }

    /// Wrap into an envelope addressed to `to`
    #[must_use]
    pub fn into_envelope(self, to: impl Into<String>, reply_to: Option<&str>) -> Envelope {
        Envelope::new(to, self, reply_to)
    }
}

// Serializes as a single-entry map keyed by the message type.
impl Serialize for OutboundMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        let key = self.message_type().as_str();
        match self {
            Self::Text(content) => map.serialize_entry(key, content)?,
            Self::Interactive(content) => map.serialize_entry(key, content)?,
            Self::Media { content, .. } => map.serialize_entry(key, content)?,
        }
        map.end()
    }
}

/// Reference to the inbound message being answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContext {
    /// `wamid.` identifier of the earlier message
    pub message_id: String,
}

/// Complete request body for `POST /{phone_number_id}/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    messaging_product: &'static str,
    recipient_type: &'static str,
    /// Recipient phone number or WhatsApp ID
    pub to: String,
    /// Message type, equal to the key of the flattened message object
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Present only when answering an earlier message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    /// Type-specific object
    #[serde(flatten)]
    pub message: OutboundMessage,
}

impl Envelope {
    /// Build the envelope for one recipient
    #[must_use]
    pub fn new(to: impl Into<String>, message: OutboundMessage, reply_to: Option<&str>) -> Self {
        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: to.into(),
            message_type: message.message_type(),
            context: reply_to.map(|id| MessageContext {
                message_id: id.to_string(),
            }),
            message,
        }
    }

    /// JSON body sent to the transport
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

//! WhatsApp webhook payloads
//!
//! Webhooks are produced by Meta and may be partial or malformed: arrays can
//! be empty or missing, nested objects absent, fields of the wrong type.
//! Every field is optional and tolerant on deserialization, and the
//! extractors return `None` at the first missing link instead of failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::WhatsAppError;

// A value of the wrong JSON type becomes the default (`None`, empty) so a
// malformed field only hides itself, never its siblings.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

// Keeps positions: an element that does not parse becomes `T::default()`.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| T::deserialize(item).unwrap_or_default())
        .collect())
}

/// WhatsApp webhook notification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default, deserialize_with = "lenient")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<WebhookValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default, deserialize_with = "lenient")]
    pub messaging_product: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<WebhookMetadata>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub contacts: Vec<WebhookContact>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub messages: Vec<WebhookMessage>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub statuses: Vec<WebhookStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMetadata {
    #[serde(default, deserialize_with = "lenient")]
    pub display_phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookContact {
    #[serde(default, deserialize_with = "lenient")]
    pub profile: Option<ContactProfile>,
    #[serde(default, deserialize_with = "lenient")]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactProfile {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub msg_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<TextMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub interactive: Option<InteractiveMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

/// User's answer to a button or list message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveMessage {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub reply_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub button_reply: Option<ReplyPayload>,
    #[serde(default, deserialize_with = "lenient")]
    pub list_reply: Option<ReplyPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub recipient_id: Option<String>,
}

/// Button or list selection from an inbound interactive message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveReply {
    /// A reply button was tapped
    Button { id: String, title: String },
    /// A list row was picked
    List {
        id: String,
        title: String,
        description: Option<String>,
    },
}

/// An inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub from: String,
    pub message_id: String,
    pub body: String,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

impl WebhookPayload {
    /// Parse a raw webhook body
    ///
    /// Fails only when `bytes` is not JSON at all.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WhatsAppError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    /// Convert an already-parsed JSON value
    ///
    /// Anything that is not an object yields an empty payload.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// `entry[0].changes[0].value`
    fn first_value(&self) -> Option<&WebhookValue> {
        self.entry.first()?.changes.first()?.value.as_ref()
    }

    /// `entry[0].changes[0].value.messages[0]`
    fn first_message(&self) -> Option<&WebhookMessage> {
        self.first_value()?.messages.first()
    }

    /// Profile name of the first contact
    #[must_use]
    pub fn contact_name(&self) -> Option<&str> {
        let contact = self.first_value()?.contacts.first()?;
        non_empty(contact.profile.as_ref()?.name.as_deref()?)
    }

    /// Sender number of the first message
    #[must_use]
    pub fn contact_number(&self) -> Option<&str> {
        non_empty(self.first_message()?.from.as_deref()?)
    }

    /// Body of the first message, only when it is a text message
    #[must_use]
    pub fn text_message(&self) -> Option<&str> {
        let message = self.first_message()?;
        if message.msg_type.as_deref() != Some("text") {
            return None;
        }
        non_empty(message.text.as_ref()?.body.as_deref()?)
    }

    /// `wamid.` of the first message, usable as reply context
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        non_empty(self.first_message()?.id.as_deref()?)
    }

    /// Button or list selection carried by the first message
    #[must_use]
    pub fn interactive_reply(&self) -> Option<InteractiveReply> {
        let message = self.first_message()?;
        if message.msg_type.as_deref() != Some("interactive") {
            return None;
        }
        let interactive = message.interactive.as_ref()?;
        match interactive.reply_type.as_deref()? {
            "button_reply" => {
                let reply = interactive.button_reply.as_ref()?;
                Some(InteractiveReply::Button {
                    id: reply.id.clone()?,
                    title: reply.title.clone()?,
                })
            },
            "list_reply" => {
                let reply = interactive.list_reply.as_ref()?;
                Some(InteractiveReply::List {
                    id: reply.id.clone()?,
                    title: reply.title.clone()?,
                    description: reply.description.clone(),
                })
            },
            _ => None,
        }
    }

    /// Delivery status updates across all entries
    pub fn statuses(&self) -> impl Iterator<Item = &WebhookStatus> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .filter_map(|change| change.value.as_ref())
            .flat_map(|value| &value.statuses)
    }
}

/// Profile name of the first contact in the payload
pub fn contact_name(payload: &WebhookPayload) -> Option<&str> {
    payload.contact_name()
}

/// Sender number of the first message in the payload
pub fn contact_number(payload: &WebhookPayload) -> Option<&str> {
    payload.contact_number()
}

/// Text body of the first message, if it is a text message
pub fn text_message(payload: &WebhookPayload) -> Option<&str> {
    payload.text_message()
}

/// Extract every text message from a webhook payload
///
/// Unlike the single-message accessors this walks all entries and changes
/// with `field == "messages"`.
pub fn extract_text_messages(payload: &WebhookPayload) -> Vec<InboundText> {
    let mut messages = Vec::new();

    for entry in &payload.entry {
        for change in &entry.changes {
            if change.field.as_deref() != Some("messages") {
                continue;
            }
            let Some(value) = &change.value else {
                continue;
            };
            for message in &value.messages {
                if message.msg_type.as_deref() != Some("text") {
                    continue;
                }
                let body = message.text.as_ref().and_then(|t| t.body.as_ref());
                if let (Some(from), Some(id), Some(body)) = (&message.from, &message.id, body) {
                    messages.push(InboundText {
                        from: from.clone(),
                        message_id: id.clone(),
                        body: body.clone(),
                    });
                }
            }
        }
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_message_json(from: &str, id: &str, body: &str) -> serde_json::Value {
        json!({
            "from": from,
            "id": id,
            "timestamp": "1234567890",
            "type": "text",
            "text": {"body": body}
        })
    }

    fn payload_with(contacts: serde_json::Value, messages: serde_json::Value) -> WebhookPayload {
        WebhookPayload::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "123",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "+1234567890",
                            "phone_number_id": "123"
                        },
                        "contacts": contacts,
                        "messages": messages
                    }
                }]
            }]
        }))
    }

    #[test]
    fn extracts_contact_number_and_text() {
        let payload = payload_with(
            json!([{"profile": {"name": "Maria"}, "wa_id": "491234567890"}]),
            json!([text_message_json("491234567890", "wamid.1", "Hello!")]),
        );

        assert_eq!(payload.contact_name(), Some("Maria"));
        assert_eq!(payload.contact_number(), Some("491234567890"));
        assert_eq!(payload.text_message(), Some("Hello!"));
        assert_eq!(payload.message_id(), Some("wamid.1"));
    }

    #[test]
    fn empty_arrays_yield_none() {
        let payload = payload_with(json!([]), json!([]));

        assert_eq!(contact_name(&payload), None);
        assert_eq!(contact_number(&payload), None);
        assert_eq!(text_message(&payload), None);
        assert_eq!(payload.interactive_reply(), None);
    }

    #[test]
    fn missing_structure_yields_none() {
        for raw in [
            json!({}),
            json!({"entry": []}),
            json!({"entry": null}),
            json!({"entry": [{}]}),
            json!({"entry": [{"changes": []}]}),
            json!({"entry": [{"changes": [{"field": "messages"}]}]}),
            json!({"entry": [{"changes": [{"value": {}}]}]}),
            json!({"entry": [{"changes": [{"value": {"contacts": [{}], "messages": [{}]}}]}]}),
        ] {
            let payload = WebhookPayload::from_value(raw);
            assert_eq!(payload.contact_name(), None);
            assert_eq!(payload.contact_number(), None);
            assert_eq!(payload.text_message(), None);
        }
    }

    #[test]
    fn text_message_requires_text_type() {
        let payload = payload_with(
            json!([]),
            json!([{
                "from": "491234567890",
                "id": "wamid.2",
                "type": "interactive",
                "text": {"body": "should be ignored"},
                "interactive": {
                    "type": "button_reply",
                    "button_reply": {"id": "yes", "title": "Yes"}
                }
            }]),
        );

        assert_eq!(payload.text_message(), None);
        assert_eq!(payload.contact_number(), Some("491234567890"));
        assert_eq!(
            payload.interactive_reply(),
            Some(InteractiveReply::Button {
                id: "yes".to_string(),
                title: "Yes".to_string(),
            })
        );
    }

    #[test]
    fn list_reply_is_extracted() {
        let payload = payload_with(
            json!([]),
            json!([{
                "from": "491234567890",
                "id": "wamid.3",
                "type": "interactive",
                "interactive": {
                    "type": "list_reply",
                    "list_reply": {"id": "row-1", "title": "Pizza", "description": "Large"}
                }
            }]),
        );

        assert_eq!(
            payload.interactive_reply(),
            Some(InteractiveReply::List {
                id: "row-1".to_string(),
                title: "Pizza".to_string(),
                description: Some("Large".to_string()),
            })
        );
    }

    #[test]
    fn empty_strings_collapse_to_none() {
        let payload = payload_with(
            json!([{"profile": {"name": ""}}]),
            json!([text_message_json("", "wamid.4", "")]),
        );

        assert_eq!(payload.contact_name(), None);
        assert_eq!(payload.contact_number(), None);
        assert_eq!(payload.text_message(), None);
    }

    #[test]
    fn only_first_message_is_consulted() {
        let payload = payload_with(
            json!([]),
            json!([
                {"from": "491111", "id": "wamid.a", "type": "image"},
                text_message_json("492222", "wamid.b", "Second")
            ]),
        );

        assert_eq!(payload.contact_number(), Some("491111"));
        assert_eq!(payload.text_message(), None);
    }

    #[test]
    fn extracts_multiple_text_messages() {
        let payload = payload_with(
            json!([]),
            json!([
                text_message_json("+491111", "msg1", "First"),
                {"from": "+493333", "id": "msg-img", "type": "image"},
                text_message_json("+492222", "msg2", "Second")
            ]),
        );

        let messages = extract_text_messages(&payload);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].from, "+491111");
        assert_eq!(messages[0].message_id, "msg1");
        assert_eq!(messages[1].body, "Second");
    }

    #[test]
    fn extract_skips_non_message_fields() {
        let payload = WebhookPayload::from_value(json!({
            "entry": [{
                "changes": [{
                    "field": "account_update",
                    "value": {"messages": [text_message_json("+49", "m", "x")]}
                }]
            }]
        }));

        assert!(extract_text_messages(&payload).is_empty());
    }

    #[test]
    fn status_updates_are_listed() {
        let payload = WebhookPayload::from_slice(
            br#"{
                "object": "whatsapp_business_account",
                "entry": [{
                    "id": "123",
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "messaging_product": "whatsapp",
                            "statuses": [{
                                "id": "wamid.out",
                                "status": "delivered",
                                "timestamp": "1234567890",
                                "recipient_id": "49123"
                            }]
                        }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let statuses: Vec<_> = payload.statuses().collect();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].status.as_deref(), Some("delivered"));
        assert_eq!(payload.text_message(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let result = WebhookPayload::from_slice(b"not json");
        assert!(matches!(result, Err(WhatsAppError::Json(_))));
    }

    #[test]
    fn malformed_sibling_does_not_hide_first_message() {
        let payload = payload_with(
            json!([
                {"profile": {"name": "Maria"}, "wa_id": "4911"},
                {"profile": {"name": 42}, "wa_id": ["x"]}
            ]),
            json!([
                text_message_json("4911", "wamid.ok", "Hallo"),
                {"from": 4922, "id": {}, "type": 7, "text": "not an object"}
            ]),
        );

        assert_eq!(payload.contact_name(), Some("Maria"));
        assert_eq!(payload.contact_number(), Some("4911"));
        assert_eq!(payload.text_message(), Some("Hallo"));
        assert_eq!(extract_text_messages(&payload).len(), 1);
    }

    #[test]
    fn wrong_typed_first_fields_yield_none() {
        let payload = payload_with(
            json!([{"profile": {"name": 12}}]),
            json!([{"from": 4911, "type": "text", "text": {"body": false}}]),
        );

        assert_eq!(payload.contact_name(), None);
        assert_eq!(payload.contact_number(), None);
        assert_eq!(payload.text_message(), None);
    }

    #[test]
    fn non_object_elements_keep_their_position() {
        let payload = payload_with(
            json!(["garbage"]),
            json!([5, text_message_json("4922", "wamid.2", "Second")]),
        );

        assert_eq!(payload.contact_name(), None);
        assert_eq!(payload.contact_number(), None);
        assert_eq!(payload.text_message(), None);
    }

    #[test]
    fn wrong_typed_containers_yield_none() {
        for raw in [
            json!("just a string"),
            json!({"entry": {"changes": []}}),
            json!({"entry": [{"changes": "nope"}]}),
            json!({"entry": [{"changes": [{"value": []}]}]}),
            json!({"entry": [{"changes": [{"value": {"contacts": 1, "messages": "x"}}]}]}),
        ] {
            let payload = WebhookPayload::from_value(raw);
            assert_eq!(payload.contact_name(), None);
            assert_eq!(payload.contact_number(), None);
            assert_eq!(payload.text_message(), None);
        }
    }

    #[test]
    fn from_slice_tolerates_wrong_types() {
        let payload = WebhookPayload::from_slice(
            br#"{"entry": [{"changes": [{"value": {"messages": [
                {"from": "4911", "type": "text", "text": {"body": "ok"}, "timestamp": 123}
            ]}}]}]}"#,
        )
        .unwrap();

        assert_eq!(payload.contact_number(), Some("4911"));
        assert_eq!(payload.text_message(), Some("ok"));
    }
}

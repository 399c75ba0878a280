//! Inbound webhook payload shapes and event classification.
//!
//! The platform posts batches of entries, each holding messaging
//! events. `classify` reduces an event to the one kind the dialog
//! engine cares about and decodes postback payloads at the boundary,
//! so nothing downstream parses raw JSON strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WebhookError;

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Party,
    pub recipient: Option<Party>,
    pub timestamp: Option<i64>,
    pub optin: Option<Value>,
    pub message: Option<MessagePart>,
    pub delivery: Option<DeliveryPart>,
    pub postback: Option<PostbackPart>,
    pub read: Option<ReadPart>,
    pub account_linking: Option<AccountLinkingPart>,
}

#[derive(Debug, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagePart {
    pub mid: Option<String>,
    pub text: Option<String>,
    pub quick_reply: Option<QuickReplyPart>,
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyPart {
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct PostbackPart {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryPart {
    #[serde(default)]
    pub mids: Vec<String>,
    pub watermark: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadPart {
    pub watermark: Option<i64>,
    pub seq: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountLinkingPart {
    pub status: Option<String>,
    pub authorization_code: Option<String>,
}

// ── Payload decoding ────────────────────────────────────────────────

/// Fixed postback payloads with special meaning. Matching is exact
/// and case-sensitive; these strings are part of the button wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    NeedHelp,
    NewThread,
    Restart,
    Next,
}

impl Sentinel {
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "need-help" => Some(Self::NeedHelp),
            "NEW_THREAD" => Some(Self::NewThread),
            "restart" => Some(Self::Restart),
            "next" => Some(Self::Next),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeedHelp => "need-help",
            Self::NewThread => "NEW_THREAD",
            Self::Restart => "restart",
            Self::Next => "next",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AnswerPayload {
    id: usize,
    answer: usize,
}

/// A decoded postback or quick-reply payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Postback {
    Sentinel(Sentinel),
    Answer { question: usize, answer: usize },
}

impl Postback {
    /// Sentinels first, then the `{"id":…,"answer":…}` answer shape.
    pub fn decode(payload: &str) -> Result<Self, WebhookError> {
        if let Some(sentinel) = Sentinel::parse(payload) {
            return Ok(Self::Sentinel(sentinel));
        }
        let answer: AnswerPayload = serde_json::from_str(payload)
            .map_err(|_| WebhookError::InvalidPayload(payload.to_string()))?;
        Ok(Self::Answer {
            question: answer.id,
            answer: answer.answer,
        })
    }

    /// The payload string carried by an answer button.
    pub fn answer_payload(question: usize, answer: usize) -> String {
        // A two-integer struct always serializes.
        serde_json::to_string(&AnswerPayload {
            id: question,
            answer,
        })
        .unwrap_or_default()
    }
}

// ── Classification ──────────────────────────────────────────────────

/// What a messaging event means to the dialog engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Text(String),
    Postback(Postback),
    QuickReply(Postback),
    Optin,
    Delivery(DeliveryPart),
    Read(ReadPart),
    AccountLinking(AccountLinkingPart),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub sender_id: String,
    pub kind: EventKind,
}

impl MessagingEvent {
    /// Classify by which part the event carries. A quick reply takes
    /// precedence over the message text it rides on.
    pub fn classify(self) -> Result<WebhookEvent, WebhookError> {
        let sender_id = self.sender.id;
        let kind = if self.optin.is_some() {
            EventKind::Optin
        } else if let Some(delivery) = self.delivery {
            EventKind::Delivery(delivery)
        } else if let Some(read) = self.read {
            EventKind::Read(read)
        } else if let Some(linking) = self.account_linking {
            EventKind::AccountLinking(linking)
        } else if let Some(postback) = self.postback {
            EventKind::Postback(Postback::decode(&postback.payload)?)
        } else if let Some(message) = self.message {
            match message.quick_reply {
                Some(reply) => EventKind::QuickReply(Postback::decode(&reply.payload)?),
                None => EventKind::Text(message.text.unwrap_or_default()),
            }
        } else {
            EventKind::Unknown
        };
        Ok(WebhookEvent { sender_id, kind })
    }
}

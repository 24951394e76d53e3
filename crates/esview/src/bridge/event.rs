//! Payload shapes the page posts outside of an evaluation

use esview_core::js_record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a prompt or request names a variable or a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Variable,
    Function,
}

/// A plain text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// The page asks the host to look at one of its variables or functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HandlerKind,
}

/// The page asks the host for an object and names the handler to hand it to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub object: String,
    #[serde(default)]
    pub predicate: Option<String>,
    #[serde(rename = "toHandler")]
    pub to_handler: String,
    #[serde(rename = "type")]
    pub kind: HandlerKind,
}

js_record!(Message, Prompt, Request);

/// Event category, one per posting channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Message,
    Prompt,
    Request,
}

impl EventCategory {
    pub fn name(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Prompt => "prompt",
            Self::Request => "request",
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed event from one of the posting channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Message(Message),
    Prompt(Prompt),
    Request(Request),
}

impl BridgeEvent {
    /// Parse a posted body into the shape of `category`
    pub fn parse(category: EventCategory, body: Value) -> Result<Self, serde_json::Error> {
        Ok(match category {
            EventCategory::Message => Self::Message(serde_json::from_value(body)?),
            EventCategory::Prompt => Self::Prompt(serde_json::from_value(body)?),
            EventCategory::Request => Self::Request(serde_json::from_value(body)?),
        })
    }

    pub fn category(&self) -> EventCategory {
        match self {
            Self::Message(_) => EventCategory::Message,
            Self::Prompt(_) => EventCategory::Prompt,
            Self::Request(_) => EventCategory::Request,
        }
    }
}

/// A payload that failed to parse, broadcast to every pending listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeFault {
    /// Category whose payload was malformed
    pub attempting: String,
    pub message: String,
}

/// Everything ongoing subscribers see, in post order
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    Event(BridgeEvent),
    Fault(BridgeFault),
    /// A post on a channel name the bus does not know
    Unknown { name: String, body: Value },
}

/// An event type a one-shot listener can wait for
pub trait CategoryEvent: Sized + Send + 'static {
    const CATEGORY: EventCategory;

    fn from_event(event: BridgeEvent) -> Option<Self>;
}

impl CategoryEvent for Message {
    const CATEGORY: EventCategory = EventCategory::Message;

    fn from_event(event: BridgeEvent) -> Option<Self> {
        match event {
            BridgeEvent::Message(message) => Some(message),
            _ => None,
        }
    }
}

impl CategoryEvent for Prompt {
    const CATEGORY: EventCategory = EventCategory::Prompt;

    fn from_event(event: BridgeEvent) -> Option<Self> {
        match event {
            BridgeEvent::Prompt(prompt) => Some(prompt),
            _ => None,
        }
    }
}

impl CategoryEvent for Request {
    const CATEGORY: EventCategory = EventCategory::Request;

    fn from_event(event: BridgeEvent) -> Option<Self> {
        match event {
            BridgeEvent::Request(request) => Some(request),
            _ => None,
        }
    }
}

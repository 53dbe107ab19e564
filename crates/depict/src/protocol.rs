//! # Message Protocol
//!
//! Messages the host sends to the thread that owns a graph. [`Message`] is
//! the in-process form and may carry surfaces; [`Envelope`] is the data-only
//! `{ "type": i32, "msg": ... }` form for anything that has to be serialized.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::SurfaceBox;
use crate::error::{DepictError, Result};
use crate::events::CanvasEvent;

/// Message discriminants on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum MessageType {
    Init = -1,
    Destroy = -2,
    Event = -3,
    Resize = -4,
}

impl From<MessageType> for i32 {
    fn from(typ: MessageType) -> Self {
        typ as i32
    }
}

impl TryFrom<i32> for MessageType {
    type Error = DepictError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Self::Init),
            -2 => Ok(Self::Destroy),
            -3 => Ok(Self::Event),
            -4 => Ok(Self::Resize),
            other => Err(DepictError::UnknownMessageType(other)),
        }
    }
}

/// CSS size of the graph plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
    pub scale: f32,
}

impl Size {
    pub fn new(w: f32, h: f32, scale: f32) -> Self {
        Self { w, h, scale }
    }
}

/// A pointer event in host coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub typ: CanvasEvent,
    pub x: f32,
    pub y: f32,
}

/// Surfaces and size a graph is initialized with.
pub struct InitPayload {
    pub layers: Vec<SurfaceBox>,
    pub size: Size,
    pub background: Option<SurfaceBox>,
}

pub enum Message {
    /// Builds the layers and starts the loop. Ownership of the surfaces moves
    /// to the receiver.
    Init(InitPayload),
    Destroy,
    Event(PointerEvent),
    Resize(Size),
    /// Anything the graph does not know; left to the application.
    Custom(Value),
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Init(init) => f
                .debug_struct("Init")
                .field("layers", &init.layers.len())
                .field("size", &init.size)
                .field("background", &init.background.is_some())
                .finish(),
            Message::Destroy => f.write_str("Destroy"),
            Message::Event(ev) => f.debug_tuple("Event").field(ev).finish(),
            Message::Resize(size) => f.debug_tuple("Resize").field(size).finish(),
            Message::Custom(value) => f.debug_tuple("Custom").field(value).finish(),
        }
    }
}

impl Message {
    pub fn message_type(&self) -> Option<MessageType> {
        match self {
            Message::Init(_) => Some(MessageType::Init),
            Message::Destroy => Some(MessageType::Destroy),
            Message::Event(_) => Some(MessageType::Event),
            Message::Resize(_) => Some(MessageType::Resize),
            Message::Custom(_) => None,
        }
    }

    /// Data-only form of the message. Fails for INIT, whose surfaces cannot
    /// be serialized. Custom messages must already be an envelope.
    pub fn to_envelope(&self) -> Result<Envelope> {
        match self {
            Message::Init(_) => Err(DepictError::SurfaceTransfer),
            Message::Destroy => Ok(Envelope::new(MessageType::Destroy, Value::Null)),
            Message::Event(ev) => Ok(Envelope::new(MessageType::Event, serde_json::to_value(ev)?)),
            Message::Resize(size) => Ok(Envelope::new(MessageType::Resize, serde_json::to_value(size)?)),
            Message::Custom(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

/// Wire form of a message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub typ: i32,
    #[serde(default)]
    pub msg: Value,
}

impl Envelope {
    pub fn new(typ: MessageType, msg: Value) -> Self {
        Self {
            typ: typ.into(),
            msg,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes the payload. Unknown types become [`Message::Custom`] holding
    /// the whole envelope.
    pub fn into_message(self) -> Result<Message> {
        let Ok(typ) = MessageType::try_from(self.typ) else {
            return Ok(Message::Custom(serde_json::to_value(&self)?));
        };
        match typ {
            MessageType::Init => Err(DepictError::SurfaceTransfer),
            MessageType::Destroy => Ok(Message::Destroy),
            MessageType::Event => serde_json::from_value(self.msg)
                .map(Message::Event)
                .map_err(|source| DepictError::Payload {
                    kind: "event",
                    source,
                }),
            MessageType::Resize => serde_json::from_value(self.msg)
                .map(Message::Resize)
                .map_err(|source| DepictError::Payload {
                    kind: "resize",
                    source,
                }),
        }
    }
}

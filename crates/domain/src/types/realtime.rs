//! Subscription channel wire frames and connection state.
//!
//! Client to server: `{"type":"subscribe"|"unsubscribe","channel":...}`.
//! Server to client: `{"type":"data","channel":...,"data":...}`; any other
//! frame type is ignored by the dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_wire_string_conversions;
use crate::utils::serde::flexible_f64;

/// Outbound control frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
}

impl ClientFrame {
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::Subscribe { channel } | Self::Unsubscribe { channel } => channel,
        }
    }

    /// JSON text for the socket.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Subscribe { channel } => {
                serde_json::json!({"type": "subscribe", "channel": channel}).to_string()
            }
            Self::Unsubscribe { channel } => {
                serde_json::json!({"type": "unsubscribe", "channel": channel}).to_string()
            }
        }
    }
}

/// Inbound frame as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ServerFrame {
    /// Parse a text frame; `None` for anything that is not a JSON object with
    /// a string `type`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str::<Self>(text).ok()
    }

    /// Channel and payload of a `data` frame.
    #[must_use]
    pub fn as_data(&self) -> Option<(&str, &Value)> {
        match (self.kind.as_str(), self.channel.as_deref()) {
            ("data", Some(channel)) => Some((channel, &self.data)),
            _ => None,
        }
    }
}

/// Lifecycle of the subscription channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl_wire_string_conversions!(ConnectionState {
    Disconnected => "disconnected",
    Connecting => "connecting",
    Connected => "connected",
    Reconnecting => "reconnecting",
});

/// Price tick carried by a `price_update` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub symbol: String,
    #[serde(deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub change: f64,
    #[serde(default, alias = "change_percent", deserialize_with = "flexible_f64")]
    pub change_percent: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub volume: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Typed view of a channel payload, keyed by `data.type`.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    PriceUpdate(PriceUpdate),
    PortfolioUpdate(Value),
    AlertTriggered(Value),
    Other(Value),
}

impl PushEvent {
    /// Classify a payload delivered to a channel listener.
    ///
    /// Payloads that are not `{type, data}` objects, or whose inner data does
    /// not match the expected shape, come back as [`PushEvent::Other`].
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let inner = payload.get("data").cloned().unwrap_or(Value::Null);
        match payload.get("type").and_then(Value::as_str) {
            Some("price_update") => serde_json::from_value::<PriceUpdate>(inner)
                .map(Self::PriceUpdate)
                .unwrap_or_else(|_| Self::Other(payload.clone())),
            Some("portfolio_update") => Self::PortfolioUpdate(inner),
            Some("alert_triggered") => Self::AlertTriggered(inner),
            _ => Self::Other(payload.clone()),
        }
    }
}

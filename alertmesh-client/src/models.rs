//! Value types exchanged between the feed and the renderers.
//!
//! Field names serialize in camelCase so a web front end can consume a
//! snapshot without a mapping layer.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A normalized chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: String,
    pub timestamp: DateTime<Local>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub status: MessageStatus,
}

impl Message {
    pub fn is_emergency(&self) -> bool {
        self.kind == MessageType::Emergency
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Normal,
    Emergency,
    System,
}

impl MessageType {
    /// Emergency when the text contains "emergency" in any casing.
    pub fn classify(content: &str) -> Self {
        if content.to_lowercase().contains("emergency") {
            MessageType::Emergency
        } else {
            MessageType::Normal
        }
    }
}

/// Delivery state. The normalizer only ever produces `Delivered`; the other
/// variants exist for renderers doing local echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkQuality {
    Excellent,
    Good,
    Poor,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub peer_count: u32,
    pub network_quality: NetworkQuality,
    pub room_name: String,
}

impl ConnectionStatus {
    /// What the header shows before any peer information is available.
    pub fn initial(room_name: impl Into<String>) -> Self {
        Self {
            is_connected: true,
            peer_count: 0,
            network_quality: NetworkQuality::Good,
            room_name: room_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Away,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub nickname: String,
    pub status: UserStatus,
    pub last_seen: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_emergency: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Kind of an emergency quick action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Medical,
    Fire,
    Rescue,
    Shelter,
    General,
}

impl AlertKind {
    pub const ALL: [AlertKind; 5] = [
        AlertKind::Medical,
        AlertKind::Fire,
        AlertKind::Rescue,
        AlertKind::Shelter,
        AlertKind::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Medical => "medical",
            AlertKind::Fire => "fire",
            AlertKind::Rescue => "rescue",
            AlertKind::Shelter => "shelter",
            AlertKind::General => "general",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown alert kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub sender: String,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(MessageType::classify("MEDICAL EMERGENCY now"), MessageType::Emergency);
        assert_eq!(MessageType::classify("Emergency"), MessageType::Emergency);
        assert_eq!(MessageType::classify("an emergency"), MessageType::Emergency);
        assert_eq!(MessageType::classify("all good here"), MessageType::Normal);
        assert_eq!(MessageType::classify(""), MessageType::Normal);
    }

    #[test]
    fn message_serializes_for_web_renderers() {
        let msg = Message {
            id: "msg-1".into(),
            content: "hi".into(),
            sender: "Aaradhya".into(),
            timestamp: Local::now(),
            kind: MessageType::Normal,
            status: MessageStatus::Delivered,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "normal");
        assert_eq!(json["status"], "delivered");
        assert_eq!(json["sender"], "Aaradhya");
    }

    #[test]
    fn alert_kind_parses_any_case() {
        assert_eq!("FIRE".parse::<AlertKind>().unwrap(), AlertKind::Fire);
        assert_eq!(" medical ".parse::<AlertKind>().unwrap(), AlertKind::Medical);
        assert!("flood".parse::<AlertKind>().is_err());
    }

    #[test]
    fn connection_status_uses_camel_case() {
        let status = ConnectionStatus::initial("emergency-chat");
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["isConnected"], true);
        assert_eq!(json["peerCount"], 0);
        assert_eq!(json["networkQuality"], "good");
        assert_eq!(json["roomName"], "emergency-chat");
    }
}

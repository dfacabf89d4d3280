//! Emergency quick actions
//!
//! Canned priority messages offered by the alert panel and the message input.
//! Every one of them ends up as plain text going through `MessageFeed::send`,
//! prefixed with the upper-cased alert kind: `[FIRE] 🔥 FIRE EMERGENCY - ...`.

use crate::models::{AlertKind, GeoPoint};

/// A button on the emergency panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub kind: AlertKind,
    pub label: &'static str,
    pub message: &'static str,
}

pub const QUICK_ACTIONS: [QuickAction; 4] = [
    QuickAction {
        kind: AlertKind::Medical,
        label: "Medical Emergency",
        message: "🚨 MEDICAL EMERGENCY - Need immediate medical assistance at my location",
    },
    QuickAction {
        kind: AlertKind::Fire,
        label: "Fire Emergency",
        message: "🔥 FIRE EMERGENCY - Fire detected, need fire department assistance",
    },
    QuickAction {
        kind: AlertKind::Rescue,
        label: "Rescue Needed",
        message: "🆘 RESCUE NEEDED - Trapped and need immediate rescue assistance",
    },
    QuickAction {
        kind: AlertKind::Shelter,
        label: "Need Shelter",
        message: "🏠 SHELTER NEEDED - Need emergency shelter and assistance",
    },
];

/// Templates offered by the message input in emergency mode. These are sent
/// as typed, without a kind prefix.
pub const INPUT_TEMPLATES: [&str; 5] = [
    "🚨 MEDICAL EMERGENCY - Need immediate medical assistance",
    "🔥 FIRE - Fire emergency, need fire department",
    "🆘 RESCUE - Trapped and need rescue assistance",
    "🏠 SHELTER - Need emergency shelter",
    "📍 LOCATION - Sharing my current location for help",
];

pub const GENERAL_ALERT: &str = "⚠️ GENERAL EMERGENCY - Need assistance";

pub fn quick_action(kind: AlertKind) -> Option<&'static QuickAction> {
    QUICK_ACTIONS.iter().find(|action| action.kind == kind)
}

/// The canned text for a kind; `General` has no panel button but still has a
/// default text.
pub fn default_message(kind: AlertKind) -> &'static str {
    quick_action(kind).map_or(GENERAL_ALERT, |action| action.message)
}

/// `[KIND] message`, the wire form of an alert.
pub fn format_alert(tag: &str, message: &str) -> String {
    format!("[{}] {}", tag.to_uppercase(), message)
}

pub fn format_kind_alert(kind: AlertKind, message: &str) -> String {
    format_alert(kind.as_str(), message)
}

pub fn location_message(point: GeoPoint) -> String {
    format!(
        "📍 My current location: https://maps.google.com/maps?q={},{}",
        point.lat, point.lng
    )
}

/// Location shares travel as a `[LOCATION]` alert.
pub fn location_alert(point: GeoPoint) -> String {
    format_alert("location", &location_message(point))
}

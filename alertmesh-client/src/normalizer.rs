//! Raw line normalization
//!
//! The node stores every message as a log line of the form
//! `Received message at <time> from <sender>: <content>`. This module turns
//! one such line into a [`Message`]. It never fails: anything that does not
//! look like a log line becomes a message from `"Unknown"` stamped with the
//! current time.

use crate::models::{Message, MessageStatus, MessageType};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use tracing::debug;

pub const UNKNOWN_SENDER: &str = "Unknown";

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn line_re() -> &'static Regex {
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    LINE_RE.get_or_init(|| {
        Regex::new(r"^Received message at (.+?) from (.+?): (.+)$").expect("valid regex")
    })
}

fn fraction_re() -> &'static Regex {
    static FRACTION_RE: OnceLock<Regex> = OnceLock::new();
    FRACTION_RE.get_or_init(|| {
        Regex::new(r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\.(\d{3})\d*").expect("valid regex")
    })
}

fn offset_re() -> &'static Regex {
    static OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    OFFSET_RE.get_or_init(|| Regex::new(r"\s[+-]\d{2}:?\d{2}(\s.*)?$").expect("valid regex"))
}

/// How message ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Fresh id on every normalization: the same line polled twice yields
    /// two different ids.
    #[default]
    Ephemeral,
    /// Id derived from sender, content and timestamp, so a message keeps its
    /// id across polls.
    Stable,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    identity: IdentityMode,
}

impl Normalizer {
    pub fn new(identity: IdentityMode) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> IdentityMode {
        self.identity
    }

    pub fn normalize(&self, raw: &str) -> Message {
        self.normalize_at(raw, Local::now())
    }

    /// Normalize with an explicit "now", used for fallback timestamps and
    /// ephemeral ids.
    pub fn normalize_at(&self, raw: &str, now: DateTime<Local>) -> Message {
        let line = raw.trim();

        let Some(caps) = line_re().captures(line) else {
            return Message {
                id: self.assign_id(UNKNOWN_SENDER, line, None, now),
                content: line.to_string(),
                sender: UNKNOWN_SENDER.to_string(),
                timestamp: now,
                kind: MessageType::classify(line),
                status: MessageStatus::Delivered,
            };
        };

        let sender = caps[2].trim();
        let content = caps[3].trim();
        let parsed = parse_timestamp(&caps[1]);
        if parsed.is_none() {
            debug!("unparseable timestamp {:?}, using normalization time", &caps[1]);
        }

        Message {
            id: self.assign_id(sender, content, parsed, now),
            content: content.to_string(),
            sender: sender.to_string(),
            timestamp: parsed.unwrap_or(now),
            kind: MessageType::classify(content),
            status: MessageStatus::Delivered,
        }
    }

    fn assign_id(
        &self,
        sender: &str,
        content: &str,
        timestamp: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> String {
        match self.identity {
            IdentityMode::Ephemeral => ephemeral_id(now),
            IdentityMode::Stable => stable_id(sender, content, timestamp),
        }
    }
}

/// Normalize with ephemeral ids.
pub fn normalize(raw: &str) -> Message {
    Normalizer::default().normalize(raw)
}

/// `msg-<unix millis>-<9 random chars>`
pub fn ephemeral_id(now: DateTime<Local>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("msg-{}-{}", now.timestamp_millis(), &suffix[..9])
}

pub fn stable_id(sender: &str, content: &str, timestamp: Option<DateTime<Local>>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_bytes());
    hasher.update([0x1f]);
    hasher.update(content.as_bytes());
    if let Some(ts) = timestamp {
        hasher.update([0x1f]);
        hasher.update(ts.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("msg-{}", &digest[..16])
}

/// Parse the time portion of a log line as a local date-time.
///
/// `"2025-09-04 12:58:26.580751408 +0530 IST"` gives 12:58:26.580 local time:
/// the zone suffix is dropped and the fraction cut to milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let cleaned = clean_timestamp(raw);
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())?;
    Local.from_local_datetime(&naive).earliest()
}

pub(crate) fn clean_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_zone = offset_re().replace(trimmed, "");
    fraction_re().replacen(&without_zone, 1, "$1.$2").into_owned()
}

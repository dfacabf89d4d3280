//! Message feed: the single source of truth for the visible message list.
//!
//! Every refresh fetches the full raw set from the server, normalizes it and
//! replaces the local list wholesale. Sends go straight to the server and
//! become visible only through the refresh that follows them.
//!
//! Refreshes may overlap (timer tick + send-driven refresh). Each one takes a
//! sequence number when it starts; a completion older than the newest list
//! already applied is dropped. Only lists and resets move that mark forward,
//! so a failed newer request never discards an older request's fresh list.

use crate::alerts;
use crate::models::{AlertKind, Message};
use crate::normalizer::Normalizer;
use crate::transport::MessageTransport;
use crate::error::TransportError;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub const FETCH_FAILED: &str = "Failed to fetch messages";
pub const SEND_FAILED: &str = "Failed to send message";

const EVENT_CAPACITY: usize = 64;

/// Notifications for renderers: list changes and the transient notices
/// ("Message sent!", "Failed to send message").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    MessagesReplaced { count: usize },
    RefreshFailed { reason: String },
    MessageSent,
    SendFailed { reason: String },
}

/// What a single refresh did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A list came back and replaced the local one.
    Replaced(usize),
    /// The payload was not a list; local list emptied.
    Reset,
    Failed,
    /// A newer refresh had already been applied; this result was dropped.
    Stale,
}

#[derive(Debug)]
pub enum SendOutcome {
    /// Blank text, nothing sent.
    Skipped,
    Delivered(RefreshOutcome),
    Failed(TransportError),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered(_))
    }
}

/// Read-only copy of the feed state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub last_synced_at: Option<DateTime<Local>>,
}

#[derive(Debug, Default)]
struct FeedState {
    messages: Vec<Message>,
    sends_in_flight: u32,
    error: Option<String>,
    last_synced_at: Option<DateTime<Local>>,
    applied_seq: u64,
    consecutive_failures: u32,
}

pub struct MessageFeed {
    transport: Arc<dyn MessageTransport>,
    normalizer: Normalizer,
    state: Mutex<FeedState>,
    next_seq: AtomicU64,
    events: broadcast::Sender<FeedEvent>,
}

impl MessageFeed {
    pub fn new(transport: Arc<dyn MessageTransport>, normalizer: Normalizer) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            normalizer,
            state: Mutex::new(FeedState::default()),
            next_seq: AtomicU64::new(0),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock();
        FeedSnapshot {
            messages: state.messages.clone(),
            is_loading: state.sends_in_flight > 0,
            error: state.error.clone(),
            last_synced_at: state.last_synced_at,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().sends_in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Transport failures since the last successful fetch.
    pub fn consecutive_failures(&self) -> u32 {
        self.state.lock().consecutive_failures
    }

    /// One synchronization cycle.
    pub async fn refresh(&self) -> RefreshOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.transport.fetch_messages().await;

        let (outcome, event) = {
            let mut state = self.state.lock();
            if seq < state.applied_seq {
                debug!("dropping refresh #{} (already applied #{})", seq, state.applied_seq);
                return RefreshOutcome::Stale;
            }

            match result {
                Ok(Value::Array(items)) => {
                    state.applied_seq = seq;
                    let messages: Vec<Message> =
                        items.iter().map(|item| self.normalize_item(item)).collect();
                    let count = messages.len();
                    state.messages = messages;
                    state.error = None;
                    state.consecutive_failures = 0;
                    state.last_synced_at = Some(Local::now());
                    (RefreshOutcome::Replaced(count), FeedEvent::MessagesReplaced { count })
                }
                Ok(other) => {
                    state.applied_seq = seq;
                    debug!("payload is not a list ({}), clearing messages", kind_of(&other));
                    state.messages.clear();
                    state.consecutive_failures = 0;
                    state.last_synced_at = Some(Local::now());
                    (RefreshOutcome::Reset, FeedEvent::MessagesReplaced { count: 0 })
                }
                Err(e) => {
                    warn!("refresh #{} failed: {}", seq, e);
                    state.error = Some(FETCH_FAILED.to_string());
                    state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                    (
                        RefreshOutcome::Failed,
                        FeedEvent::RefreshFailed { reason: e.to_string() },
                    )
                }
            }
        };

        let _ = self.events.send(event);
        outcome
    }

    /// Post `text`, then resync. Blank text is ignored.
    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Skipped;
        }

        let _in_flight = InFlight::enter(&self.state);

        match self.transport.post_message(text).await {
            Ok(()) => {
                info!("message sent ({} chars)", text.chars().count());
                let _ = self.events.send(FeedEvent::MessageSent);
                SendOutcome::Delivered(self.refresh().await)
            }
            Err(e) => {
                warn!("send failed: {}", e);
                self.state.lock().error = Some(SEND_FAILED.to_string());
                let _ = self.events.send(FeedEvent::SendFailed { reason: e.to_string() });
                SendOutcome::Failed(e)
            }
        }
    }

    /// Emergency quick action: `[KIND] text` through [`send`](Self::send).
    pub async fn send_alert(&self, kind: AlertKind, text: &str) -> SendOutcome {
        self.send(&alerts::format_kind_alert(kind, text)).await
    }

    fn normalize_item(&self, item: &Value) -> Message {
        match item {
            Value::String(line) => self.normalizer.normalize(line),
            other => self.normalizer.normalize(&other.to_string()),
        }
    }
}

/// Counts one send in flight until dropped, also when the send future is
/// cancelled mid-way.
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a Mutex<FeedState>) -> Self {
        let mut guard = state.lock();
        guard.sends_in_flight += 1;
        guard.error = None;
        drop(guard);
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.sends_in_flight = state.sends_in_flight.saturating_sub(1);
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! AlertMesh client core
//!
//! Keeps the message list of an emergency chat room in sync with a node's
//! HTTP endpoint:
//! - Normalization of raw log lines into structured messages
//! - Polling with ordered, wholesale list replacement
//! - Sending plain messages and pre-formatted emergency alerts
//! - Display helpers for the renderers

pub mod alerts;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalizer;
pub mod poller;
pub mod presentation;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ConfigError, TransportError};
pub use feed::{FeedEvent, FeedSnapshot, MessageFeed, RefreshOutcome, SendOutcome};
pub use models::{AlertKind, Message, MessageStatus, MessageType};
pub use normalizer::{normalize, IdentityMode, Normalizer, UNKNOWN_SENDER};
pub use poller::{spawn_poller, Backoff, PollSchedule, PollerHandle};
pub use transport::{HttpTransport, MessageTransport};

use std::sync::Arc;

/// Feed wired to the HTTP transport described by `config`.
pub fn feed_from_config(config: &ClientConfig) -> Result<Arc<MessageFeed>, TransportError> {
    let transport = HttpTransport::with_timeout(&config.server_base_url, config.request_timeout())?;
    Ok(Arc::new(MessageFeed::new(
        Arc::new(transport),
        Normalizer::new(config.identity),
    )))
}

//! The real client stack (HttpTransport + MessageFeed) against a live relay.

use alertmesh_client::{
    AlertKind, HttpTransport, IdentityMode, MessageFeed, MessageTransport, MessageType, Normalizer,
    RefreshOutcome, SendOutcome,
};
use alertmesh_relay::{serve, AppState, RelayConfig};
use std::sync::Arc;
use time::UtcOffset;
use tokio::net::TcpListener;

async fn start_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cfg = RelayConfig {
        nickname: "Aaradhya".into(),
        ..RelayConfig::default()
    };
    tokio::spawn(serve(listener, AppState::new(cfg, UtcOffset::UTC), std::future::pending()));
    format!("http://{addr}")
}

fn feed_for(base: &str, identity: IdentityMode) -> MessageFeed {
    let transport = HttpTransport::new(base).unwrap();
    MessageFeed::new(Arc::new(transport), Normalizer::new(identity))
}

#[tokio::test]
async fn send_then_refresh_shows_the_message() {
    let base = start_relay().await;
    let feed = feed_for(&base, IdentityMode::Ephemeral);

    assert_eq!(feed.refresh().await, RefreshOutcome::Replaced(0));

    let outcome = feed.send("Hello, anyone near the river?").await;
    assert!(matches!(outcome, SendOutcome::Delivered(RefreshOutcome::Replaced(1))));

    let messages = feed.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, "Aaradhya");
    assert_eq!(messages[0].content, "Hello, anyone near the river?");
    assert_eq!(messages[0].kind, MessageType::Normal);
    assert!(feed.error().is_none());
    assert!(!feed.is_loading());
}

#[tokio::test]
async fn alerts_come_back_as_emergencies() {
    let base = start_relay().await;
    let feed = feed_for(&base, IdentityMode::Stable);

    feed.send_alert(AlertKind::Medical, "MEDICAL EMERGENCY - Need immediate medical assistance")
        .await;
    let messages = feed.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].content.starts_with("[MEDICAL] "));
    assert_eq!(messages[0].kind, MessageType::Emergency);

    // stable ids survive a second poll
    let first_id = messages[0].id.clone();
    feed.refresh().await;
    assert_eq!(feed.messages()[0].id, first_id);
}

#[tokio::test]
async fn relay_rejection_surfaces_as_send_failure() {
    let base = start_relay().await;
    let transport = HttpTransport::new(&base).unwrap();
    // the feed never posts blank text, so hit the transport directly
    let err = transport.post_message("").await.unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");
}

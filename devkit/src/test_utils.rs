/*!
Harness de test pour le feed AlertMesh

Assemble un [`MockTransport`] et un [`MessageFeed`], initialise les logs et
fournit des attentes avec timeout sur l'état du feed.
*/

use crate::transport_stub::MockTransport;
use alertmesh_client::{FeedEvent, IdentityMode, Message, MessageFeed, Normalizer};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub struct TestHarness {
    pub transport: MockTransport,
    pub feed: Arc<MessageFeed>,
    events: broadcast::Receiver<FeedEvent>,
}

impl TestHarness {
    /// Feed en identité éphémère, envois signés "You".
    pub fn new() -> Self {
        Self::with_identity("You", IdentityMode::Ephemeral)
    }

    pub fn with_identity(nickname: &str, identity: IdentityMode) -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        let transport = MockTransport::new(nickname);
        let feed = Arc::new(MessageFeed::new(
            Arc::new(transport.clone()),
            Normalizer::new(identity),
        ));
        let events = feed.subscribe();
        Self { transport, feed, events }
    }

    /// Attend que `predicate` soit vrai sur la liste courante.
    pub async fn wait_for<F>(&self, timeout_ms: u64, predicate: F) -> Result<Vec<Message>>
    where
        F: Fn(&[Message]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let messages = self.feed.messages();
            if predicate(messages.as_slice()) {
                return Ok(messages);
            }
            if tokio::time::Instant::now() >= deadline {
                log::warn!("⏰ Timeout waiting on feed ({} messages)", messages.len());
                anyhow::bail!("condition not met after {timeout_ms} ms ({} messages)", messages.len());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn wait_for_count(&self, count: usize, timeout_ms: u64) -> Result<Vec<Message>> {
        self.wait_for(timeout_ms, |messages| messages.len() == count).await
    }

    /// Événements reçus depuis le dernier appel, sans attendre.
    pub fn drain_events(&mut self) -> Vec<FeedEvent> {
        let mut drained = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => drained.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    log::warn!("🐢 harness lagged by {} events", skipped);
                }
                Err(_) => return drained,
            }
        }
    }

    pub fn assert_senders(&self, expected: &[&str]) -> Result<()> {
        let senders: Vec<String> = self.feed.messages().into_iter().map(|m| m.sender).collect();
        if senders != expected {
            anyhow::bail!("senders mismatch: expected {:?}, got {:?}", expected, senders);
        }
        log::info!("✅ senders {:?}", senders);
        Ok(())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertmesh_client::SendOutcome;

    #[tokio::test]
    async fn send_round_trips_through_the_mock_node() {
        let mut harness = TestHarness::new();
        harness.transport.push_message("Kabir", "anyone at the school?");

        let outcome = harness.feed.send("yes, two of us").await;
        assert!(matches!(outcome, SendOutcome::Delivered(_)));
        harness.assert_senders(&["Kabir", "You"]).unwrap();

        let events = harness.drain_events();
        assert_eq!(
            events,
            vec![FeedEvent::MessageSent, FeedEvent::MessagesReplaced { count: 2 }]
        );
        assert!(harness.drain_events().is_empty());
    }

    #[tokio::test]
    async fn wait_for_times_out() {
        let harness = TestHarness::new();
        assert!(harness.wait_for_count(1, 30).await.is_err());
        assert!(harness.wait_for_count(0, 30).await.is_ok());
    }
}

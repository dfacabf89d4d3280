/*!
Transport simulé pour tester le feed sans serveur

Se comporte comme un noeud minimal : chaque envoi réussi ajoute une ligne au
journal interne, chaque fetch renvoie ce journal. Des réponses scriptées
(liste, JSON arbitraire, erreur, avec délai optionnel) passent avant le
journal, dans l'ordre où elles ont été ajoutées.
*/

use crate::line_builder::LineBuilder;
use alertmesh_client::{MessageTransport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Fail(String),
}

#[derive(Debug, Clone)]
struct ScriptedFetch {
    reply: Reply,
    delay: Duration,
}

#[derive(Default)]
struct Inner {
    log: Vec<String>,
    script: VecDeque<ScriptedFetch>,
    posted: Vec<String>,
}

/// Implémente [`MessageTransport`] ; cloner partage le même état.
#[derive(Clone)]
pub struct MockTransport {
    nickname: String,
    inner: Arc<Mutex<Inner>>,
    fetches: Arc<AtomicUsize>,
    fail_fetches: Arc<AtomicBool>,
    fail_posts: Arc<AtomicBool>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Noeud dont les envois locaux sont signés `nickname`.
    pub fn new<S: Into<String>>(nickname: S) -> Self {
        Self {
            nickname: nickname.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
            fetches: Arc::new(AtomicUsize::new(0)),
            fail_fetches: Arc::new(AtomicBool::new(false)),
            fail_posts: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ajoute une ligne au journal, comme si un pair l'avait envoyée.
    pub fn push_line<S: Into<String>>(&self, line: S) -> &Self {
        lock(&self.inner).log.push(line.into());
        self
    }

    pub fn push_message(&self, sender: &str, text: &str) -> &Self {
        self.push_line(LineBuilder::new(sender).text(text).build())
    }

    /// Prochain fetch : ce JSON, après `delay`.
    pub fn script_json(&self, value: Value, delay: Duration) -> &Self {
        self.script(Reply::Json(value), delay)
    }

    /// Prochain fetch : ces lignes, après `delay`.
    pub fn script_lines(&self, lines: &[&str], delay: Duration) -> &Self {
        self.script_json(Value::from(lines.to_vec()), delay)
    }

    pub fn script_failure(&self, reason: &str, delay: Duration) -> &Self {
        self.script(Reply::Fail(reason.to_string()), delay)
    }

    fn script(&self, reply: Reply, delay: Duration) -> &Self {
        lock(&self.inner).script.push_back(ScriptedFetch { reply, delay });
        self
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Textes reçus par `post_message`, y compris ceux refusés.
    pub fn posted(&self) -> Vec<String> {
        lock(&self.inner).posted.clone()
    }

    pub fn log(&self) -> Vec<String> {
        lock(&self.inner).log.clone()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn fetch_messages(&self) -> Result<Value, TransportError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let scripted = lock(&self.inner).script.pop_front();

        let reply = match scripted {
            Some(ScriptedFetch { reply, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                reply
            }
            None if self.fail_fetches.load(Ordering::SeqCst) => {
                Reply::Fail("node unreachable".into())
            }
            None => Reply::Json(Value::from(lock(&self.inner).log.clone())),
        };

        match reply {
            Reply::Json(value) => {
                log::debug!("📥 [MOCK] fetch #{} answered", n);
                Ok(value)
            }
            Reply::Fail(reason) => {
                log::debug!("❌ [MOCK] fetch #{} failed: {}", n, reason);
                Err(TransportError::Unavailable(reason))
            }
        }
    }

    async fn post_message(&self, text: &str) -> Result<(), TransportError> {
        let mut inner = lock(&self.inner);
        inner.posted.push(text.to_string());
        if self.fail_posts.load(Ordering::SeqCst) {
            log::debug!("❌ [MOCK] post refused");
            return Err(TransportError::Unavailable("post refused".into()));
        }
        let line = LineBuilder::new(self.nickname.as_str()).text(text).build();
        inner.log.push(line);
        log::debug!("📤 [MOCK] posted {} bytes", text.len());
        Ok(())
    }
}

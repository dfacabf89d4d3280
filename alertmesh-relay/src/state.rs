/**
 * ÉTAT PARTAGÉ DU RELAIS
 *
 * Le journal des messages est la seule donnée du relais : une liste de lignes
 * texte, dans l'ordre d'arrivée, jamais réécrite. Mémoire uniquement, tout est
 * perdu à l'arrêt.
 */

use parking_lot::Mutex;
use std::sync::Arc;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Journal append-only des lignes "Received message at ... from ...: ...".
#[derive(Debug, Default, Clone)]
pub struct MessageLog {
    lines: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

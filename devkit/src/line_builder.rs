/*!
Fabrique de lignes brutes au format du noeud

`Received message at <horodatage> from <pseudo>: <texte>`, pour alimenter
un transport simulé sans démarrer de relais.
*/

use chrono::{DateTime, Local, TimeZone};

#[derive(Debug, Clone)]
pub struct LineBuilder {
    sender: String,
    text: String,
    at: Option<DateTime<Local>>,
}

impl LineBuilder {
    pub fn new<S: Into<String>>(sender: S) -> Self {
        Self {
            sender: sender.into(),
            text: String::new(),
            at: None,
        }
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn at(mut self, at: DateTime<Local>) -> Self {
        self.at = Some(at);
        self
    }

    /// Horodatage fixe à partir de composants locaux (ambiguïtés DST : plus tôt).
    pub fn at_local(self, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Self {
        match Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest() {
            Some(at) => self.at(at),
            None => self,
        }
    }

    pub fn build(&self) -> String {
        let at = self.at.unwrap_or_else(Local::now);
        format!(
            "Received message at {} from {}: {}",
            node_timestamp(at),
            self.sender,
            self.text
        )
    }
}

/// `2025-09-04 12:58:26.580751408 +0530 +0530`
pub fn node_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.9f %z %z").to_string()
}

pub fn raw_line(sender: &str, text: &str) -> String {
    LineBuilder::new(sender).text(text).build()
}

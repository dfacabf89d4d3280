use crate::state::{MessageLog, Shared};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayHealth {
    pub uptime_seconds: u64,
    pub messages_stored: u32,
    pub sends_accepted: u32,
    pub sends_rejected: u32,
    pub memory_usage_mb: f32,
    pub room: String,
    pub nickname: String,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    sends_accepted: Arc<AtomicU32>,
    sends_rejected: Arc<AtomicU32>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            sends_accepted: Arc::new(AtomicU32::new(0)),
            sends_rejected: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn record_accepted(&self) {
        self.sends_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.sends_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_health(&self, log: &Shared<MessageLog>, room: &str, nickname: &str) -> RelayHealth {
        RelayHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            messages_stored: log.lock().len() as u32,
            sends_accepted: self.sends_accepted.load(Ordering::Relaxed),
            sends_rejected: self.sends_rejected.load(Ordering::Relaxed),
            memory_usage_mb: get_memory_usage_mb(),
            room: room.to_string(),
            nickname: nickname.to_string(),
        }
    }
}

fn get_memory_usage_mb() -> f32 {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok());
            if let Some(kb) = rss_kb {
                return kb as f32 / 1024.0;
            }
        }
    }

    // inconnu hors Linux
    0.0
}

//! Small display helpers shared by the renderers (CLI included).

use crate::models::{ConnectionStatus, NetworkQuality, User, UserStatus};
use chrono::{DateTime, Local};

pub const AVATAR_PALETTE: [&str; 8] = [
    "red", "blue", "green", "yellow", "purple", "pink", "indigo", "teal",
];

pub const MAX_SIGNAL_BARS: u8 = 4;

/// `HH:MM` today, `Yesterday HH:MM`, otherwise `Mon DD, HH:MM`.
pub fn format_time(ts: DateTime<Local>, now: DateTime<Local>) -> String {
    let day = ts.date_naive();
    let today = now.date_naive();
    if day == today {
        ts.format("%H:%M").to_string()
    } else if today.pred_opt() == Some(day) {
        format!("Yesterday {}", ts.format("%H:%M"))
    } else {
        ts.format("%b %d, %H:%M").to_string()
    }
}

/// Up to two upper-case initials: "Aaradhya Rao" -> "AR".
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Stable palette pick for a name.
pub fn avatar_color(name: &str) -> &'static str {
    let hash = name
        .encode_utf16()
        .fold(0i32, |hash, unit| (unit as i32).wrapping_add((hash << 5).wrapping_sub(hash)));
    AVATAR_PALETTE[(hash.unsigned_abs() as usize) % AVATAR_PALETTE.len()]
}

pub fn status_label(status: &ConnectionStatus) -> String {
    if !status.is_connected {
        return "Disconnected".to_string();
    }
    let quality = match status.network_quality {
        NetworkQuality::Excellent => "excellent",
        NetworkQuality::Good => "good",
        NetworkQuality::Poor => "poor",
        NetworkQuality::Offline => "offline",
    };
    format!("Connected • {quality}")
}

/// Number of lit bars out of [`MAX_SIGNAL_BARS`].
pub fn signal_bars(status: &ConnectionStatus) -> u8 {
    match status.network_quality {
        NetworkQuality::Excellent => 4,
        NetworkQuality::Good => 3,
        NetworkQuality::Poor => 2,
        NetworkQuality::Offline => u8::from(status.is_connected),
    }
}

pub fn presence_label(user: &User, now: DateTime<Local>) -> String {
    match user.status {
        UserStatus::Online => "Online".to_string(),
        _ => format!("Last seen {}", format_time(user.last_seen, now)),
    }
}

//! Interactive first-time configuration for the `alertmesh` CLI.

use alertmesh_client::config::{BackoffConfig, ClientConfig, PollingConfig};
use alertmesh_client::{HttpTransport, IdentityMode, MessageTransport};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::time::Duration;

pub struct SetupWizard;

impl SetupWizard {
    pub async fn run(current: ClientConfig) -> Result<()> {
        println!();
        println!("🚨 ======================================");
        println!("   ALERTMESH CLIENT CONFIGURATION");
        println!("🚨 ======================================");
        println!();

        let server_base_url = Self::configure_server(&current.server_base_url).await?;
        let nickname =
            Self::prompt_until("Nickname shown to peers", &current.nickname, parse_nickname)?;
        let room_name = Self::prompt_until("Room name", &current.room_name, parse_room)?;
        let polling = Self::configure_polling(&current.polling)?;
        let identity = Self::configure_identity(current.identity)?;

        let config = ClientConfig {
            server_base_url,
            nickname,
            room_name,
            identity,
            polling,
        };
        config.validate().context("Configuration is not valid")?;

        Self::display_summary(&config);
        if Self::prompt_yes_no("💾 Save this configuration?", true)? {
            let path = config.save().await.context("Failed to save configuration")?;
            println!();
            println!("✅ Configuration saved to {}", path.display());
        } else {
            println!("❌ Configuration cancelled.");
        }
        Ok(())
    }

    async fn configure_server(default: &str) -> Result<String> {
        println!("🌐 SERVER");
        println!("────────────────────────────────────────");
        let (url, transport) = Self::prompt_until("Node HTTP endpoint", default, |input| {
            HttpTransport::with_timeout(input, Some(Duration::from_secs(5)))
                .map(|transport| (input.trim_end_matches('/').to_string(), transport))
                .map_err(|e| e.to_string())
        })?;
        match transport.fetch_messages().await {
            Ok(_) => println!("✅ {} is reachable", transport.messages_url()),
            Err(e) => println!("⚠️  Could not reach the node yet: {e}"),
        }
        println!();
        Ok(url)
    }

    fn configure_polling(current: &PollingConfig) -> Result<PollingConfig> {
        println!("⏱️  POLLING");
        println!("────────────────────────────────────────");
        let interval_ms = Self::prompt_until(
            "Poll interval (ms)",
            &current.interval_ms.to_string(),
            parse_interval_ms,
        )?;
        let backoff = if Self::prompt_yes_no(
            "Slow down while the node is unreachable?",
            current.backoff.is_some(),
        )? {
            let default_max = current
                .backoff
                .as_ref()
                .map_or(30_000, |b| b.max_interval_ms)
                .max(interval_ms);
            Some(BackoffConfig {
                multiplier: 2.0,
                max_interval_ms: Self::prompt_until(
                    "Longest wait between polls (ms)",
                    &default_max.to_string(),
                    |input| parse_max_interval_ms(input, interval_ms),
                )?,
            })
        } else {
            None
        };
        println!();
        Ok(PollingConfig {
            interval_ms,
            request_timeout_ms: current.request_timeout_ms,
            backoff,
        })
    }

    fn configure_identity(current: IdentityMode) -> Result<IdentityMode> {
        println!("🔑 Message identity:");
        println!("  ephemeral - new id on every poll");
        println!("  stable    - id derived from sender, text and time");
        Self::prompt_until("Identity", identity_name(current), parse_identity)
    }

    fn display_summary(config: &ClientConfig) {
        println!();
        println!("📋 SUMMARY");
        println!("────────────────────────────────────────");
        println!("🌐 Server:   {}", config.server_base_url);
        println!("👤 Nickname: {}", config.nickname);
        println!("🏠 Room:     {}", config.room_name);
        println!("⏱️  Interval: {} ms", config.polling.interval_ms);
        match &config.polling.backoff {
            Some(b) => println!("🐢 Backoff:  x{} up to {} ms", b.multiplier, b.max_interval_ms),
            None => println!("🐢 Backoff:  off"),
        }
        println!("🔑 Identity: {:?}", config.identity);
        println!();
    }

    fn read_trimmed() -> Result<String> {
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Re-asks until `parse` accepts the answer (empty answer = `default`).
    fn prompt_until<T>(
        prompt: &str,
        default: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T> {
        loop {
            print!("❓ {} [{}]: ", prompt, default);
            let input = Self::read_trimmed()?;
            let answer = if input.is_empty() { default } else { input.as_str() };
            match parse(answer) {
                Ok(value) => return Ok(value),
                Err(reason) => println!("❌ {reason}"),
            }
        }
    }

    fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
        Self::prompt_until(prompt, if default { "y" } else { "n" }, parse_yes_no)
    }
}

fn parse_nickname(input: &str) -> Result<String, String> {
    let nick = input.trim();
    if nick.is_empty() {
        return Err("Nickname cannot be empty.".into());
    }
    // the node writes "from <nick>: <text>"; a ": " inside the nick would split there
    if nick.contains(": ") {
        return Err("Nickname cannot contain \": \".".into());
    }
    Ok(nick.to_string())
}

fn parse_room(input: &str) -> Result<String, String> {
    let room = input.trim();
    if room.is_empty() || room.chars().any(char::is_whitespace) {
        return Err("Room name must be a single non-empty word.".into());
    }
    Ok(room.to_string())
}

fn parse_interval_ms(input: &str) -> Result<u64, String> {
    match input.trim().parse::<u64>() {
        Ok(0) => Err("Interval must be greater than zero.".into()),
        Ok(ms) => Ok(ms),
        Err(_) => Err(format!("{input:?} is not a number of milliseconds.")),
    }
}

fn parse_max_interval_ms(input: &str, interval_ms: u64) -> Result<u64, String> {
    let ms = parse_interval_ms(input)?;
    if ms < interval_ms {
        return Err(format!("Must be at least the poll interval ({interval_ms} ms)."));
    }
    Ok(ms)
}

fn identity_name(mode: IdentityMode) -> &'static str {
    match mode {
        IdentityMode::Ephemeral => "ephemeral",
        IdentityMode::Stable => "stable",
    }
}

fn parse_identity(input: &str) -> Result<IdentityMode, String> {
    match input.trim().to_lowercase().as_str() {
        "ephemeral" | "e" => Ok(IdentityMode::Ephemeral),
        "stable" | "s" => Ok(IdentityMode::Stable),
        other => Err(format!("Unknown identity {other:?}, pick ephemeral or stable.")),
    }
}

fn parse_yes_no(input: &str) -> Result<bool, String> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err("Please enter 'y' or 'n'.".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_must_survive_the_log_line_format() {
        assert_eq!(parse_nickname("  Aaradhya ").unwrap(), "Aaradhya");
        assert!(parse_nickname("   ").is_err());
        assert!(parse_nickname("Team: Alpha").is_err());
        assert_eq!(parse_nickname("Team:Alpha").unwrap(), "Team:Alpha");
    }

    #[test]
    fn room_is_one_word() {
        assert_eq!(parse_room("emergency-chat").unwrap(), "emergency-chat");
        assert!(parse_room("two words").is_err());
        assert!(parse_room("").is_err());
    }

    #[test]
    fn intervals_are_positive_and_ordered() {
        assert_eq!(parse_interval_ms("2000").unwrap(), 2000);
        assert!(parse_interval_ms("0").is_err());
        assert!(parse_interval_ms("2s").is_err());
        assert!(parse_max_interval_ms("1000", 2000).is_err());
        assert_eq!(parse_max_interval_ms("30000", 2000).unwrap(), 30_000);
    }

    #[test]
    fn identity_and_yes_no_answers() {
        assert_eq!(parse_identity("Stable").unwrap(), IdentityMode::Stable);
        assert_eq!(parse_identity("e").unwrap(), IdentityMode::Ephemeral);
        assert!(parse_identity("random").is_err());
        assert_eq!(identity_name(IdentityMode::Stable), "stable");
        assert!(parse_yes_no("YES").unwrap());
        assert!(!parse_yes_no("n").unwrap());
        assert!(parse_yes_no("maybe").is_err());
    }
}

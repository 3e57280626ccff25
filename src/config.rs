//! Runtime settings for the widget core.

use std::time::Duration;

/// Default delay before the style assistant delivers a reply.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1500;

/// Default number of retries after a failed style reply.
pub const DEFAULT_REPLY_RETRIES: u32 = 2;

/// Default base backoff between style reply retries (doubles each attempt).
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;

/// Widget runtime settings.
#[derive(Debug, Clone)]
pub struct WidgetSettings {
    /// Simulated processing delay before a style reply is delivered.
    pub reply_delay: Duration,
    /// Reject untyped config patches that carry unknown fields.
    pub strict_config: bool,
    /// Seed for the style preset picker. `None` seeds from entropy.
    pub style_seed: Option<u64>,
    /// Retries after a failed style reply.
    pub reply_retries: u32,
    /// Base backoff between retries.
    pub retry_backoff: Duration,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            strict_config: false,
            style_seed: None,
            reply_retries: DEFAULT_REPLY_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl WidgetSettings {
    /// Load settings from `PAYOUT_WIDGET_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let reply_delay_ms: u64 = std::env::var("PAYOUT_WIDGET_REPLY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REPLY_DELAY_MS);

        let strict_config = std::env::var("PAYOUT_WIDGET_STRICT_CONFIG")
            .map(|s| parse_flag(&s))
            .unwrap_or(false);

        let style_seed: Option<u64> = std::env::var("PAYOUT_WIDGET_STYLE_SEED")
            .ok()
            .and_then(|s| s.parse().ok());

        let reply_retries: u32 = std::env::var("PAYOUT_WIDGET_REPLY_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_REPLY_RETRIES);

        let retry_backoff_ms: u64 = std::env::var("PAYOUT_WIDGET_RETRY_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_BACKOFF_MS);

        Self {
            reply_delay: Duration::from_millis(reply_delay_ms),
            strict_config,
            style_seed,
            reply_retries,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
        }
    }

    /// Settings with no reply delay and a fixed seed, for tests and demos.
    pub fn immediate(seed: u64) -> Self {
        Self {
            reply_delay: Duration::ZERO,
            style_seed: Some(seed),
            retry_backoff: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

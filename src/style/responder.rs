//! Style responder: turns a chat request into a suggestion.

use std::time::Duration;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StyleError;

use super::rules::{StyleRules, StyleSuggestion};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRequest {
    pub text: String,
    /// A logo image was attached to the message.
    pub has_image: bool,
}

/// Produces style suggestions for chat requests.
#[async_trait]
pub trait StyleResponder: Send + Sync {
    fn name(&self) -> &str;

    async fn respond(&self, request: &StyleRequest) -> Result<StyleSuggestion, StyleError>;
}

/// Responder backed by the keyword rule table and a seedable RNG.
pub struct KeywordResponder {
    rules: StyleRules,
    rng: Mutex<StdRng>,
}

impl KeywordResponder {
    /// `seed = None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_rules(StyleRules::default_rules(), seed)
    }

    pub fn with_rules(rules: StyleRules, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rules,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl StyleResponder for KeywordResponder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn respond(&self, request: &StyleRequest) -> Result<StyleSuggestion, StyleError> {
        let mut rng = self.rng.lock().await;
        Ok(self
            .rules
            .interpret(&request.text, request.has_image, &mut *rng))
    }
}

/// Call `responder`, retrying failures with exponential backoff.
///
/// Makes at most `retries + 1` attempts. Cancellation is never retried.
pub async fn respond_with_retry(
    responder: &dyn StyleResponder,
    request: &StyleRequest,
    retries: u32,
    backoff: Duration,
) -> Result<StyleSuggestion, StyleError> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match responder.respond(request).await {
            Ok(suggestion) => return Ok(suggestion),
            Err(StyleError::Cancelled) => return Err(StyleError::Cancelled),
            Err(e) if attempt > retries => {
                warn!(responder = responder.name(), attempt, error = %e, "Style request failed, giving up");
                return Err(StyleError::RequestFailed {
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                let delay = backoff.saturating_mul(1 << (attempt - 1).min(16));
                warn!(
                    responder = responder.name(),
                    attempt,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Style request failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

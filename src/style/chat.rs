//! Conversational style assistant.
//!
//! The user describes their brand (optionally attaching a logo) and the
//! assistant answers with a style suggestion after a short delay. While a
//! reply is pending a loading placeholder sits at the end of the transcript;
//! the reply replaces it in place. At most one reply is in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WidgetSettings;
use crate::error::StyleError;

use super::responder::{StyleRequest, StyleResponder, respond_with_retry};
use super::rules::StyleSuggestion;

pub const GREETING: &str = "Hi! I'm your style assistant. Describe your brand's look and feel, or upload your logo, and I'll design a matching theme for your widget.";

/// Placeholder content shown while a reply is pending.
pub const LOADING_TEXT: &str = "Designing your style...";

/// Sent on the user's behalf when only a logo is attached.
pub const LOGO_ONLY_TEXT: &str = "I've uploaded a logo for my brand.";

const FAILURE_TEXT: &str =
    "Sorry, I couldn't put a style together just now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    /// Loading placeholder awaiting a reply.
    pub is_loading: bool,
    /// A logo was attached to this (user) message.
    pub has_image: bool,
    /// Preset proposed by this (assistant) message.
    pub preset: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            is_loading: false,
            has_image: false,
            preset: None,
            created_at: Utc::now(),
        }
    }

    fn greeting() -> Self {
        Self::new(ChatRole::Assistant, GREETING)
    }

    fn placeholder() -> Self {
        Self {
            is_loading: true,
            ..Self::new(ChatRole::Assistant, LOADING_TEXT)
        }
    }
}

/// An attached logo awaiting the next `send`.
#[derive(Debug, Clone)]
pub struct LogoUpload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Handle on a scheduled reply.
pub struct ReplyTicket {
    rx: oneshot::Receiver<Result<StyleSuggestion, StyleError>>,
}

impl ReplyTicket {
    /// Wait for the reply. A cancelled reply yields `Cancelled`.
    pub async fn wait(self) -> Result<StyleSuggestion, StyleError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(StyleError::Cancelled),
        }
    }

    pub async fn wait_timeout(self, timeout: Duration) -> Result<StyleSuggestion, StyleError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StyleError::Timeout { timeout })?
    }
}

struct PendingReply {
    placeholder_id: Uuid,
    cancel: Arc<AtomicBool>,
    /// Set by the reply task once its outcome is final.
    settled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl PendingReply {
    fn is_running(&self) -> bool {
        !self.settled.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

pub struct StyleChat {
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
    responder: Arc<dyn StyleResponder>,
    logo: Option<LogoUpload>,
    pending: Option<PendingReply>,
    reply_delay: Duration,
    retries: u32,
    backoff: Duration,
}

impl StyleChat {
    pub fn new(responder: Arc<dyn StyleResponder>, settings: &WidgetSettings) -> Self {
        Self {
            transcript: Arc::new(RwLock::new(vec![ChatMessage::greeting()])),
            responder,
            logo: None,
            pending: None,
            reply_delay: settings.reply_delay,
            retries: settings.reply_retries,
            backoff: settings.retry_backoff,
        }
    }

    /// Snapshot of the transcript.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.read().await.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.pending.as_ref().is_some_and(PendingReply::is_running)
    }

    pub fn logo(&self) -> Option<&LogoUpload> {
        self.logo.as_ref()
    }

    /// Attach a logo to the next message. Only `image/*` types are accepted.
    pub fn attach_logo(&mut self, mime: &str, bytes: Vec<u8>) -> Result<(), StyleError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            warn!(mime = %mime, "Rejected logo upload");
            return Err(StyleError::UnsupportedUpload { mime });
        }
        debug!(mime = %mime, size = bytes.len(), "Logo attached");
        self.logo = Some(LogoUpload { mime, bytes });
        Ok(())
    }

    pub fn clear_logo(&mut self) -> bool {
        self.logo.take().is_some()
    }

    /// Post a user message and schedule the assistant's reply.
    ///
    /// Rejected while another reply is pending. Blank text is only allowed
    /// when a logo is attached, in which case a default text is sent.
    pub async fn send(&mut self, text: &str) -> Result<ReplyTicket, StyleError> {
        self.clear_settled();
        if self.is_processing() {
            return Err(StyleError::RequestPending);
        }

        let has_image = self.logo.is_some();
        let text = match text.trim() {
            "" if has_image => LOGO_ONLY_TEXT.to_string(),
            "" => return Err(StyleError::EmptyMessage),
            t => t.to_string(),
        };
        self.logo = None;

        let user = ChatMessage {
            has_image,
            ..ChatMessage::new(ChatRole::User, text.clone())
        };
        let placeholder = ChatMessage::placeholder();
        let placeholder_id = placeholder.id;
        {
            let mut messages = self.transcript.write().await;
            messages.push(user);
            messages.push(placeholder);
        }

        let request = StyleRequest { text, has_image };
        let (tx, rx) = oneshot::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let settled = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(deliver_reply(
            Arc::clone(&self.transcript),
            Arc::clone(&self.responder),
            request,
            placeholder_id,
            ReplySignals {
                cancel: Arc::clone(&cancel),
                settled: Arc::clone(&settled),
                tx,
            },
            ReplyTiming {
                delay: self.reply_delay,
                retries: self.retries,
                backoff: self.backoff,
            },
        ));

        info!(
            responder = self.responder.name(),
            has_image,
            delay_ms = self.reply_delay.as_millis() as u64,
            "Style reply scheduled"
        );
        self.pending = Some(PendingReply {
            placeholder_id,
            cancel,
            settled,
            handle,
        });

        Ok(ReplyTicket { rx })
    }

    /// Abort the pending reply and drop its placeholder. Returns whether a
    /// reply was still in flight. A delivered reply is never touched.
    pub async fn cancel(&mut self) -> bool {
        self.clear_settled();
        let Some(pending) = self.pending.take() else {
            return false;
        };

        // Flag set under the transcript lock: the reply task either wrote
        // before this point or will see the flag and drop its result.
        let mut messages = self.transcript.write().await;
        pending.cancel.store(true, Ordering::SeqCst);
        pending.handle.abort();

        let before = messages.len();
        messages.retain(|m| !(m.id == pending.placeholder_id && m.is_loading));
        let removed = messages.len() != before;
        if removed {
            info!("Pending style reply cancelled");
        }
        removed
    }

    /// Forget a reply task whose outcome is already final.
    fn clear_settled(&mut self) {
        if self.pending.as_ref().is_some_and(|p| !p.is_running()) {
            self.pending = None;
        }
    }

    /// Cancel any pending reply, drop the logo and restore the greeting.
    pub async fn reset(&mut self) {
        self.cancel().await;
        self.logo = None;
        *self.transcript.write().await = vec![ChatMessage::greeting()];
        info!("Style chat reset");
    }
}

impl Drop for StyleChat {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.store(true, Ordering::SeqCst);
            pending.handle.abort();
        }
    }
}

struct ReplySignals {
    cancel: Arc<AtomicBool>,
    settled: Arc<AtomicBool>,
    tx: oneshot::Sender<Result<StyleSuggestion, StyleError>>,
}

impl ReplySignals {
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn settle(self, result: Result<StyleSuggestion, StyleError>) {
        self.settled.store(true, Ordering::SeqCst);
        let _ = self.tx.send(result);
    }
}

#[derive(Clone, Copy)]
struct ReplyTiming {
    delay: Duration,
    retries: u32,
    backoff: Duration,
}

async fn deliver_reply(
    transcript: Arc<RwLock<Vec<ChatMessage>>>,
    responder: Arc<dyn StyleResponder>,
    request: StyleRequest,
    placeholder_id: Uuid,
    signals: ReplySignals,
    timing: ReplyTiming,
) {
    tokio::time::sleep(timing.delay).await;
    if signals.cancelled() {
        signals.settle(Err(StyleError::Cancelled));
        return;
    }

    let result =
        respond_with_retry(responder.as_ref(), &request, timing.retries, timing.backoff).await;

    // Re-checked under the write lock: once cancel() has set the flag, no
    // write can follow.
    let mut messages = transcript.write().await;
    if signals.cancelled() {
        debug!("Style reply dropped after cancellation");
        drop(messages);
        signals.settle(Err(StyleError::Cancelled));
        return;
    }

    if let Some(msg) = messages.iter_mut().find(|m| m.id == placeholder_id) {
        msg.is_loading = false;
        msg.created_at = Utc::now();
        match &result {
            Ok(suggestion) => {
                msg.content = suggestion.rationale.clone();
                msg.preset = Some(suggestion.preset.name.to_string());
            }
            Err(_) => msg.content = FAILURE_TEXT.to_string(),
        }
    }
    drop(messages);

    match &result {
        Ok(suggestion) => info!(preset = suggestion.preset.name, "Style reply delivered"),
        Err(e) => warn!(error = %e, "Style reply failed"),
    }
    signals.settle(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::responder::KeywordResponder;
    use async_trait::async_trait;

    struct AlwaysFails;

    #[async_trait]
    impl StyleResponder for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }

        async fn respond(&self, _request: &StyleRequest) -> Result<StyleSuggestion, StyleError> {
            Err(StyleError::RequestFailed {
                attempts: 1,
                reason: "offline".into(),
            })
        }
    }

    fn chat(delay: Duration) -> StyleChat {
        let settings = WidgetSettings {
            reply_delay: delay,
            ..WidgetSettings::immediate(5)
        };
        StyleChat::new(Arc::new(KeywordResponder::new(Some(5))), &settings)
    }

    #[tokio::test]
    async fn starts_with_greeting() {
        let c = chat(Duration::ZERO);
        let messages = c.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::Assistant);
        assert_eq!(messages[0].content, GREETING);
    }

    #[tokio::test]
    async fn reply_replaces_placeholder() {
        let mut c = chat(Duration::ZERO);
        let ticket = c.send("Our colors are ocean blue").await.unwrap();
        let suggestion = ticket.wait().await.unwrap();
        assert_eq!(suggestion.preset.name, "Modern Blue");

        let messages = c.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "Our colors are ocean blue");
        assert!(!messages[2].is_loading);
        assert_eq!(messages[2].preset.as_deref(), Some("Modern Blue"));
        assert!(!c.is_processing());
    }

    #[tokio::test]
    async fn placeholder_visible_while_pending() {
        let mut c = chat(Duration::from_secs(60));
        let _ticket = c.send("something warm").await.unwrap();
        let messages = c.messages().await;
        let last = messages.last().unwrap();
        assert!(last.is_loading);
        assert_eq!(last.content, LOADING_TEXT);
        assert!(c.is_processing());
    }

    #[tokio::test]
    async fn blank_message_without_logo_is_rejected() {
        let mut c = chat(Duration::ZERO);
        assert!(matches!(c.send("   ").await, Err(StyleError::EmptyMessage)));
        assert_eq!(c.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn logo_only_message_uses_default_text() {
        let mut c = chat(Duration::ZERO);
        c.attach_logo("image/png", vec![0x89, 0x50]).unwrap();
        let suggestion = c.send("").await.unwrap().wait().await.unwrap();
        assert!(matches!(suggestion.basis, crate::style::MatchBasis::BrandAsset));

        let messages = c.messages().await;
        assert_eq!(messages[1].content, LOGO_ONLY_TEXT);
        assert!(messages[1].has_image);
        assert!(c.logo().is_none());
    }

    #[test]
    fn non_image_upload_is_rejected() {
        let mut c = chat(Duration::ZERO);
        let err = c.attach_logo("application/pdf", vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            StyleError::UnsupportedUpload {
                mime: "application/pdf".into()
            }
        );
        assert!(c.logo().is_none());
    }

    #[tokio::test]
    async fn overlapping_send_is_rejected() {
        let mut c = chat(Duration::from_secs(60));
        let _first = c.send("blue").await.unwrap();
        assert!(matches!(c.send("green").await, Err(StyleError::RequestPending)));
        assert_eq!(c.messages().await.len(), 3);
    }

    #[tokio::test]
    async fn cancel_drops_placeholder_and_reply() {
        let mut c = chat(Duration::from_secs(60));
        let ticket = c.send("purple").await.unwrap();
        assert!(c.cancel().await);
        assert!(!c.is_processing());
        assert!(matches!(ticket.wait().await, Err(StyleError::Cancelled)));

        let messages = c.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.is_loading));
        assert!(!c.cancel().await);
    }

    #[tokio::test]
    async fn cancel_after_delivery_keeps_the_reply() {
        let mut c = chat(Duration::ZERO);
        c.send("ocean blue").await.unwrap().wait().await.unwrap();
        assert!(!c.is_processing());

        assert!(!c.cancel().await);
        let messages = c.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[2].preset.as_deref(), Some("Modern Blue"));
        assert!(!c.cancel().await);
    }

    #[tokio::test]
    async fn reset_restores_greeting() {
        let mut c = chat(Duration::from_secs(60));
        c.attach_logo("image/svg+xml", vec![]).unwrap();
        let _ticket = c.send("eco").await.unwrap();
        c.reset().await;

        let messages = c.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, GREETING);
        assert!(!c.is_processing());
        assert!(c.logo().is_none());
    }

    #[tokio::test]
    async fn failed_reply_reports_error() {
        let settings = WidgetSettings {
            reply_retries: 1,
            ..WidgetSettings::immediate(1)
        };
        let mut c = StyleChat::new(Arc::new(AlwaysFails), &settings);
        let err = c.send("blue").await.unwrap().wait().await.unwrap_err();
        assert!(matches!(err, StyleError::RequestFailed { attempts: 2, .. }));

        let messages = c.messages().await;
        assert_eq!(messages[2].content, FAILURE_TEXT);
        assert!(!messages[2].is_loading);
    }

    #[tokio::test]
    async fn wait_timeout_expires() {
        let mut c = chat(Duration::from_secs(60));
        let ticket = c.send("tech").await.unwrap();
        let err = ticket
            .wait_timeout(Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, StyleError::Timeout { .. }));
    }
}

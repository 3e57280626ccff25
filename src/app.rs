//! Widget container: one config store, one wizard, one style assistant.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::WidgetSettings;
use crate::error::{FlowError, Result};
use crate::flow::{
    DetailOption, InvoiceRecord, PayoutMethod, SessionState, StepFlowController, StepOutcome,
    StepSequence, TaxForm, WizardStep,
};
use crate::style::{
    ChatMessage, KeywordResponder, PreviewState, ReplyTicket, StyleChat, StyleConfigurator,
    StylePreset, StyleResponder, StyleSuggestion,
};
use crate::widget::{ConfigStore, VerificationStep, WidgetConfig, WidgetKey};

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub widget_key: u64,
    pub config: WidgetConfig,
    pub steps: Vec<WizardStep>,
    pub current_step: Option<WizardStep>,
    pub session: SessionState,
    pub preview: Option<PreviewState>,
    pub messages: Vec<ChatMessage>,
    pub processing: bool,
}

/// The payout onboarding widget.
///
/// The wizard's step sequence follows the configured verification steps and
/// is rebuilt whenever they change through this container.
pub struct PayoutWidget {
    settings: WidgetSettings,
    store: Arc<ConfigStore>,
    flow: StepFlowController,
    styler: StyleConfigurator,
    chat: StyleChat,
}

impl PayoutWidget {
    /// Build a widget with default config and the keyword responder.
    pub fn new(settings: WidgetSettings) -> Self {
        let responder = Arc::new(KeywordResponder::new(settings.style_seed));
        Self::with_responder(settings, responder)
    }

    pub fn with_responder(settings: WidgetSettings, responder: Arc<dyn StyleResponder>) -> Self {
        let store = ConfigStore::new(settings.strict_config);
        Self::assemble(settings, store, WidgetConfig::default(), responder)
    }

    /// Build a widget around an existing configuration.
    pub fn with_config(
        settings: WidgetSettings,
        config: WidgetConfig,
        responder: Arc<dyn StyleResponder>,
    ) -> Self {
        let store = ConfigStore::with_config(config.clone(), settings.strict_config);
        Self::assemble(settings, store, config, responder)
    }

    fn assemble(
        settings: WidgetSettings,
        store: Arc<ConfigStore>,
        config: WidgetConfig,
        responder: Arc<dyn StyleResponder>,
    ) -> Self {
        let flow = StepFlowController::new(StepSequence::from_config(&config.enabled_steps));
        let styler = StyleConfigurator::new(Arc::clone(&store), WidgetKey::new());
        let chat = StyleChat::new(responder, &settings);
        Self {
            settings,
            store,
            flow,
            styler,
            chat,
        }
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn flow(&self) -> &StepFlowController {
        &self.flow
    }

    pub fn chat(&self) -> &StyleChat {
        &self.chat
    }

    pub fn styler(&self) -> &StyleConfigurator {
        &self.styler
    }

    pub fn widget_key(&self) -> u64 {
        self.styler.widget_key().current()
    }

    pub async fn config(&self) -> WidgetConfig {
        self.store.get().await
    }

    pub async fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            widget_key: self.widget_key(),
            config: self.store.get().await,
            steps: self.flow.sequence().steps().to_vec(),
            current_step: self.flow.current_step(),
            session: self.flow.session().clone(),
            preview: self.styler.preview().cloned(),
            messages: self.chat.messages().await,
            processing: self.chat.is_processing(),
        }
    }

    // ── Session ────────────────────────────────────────────────────

    /// Begin onboarding from the first configured step.
    pub async fn restart(&mut self) {
        self.chat.cancel().await;
        self.refresh_sequence().await;
        self.flow.restart();
    }

    pub fn login(&mut self) {
        self.flow.login();
    }

    pub async fn logout(&mut self) {
        self.chat.cancel().await;
        self.flow.logout();
    }

    // ── Wizard ─────────────────────────────────────────────────────

    pub fn advance(&mut self) -> Result<StepOutcome> {
        Ok(self.flow.advance()?)
    }

    pub fn retreat(&mut self) -> StepOutcome {
        self.flow.retreat()
    }

    pub fn go_to(&mut self, step: WizardStep) -> Result<()> {
        Ok(self.flow.go_to(step)?)
    }

    /// Choose a payout method. Methods disabled in the config are refused.
    pub async fn select_method(&mut self, method: PayoutMethod) -> Result<()> {
        if !self.store.get().await.is_method_enabled(method) {
            return Err(FlowError::MethodDisabled {
                method: method.to_string(),
            }
            .into());
        }
        self.flow.select_method(method);
        Ok(())
    }

    pub fn select_detail_option(&mut self, option: DetailOption) -> Result<()> {
        Ok(self.flow.select_detail_option(option)?)
    }

    pub fn update_form_field(&mut self, field: &str, value: &str) {
        self.flow.update_form_field(field, value);
    }

    pub fn submit_tax_form(&mut self, form: &TaxForm) -> Result<StepOutcome> {
        Ok(self.flow.submit_tax_form(form)?)
    }

    pub fn change_payout_method(&mut self) -> Result<()> {
        Ok(self.flow.change_payout_method()?)
    }

    // ── Dashboard ──────────────────────────────────────────────────

    /// Close the success screen and show the payout dashboard.
    pub fn dismiss_success(&mut self) -> Result<()> {
        Ok(self.flow.dismiss_success()?)
    }

    /// Attach an invoice file, numbered for today's date.
    pub fn upload_invoice(&mut self, file_name: &str) -> Result<InvoiceRecord> {
        let today = Utc::now().date_naive();
        Ok(self.flow.upload_invoice(file_name, today)?.clone())
    }

    pub fn view_invoice(&mut self, key: &str) -> Result<InvoiceRecord> {
        Ok(self.flow.view_invoice(key)?.clone())
    }

    pub fn close_invoice(&mut self) -> bool {
        self.flow.close_invoice()
    }

    // ── Configuration ──────────────────────────────────────────────

    pub async fn toggle_step(&mut self, step: VerificationStep) {
        self.store.toggle_step(step).await;
        self.refresh_sequence().await;
    }

    pub async fn toggle_payout_method(&mut self, method: PayoutMethod) {
        self.store.toggle_payout_method(method).await;
    }

    pub async fn set_payouts_only_mode(&mut self, enabled: bool) {
        self.store.set_payouts_only_mode(enabled).await;
        self.refresh_sequence().await;
    }

    /// Apply an untyped config patch.
    pub async fn update_config_json(&mut self, value: serde_json::Value) -> Result<()> {
        self.store.update_json(value).await?;
        self.refresh_sequence().await;
        Ok(())
    }

    pub async fn reset_config(&mut self) {
        self.store.reset().await;
        self.styler.discard();
        self.refresh_sequence().await;
    }

    async fn refresh_sequence(&mut self) {
        let config = self.store.get().await;
        let sequence = StepSequence::from_config(&config.enabled_steps);
        if &sequence != self.flow.sequence() {
            debug!(steps = sequence.len(), "Rebuilding wizard steps from config");
            self.flow.set_sequence(sequence);
        }
    }

    // ── Style ──────────────────────────────────────────────────────

    pub fn attach_logo(&mut self, mime: &str, bytes: Vec<u8>) -> Result<()> {
        Ok(self.chat.attach_logo(mime, bytes)?)
    }

    /// Post a message to the style assistant.
    pub async fn send_style_message(&mut self, text: &str) -> Result<ReplyTicket> {
        Ok(self.chat.send(text).await?)
    }

    /// Post a message, wait for the reply and preview its preset.
    pub async fn request_style(&mut self, text: &str) -> Result<PreviewState> {
        let ticket = self.chat.send(text).await?;
        let suggestion = ticket.wait().await?;
        Ok(self.preview_suggestion(&suggestion).await)
    }

    pub async fn preview_suggestion(&mut self, suggestion: &StyleSuggestion) -> PreviewState {
        self.styler.propose(&suggestion.preset).await
    }

    pub async fn preview_preset(&mut self, preset: &StylePreset) -> PreviewState {
        self.styler.propose(preset).await
    }

    /// Commit the pending preview. Returns the new widget key.
    pub async fn apply_style(&mut self) -> Result<u64> {
        Ok(self.styler.apply().await?)
    }

    pub fn discard_style(&mut self) -> bool {
        self.styler.discard()
    }

    pub async fn cancel_style_request(&mut self) -> bool {
        self.chat.cancel().await
    }

    /// Clear the conversation and any pending preview.
    pub async fn reset_chat(&mut self) {
        self.chat.reset().await;
        if self.styler.discard() {
            info!("Pending style preview discarded");
        }
    }
}

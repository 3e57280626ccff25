//! Integration tests for the payout widget container.
//!
//! Each test builds a `PayoutWidget` with zero reply delay (or a long one
//! when cancellation is under test) and drives it through the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use payout_widget::error::{ConfigError, Error, FlowError, StyleError};
use payout_widget::flow::{
    DetailOption, FlowPhase, PayoutMethod, PayoutStatus, StepOutcome, TaxForm, TaxFormType,
    WizardStep,
};
use payout_widget::style::presets::{self, StylePreset};
use payout_widget::style::{
    KeywordResponder, MatchBasis, StyleRequest, StyleResponder, StyleSuggestion,
};
use payout_widget::widget::{ConfigEvent, VerificationStep, WidgetConfig};
use payout_widget::{PayoutWidget, WidgetSettings};

/// Maximum time any reply is allowed to take before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub responder that always proposes one preset and counts calls.
struct FixedResponder {
    preset: StylePreset,
    calls: AtomicU32,
}

impl FixedResponder {
    fn new(preset: StylePreset) -> Arc<Self> {
        Arc::new(Self {
            preset,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl StyleResponder for FixedResponder {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn respond(&self, _request: &StyleRequest) -> Result<StyleSuggestion, StyleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StyleSuggestion {
            preset: self.preset,
            rationale: format!("Try {}.", self.preset.name),
            basis: MatchBasis::Fallback,
        })
    }
}

fn settings() -> WidgetSettings {
    WidgetSettings::immediate(42)
}

fn slow_settings() -> WidgetSettings {
    WidgetSettings {
        reply_delay: Duration::from_secs(60),
        ..WidgetSettings::immediate(42)
    }
}

/// Widget whose steps are exactly profile, payout, details, bank, tax.
fn five_step_widget() -> PayoutWidget {
    let config = WidgetConfig {
        enabled_steps: vec![
            VerificationStep::Profile,
            VerificationStep::Bank,
            VerificationStep::Tax,
        ],
        ..WidgetConfig::default()
    };
    PayoutWidget::with_config(
        settings(),
        config,
        Arc::new(KeywordResponder::new(Some(42))),
    )
}

fn step_index(widget: &PayoutWidget) -> usize {
    widget.flow().session().current_step_index
}

#[tokio::test]
async fn five_step_widget_matches_reference_order() {
    let widget = five_step_widget();
    assert_eq!(
        widget.flow().sequence().steps(),
        &[
            WizardStep::Profile,
            WizardStep::Payout,
            WizardStep::Details,
            WizardStep::Bank,
            WizardStep::Tax
        ]
    );
}

#[tokio::test]
async fn toggling_a_step_twice_restores_the_config() {
    let mut widget = PayoutWidget::new(settings());
    let original = widget.config().await.enabled_steps;

    for step in [
        VerificationStep::Kyc,
        VerificationStep::Profile,
        VerificationStep::Tax,
    ] {
        widget.toggle_step(step).await;
        assert!(!widget.config().await.is_step_enabled(step));
        widget.toggle_step(step).await;
        assert!(widget.config().await.is_step_enabled(step));
    }

    let mut restored = widget.config().await.enabled_steps;
    let mut expected = original.clone();
    restored.sort_by_key(|s| s.to_string());
    expected.sort_by_key(|s| s.to_string());
    assert_eq!(restored, expected);
}

#[tokio::test]
async fn toggling_a_step_rebuilds_the_wizard() {
    let mut widget = PayoutWidget::new(settings());
    assert!(widget.flow().sequence().contains(WizardStep::Kyc));
    widget.toggle_step(VerificationStep::Kyc).await;
    assert!(!widget.flow().sequence().contains(WizardStep::Kyc));
}

#[tokio::test]
async fn ocean_blue_proposes_modern_blue() {
    let mut widget = PayoutWidget::new(settings());
    let preview = timeout(widget.request_style("Our brand uses ocean blue")).await;
    assert_eq!(preview.preset_name.as_deref(), Some("Modern Blue"));
    assert_eq!(preview.theme.accent_color, "#0EA5E9");
}

#[tokio::test]
async fn preview_does_not_commit_until_applied() {
    let mut widget = PayoutWidget::new(settings());
    let before = widget.config().await;

    timeout(widget.request_style("something earthy and green")).await;
    assert_eq!(widget.config().await, before);
    assert_eq!(widget.widget_key(), 0);

    let key = widget.apply_style().await.unwrap();
    assert_eq!(key, 1);
    let theme = widget.config().await.theme;
    assert_eq!(theme.primary_color, presets::CORPORATE_GREEN.primary_color);
    assert_eq!(theme.accent_color, presets::CORPORATE_GREEN.accent_color);
    assert_eq!(theme.background_color, presets::CORPORATE_GREEN.background_color);
    assert_eq!(theme.text_color, presets::CORPORATE_GREEN.text_color);
    assert_eq!(theme.border_color, presets::CORPORATE_GREEN.border_color);
    assert_eq!(theme.border_radius, presets::CORPORATE_GREEN.border_radius);
    assert!(widget.styler().preview().is_none());
}

#[tokio::test]
async fn discarded_preview_cannot_be_applied() {
    let mut widget = PayoutWidget::new(settings());
    widget.preview_preset(&presets::TECH_PURPLE).await;
    assert!(widget.discard_style());
    assert!(matches!(
        widget.apply_style().await,
        Err(Error::Style(StyleError::NothingToApply))
    ));
}

#[tokio::test]
async fn advance_at_payout_without_method_is_a_no_op() {
    let mut widget = five_step_widget();
    widget.restart().await;
    widget.go_to(WizardStep::Payout).unwrap();
    let index = step_index(&widget);

    assert_eq!(widget.advance().unwrap(), StepOutcome::Unchanged);
    assert_eq!(step_index(&widget), index);
}

#[tokio::test]
async fn digital_wallet_requires_a_provider() {
    let mut widget = five_step_widget();
    widget.restart().await;
    widget.go_to(WizardStep::Payout).unwrap();
    widget.select_method(PayoutMethod::DigitalWallet).await.unwrap();
    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Details));
    let index = step_index(&widget);

    let err = widget.advance().unwrap_err();
    assert!(matches!(
        err,
        Error::Flow(FlowError::DetailOptionRequired { .. })
    ));
    assert_eq!(step_index(&widget), index);
    assert_eq!(widget.flow().phase(), FlowPhase::DetailPending);

    widget.select_detail_option(DetailOption::PayPal).unwrap();
    let outcome = widget.advance().unwrap();
    assert_eq!(
        outcome,
        StepOutcome::Moved {
            from: WizardStep::Details,
            to: WizardStep::Bank
        }
    );
    assert_eq!(widget.flow().phase(), FlowPhase::InFlow);
}

#[tokio::test]
async fn incompatible_detail_option_is_rejected() {
    let mut widget = five_step_widget();
    widget.restart().await;
    widget.go_to(WizardStep::Details).unwrap();
    widget.select_method(PayoutMethod::GiftCard).await.unwrap();
    let err = widget.select_detail_option(DetailOption::Venmo).unwrap_err();
    assert!(matches!(
        err,
        Error::Flow(FlowError::IncompatibleDetailOption { .. })
    ));
    assert!(widget.flow().session().selected_detail_option.is_none());
}

#[tokio::test]
async fn bank_transfer_jumps_over_non_adjacent_steps() {
    // Default config puts kyc between details and bank.
    let mut widget = PayoutWidget::new(settings());
    widget.restart().await;
    assert_eq!(
        widget.flow().sequence().steps(),
        &[
            WizardStep::Profile,
            WizardStep::Payout,
            WizardStep::Details,
            WizardStep::Kyc,
            WizardStep::Bank,
            WizardStep::Tax
        ]
    );

    widget.go_to(WizardStep::Payout).unwrap();
    widget.select_method(PayoutMethod::BankTransfer).await.unwrap();
    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Details));

    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Bank));
    assert_eq!(step_index(&widget), 4);
}

#[tokio::test]
async fn end_to_end_bank_transfer_onboarding() {
    let mut widget = five_step_widget();
    widget.restart().await;
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Profile));

    widget.update_form_field("full_name", "Jordan Lee");
    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Payout));

    widget.select_method(PayoutMethod::BankTransfer).await.unwrap();
    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Details));

    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Bank));

    widget.update_form_field("account_number", "000123456789");
    widget.advance().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Tax));

    let incomplete = TaxForm {
        name: "Jordan Lee".into(),
        ..TaxForm::default()
    };
    assert!(matches!(
        widget.submit_tax_form(&incomplete),
        Err(Error::Flow(FlowError::TaxFormIncomplete { .. }))
    ));
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Tax));

    let form = TaxForm {
        form_type: TaxFormType::W9,
        name: "Jordan Lee".into(),
        tax_id: "123-45-6789".into(),
        certified: true,
        ..TaxForm::default()
    };
    let outcome = widget.submit_tax_form(&form).unwrap();
    assert_eq!(
        outcome,
        StepOutcome::Completed {
            summary: Some("Bank Transfer".into())
        }
    );

    let session = widget.flow().session();
    assert!(session.show_success);
    assert!(session.onboarding_completed);
    assert!(session.completed_at.is_some());
    assert_eq!(session.form_data.get("full_name").map(String::as_str), Some("Jordan Lee"));
    assert_eq!(widget.flow().phase(), FlowPhase::Success);
}

#[tokio::test]
async fn retreat_from_details_clears_the_selection() {
    let mut widget = five_step_widget();
    widget.restart().await;
    widget.go_to(WizardStep::Payout).unwrap();
    widget.select_method(PayoutMethod::GiftCard).await.unwrap();
    widget.advance().unwrap();
    widget.select_detail_option(DetailOption::Amazon).unwrap();

    let outcome = widget.retreat();
    assert_eq!(
        outcome,
        StepOutcome::Moved {
            from: WizardStep::Details,
            to: WizardStep::Payout
        }
    );
    let session = widget.flow().session();
    assert!(session.selected_method.is_none());
    assert!(session.selected_detail_option.is_none());
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Payout));
}

#[tokio::test]
async fn disabled_method_cannot_be_selected() {
    let mut widget = PayoutWidget::new(settings());
    widget.restart().await;
    widget.toggle_payout_method(PayoutMethod::Cryptocurrency).await;

    let err = widget
        .select_method(PayoutMethod::Cryptocurrency)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Flow(FlowError::MethodDisabled { .. })));
    assert!(widget.flow().session().selected_method.is_none());
}

#[tokio::test]
async fn payouts_only_mode_leaves_just_the_payout_steps() {
    let mut widget = PayoutWidget::new(settings());
    widget.restart().await;
    widget.set_payouts_only_mode(true).await;
    assert_eq!(
        widget.flow().sequence().steps(),
        &[WizardStep::Payout, WizardStep::Details]
    );
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Payout));

    widget.set_payouts_only_mode(false).await;
    assert_eq!(widget.flow().sequence().len(), 6);
}

#[tokio::test]
async fn login_seeds_a_completed_wallet_setup() {
    let mut widget = PayoutWidget::new(settings());
    widget.login();
    let session = widget.flow().session();
    assert!(session.is_logged_in);
    assert!(session.onboarding_completed);
    assert_eq!(
        session.payout_summary().as_deref(),
        Some("Digital Wallet (PayPal)")
    );

    assert_eq!(widget.flow().phase(), FlowPhase::Dashboard);
    assert!(matches!(
        widget.advance(),
        Err(Error::Flow(FlowError::NotInFlow { .. }))
    ));

    widget.change_payout_method().unwrap();
    assert_eq!(widget.flow().current_step(), Some(WizardStep::Payout));
    assert!(!widget.flow().session().onboarding_completed);

    widget.logout().await;
    assert_eq!(widget.flow().phase(), FlowPhase::Idle);
}

#[tokio::test]
async fn json_config_patch_respects_strict_mode() {
    let mut lenient = PayoutWidget::new(settings());
    lenient
        .update_config_json(json!({ "enabled_steps": ["tax"], "colour": "red" }))
        .await
        .unwrap();
    assert_eq!(
        lenient.flow().sequence().steps(),
        &[WizardStep::Payout, WizardStep::Details, WizardStep::Tax]
    );

    let strict_settings = WidgetSettings {
        strict_config: true,
        ..settings()
    };
    let mut strict = PayoutWidget::new(strict_settings);
    let err = strict
        .update_config_json(json!({ "colour": "red" }))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidConfigField(_))
    ));
}

#[tokio::test]
async fn config_subscribers_see_style_commits() {
    let mut widget = PayoutWidget::new(settings());
    let mut rx = widget.store().subscribe();
    widget.preview_preset(&presets::VIBRANT_ORANGE).await;
    widget.apply_style().await.unwrap();

    let event = tokio::time::timeout(TEST_TIMEOUT, rx.recv())
        .await
        .expect("timed out")
        .unwrap();
    assert!(matches!(event, ConfigEvent::Updated { revision: 1 }));
}

#[tokio::test]
async fn restart_cancels_a_pending_style_reply() {
    let responder = FixedResponder::new(presets::TECH_PURPLE);
    let mut widget = PayoutWidget::with_responder(slow_settings(), responder.clone());
    let before = widget.config().await;

    let ticket = widget.send_style_message("make it techy").await.unwrap();
    assert!(widget.chat().is_processing());

    widget.restart().await;
    assert!(!widget.chat().is_processing());
    assert!(matches!(
        ticket.wait_timeout(TEST_TIMEOUT).await,
        Err(StyleError::Cancelled)
    ));

    // Nothing was written: no reply, no placeholder, no config change.
    let messages = widget.chat().messages().await;
    assert!(messages.iter().all(|m| !m.is_loading && m.preset.is_none()));
    assert_eq!(widget.config().await, before);
    assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn second_message_is_rejected_while_reply_pending() {
    let mut widget = PayoutWidget::with_responder(
        slow_settings(),
        FixedResponder::new(presets::MODERN_BLUE),
    );
    let _ticket = widget.send_style_message("blue please").await.unwrap();
    assert!(matches!(
        widget.send_style_message("actually green").await,
        Err(Error::Style(StyleError::RequestPending))
    ));
}

#[tokio::test]
async fn logo_upload_drives_a_brand_asset_suggestion() {
    let mut widget = PayoutWidget::new(settings());
    assert!(widget.attach_logo("text/plain", b"not an image".to_vec()).is_err());

    widget.attach_logo("image/png", vec![0x89, b'P', b'N', b'G']).unwrap();
    let ticket = widget.send_style_message("").await.unwrap();
    let suggestion = ticket.wait_timeout(TEST_TIMEOUT).await.unwrap();
    assert_eq!(suggestion.basis, MatchBasis::BrandAsset);

    // A follow-up message is accepted once the reply has landed.
    let ticket = widget.send_style_message("warmer, please").await.unwrap();
    let suggestion = ticket.wait_timeout(TEST_TIMEOUT).await.unwrap();
    assert_eq!(suggestion.preset.name, "Vibrant Orange");
}

#[tokio::test]
async fn restart_and_logout_keep_a_delivered_reply() {
    let mut widget = PayoutWidget::new(settings());
    let ticket = widget.send_style_message("ocean blue").await.unwrap();
    ticket.wait_timeout(TEST_TIMEOUT).await.unwrap();
    assert!(!widget.chat().is_processing());
    let before = widget.chat().messages().await;
    assert_eq!(before.len(), 3);

    widget.restart().await;
    assert_eq!(widget.chat().messages().await, before);

    widget.logout().await;
    let after = widget.chat().messages().await;
    assert_eq!(after, before);
    assert_eq!(after[2].preset.as_deref(), Some("Modern Blue"));
}

#[tokio::test]
async fn cancel_reports_nothing_in_flight_after_delivery() {
    let mut widget = PayoutWidget::new(settings());
    widget
        .send_style_message("purple")
        .await
        .unwrap()
        .wait_timeout(TEST_TIMEOUT)
        .await
        .unwrap();

    assert!(!widget.cancel_style_request().await);
    assert_eq!(widget.chat().messages().await.len(), 3);

    // The chat accepts the next message and the earlier reply survives.
    let suggestion = widget
        .send_style_message("green")
        .await
        .unwrap()
        .wait_timeout(TEST_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(suggestion.preset.name, "Corporate Green");
    let messages = widget.chat().messages().await;
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].preset.as_deref(), Some("Tech Purple"));
}

#[tokio::test]
async fn returning_user_sees_history_and_uploads_invoices() {
    let mut widget = PayoutWidget::new(settings());
    assert!(matches!(
        widget.upload_invoice("may.pdf"),
        Err(Error::Flow(FlowError::DashboardUnavailable { .. }))
    ));

    widget.login();
    let ledger = widget.flow().ledger();
    assert_eq!(ledger.payouts.len(), 5);
    assert_eq!(ledger.payouts[3].status, PayoutStatus::Pending);

    let uploaded = widget.upload_invoice("may.pdf").unwrap();
    assert!(uploaded.invoice.starts_with("INV-"));
    assert_eq!(uploaded.invoice.len(), "INV-YYYYMMDD".len());
    assert_eq!(uploaded.status, PayoutStatus::AwaitingApproval);
    assert_eq!(widget.flow().ledger().invoices().len(), 6);

    let viewed = widget.view_invoice("INV-2023-08-01").unwrap();
    assert_eq!(viewed.description, "July commission payment");
    assert_eq!(
        widget.flow().ledger().selected_invoice.as_ref(),
        Some(&viewed)
    );
    assert!(widget.close_invoice());

    widget.logout().await;
    assert!(widget.flow().ledger().payouts.is_empty());
}

#[tokio::test]
async fn finished_onboarding_moves_on_to_the_dashboard() {
    let mut widget = five_step_widget();
    widget.restart().await;
    widget.go_to(WizardStep::Payout).unwrap();
    widget.select_method(PayoutMethod::CardPayment).await.unwrap();
    widget.go_to(WizardStep::Tax).unwrap();
    let form = TaxForm {
        name: "Jordan Lee".into(),
        tax_id: "98-7654321".into(),
        certified: true,
        ..TaxForm::default()
    };
    widget.submit_tax_form(&form).unwrap();
    assert_eq!(widget.flow().phase(), FlowPhase::Success);

    widget.dismiss_success().unwrap();
    assert_eq!(widget.flow().phase(), FlowPhase::Dashboard);
    assert!(widget.flow().ledger().payouts.is_empty());
    widget.upload_invoice("first.pdf").unwrap();
    assert_eq!(widget.flow().ledger().uploaded_invoices.len(), 1);
}

#[tokio::test]
async fn snapshot_serializes_for_rendering() {
    let mut widget = five_step_widget();
    widget.restart().await;
    let snapshot = widget.snapshot().await;
    let value = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(value["current_step"], "profile");
    assert_eq!(value["steps"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["config"]["theme"]["border_radius"], 8);
    assert_eq!(value["messages"].as_array().map(Vec::len), Some(1));
}

async fn timeout<T>(fut: impl std::future::Future<Output = payout_widget::Result<T>>) -> T {
    tokio::time::timeout(TEST_TIMEOUT, fut)
        .await
        .expect("timed out")
        .unwrap()
}

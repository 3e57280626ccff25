//! Ephemeral wizard session state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ledger::PayoutLedger;
use super::payout::{DetailOption, PayoutMethod};

/// Coarse phase of the wizard, derived from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    /// Not logged in; no wizard running.
    Idle,
    /// Walking the step sequence.
    InFlow,
    /// Blocked at `details` until a required option is chosen.
    DetailPending,
    /// Sequence exhausted. Terminal until restart.
    Success,
    /// Onboarded user looking at payout history; the wizard is closed.
    Dashboard,
}

impl FlowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::InFlow => "in_flow",
            Self::DetailPending => "detail_pending",
            Self::Success => "success",
            Self::Dashboard => "dashboard",
        };
        write!(f, "{s}")
    }
}

/// Session flags for one wizard instance.
///
/// Only the flow controller mutates this; renderers read snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub current_step_index: usize,
    pub selected_method: Option<PayoutMethod>,
    pub selected_detail_option: Option<DetailOption>,
    pub is_logged_in: bool,
    pub onboarding_completed: bool,
    pub show_success: bool,
    /// Set when an advance at `details` was rejected for a missing option.
    pub detail_blocked: bool,
    /// Free-form profile/bank field values keyed by field name.
    #[serde(default)]
    pub form_data: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ledger: PayoutLedger,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_step_index: 0,
            selected_method: None,
            selected_detail_option: None,
            is_logged_in: false,
            onboarding_completed: false,
            show_success: false,
            detail_blocked: false,
            form_data: BTreeMap::new(),
            completed_at: None,
            ledger: PayoutLedger::default(),
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> FlowPhase {
        if self.show_success {
            FlowPhase::Success
        } else if !self.is_logged_in {
            FlowPhase::Idle
        } else if self.onboarding_completed {
            FlowPhase::Dashboard
        } else if self.detail_blocked {
            FlowPhase::DetailPending
        } else {
            FlowPhase::InFlow
        }
    }

    /// Human-readable payout summary, e.g. "Digital Wallet (PayPal)".
    pub fn payout_summary(&self) -> Option<String> {
        let method = self.selected_method?;
        Some(match self.selected_detail_option {
            Some(option) => format!("{method} ({option})"),
            None => method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_idle() {
        let s = SessionState::default();
        assert_eq!(s.phase(), FlowPhase::Idle);
        assert_eq!(s.current_step_index, 0);
        assert!(s.selected_method.is_none());
        assert!(s.form_data.is_empty());
    }

    #[test]
    fn phase_precedence() {
        let mut s = SessionState {
            is_logged_in: true,
            ..Default::default()
        };
        assert_eq!(s.phase(), FlowPhase::InFlow);

        s.detail_blocked = true;
        assert_eq!(s.phase(), FlowPhase::DetailPending);

        s.show_success = true;
        s.onboarding_completed = true;
        assert_eq!(s.phase(), FlowPhase::Success);
        assert!(s.phase().is_terminal());

        s.show_success = false;
        assert_eq!(s.phase(), FlowPhase::Dashboard);
        assert!(!s.phase().is_terminal());
    }

    #[test]
    fn payout_summary_formats_option() {
        let mut s = SessionState::default();
        assert!(s.payout_summary().is_none());

        s.selected_method = Some(PayoutMethod::BankTransfer);
        assert_eq!(s.payout_summary().as_deref(), Some("Bank Transfer"));

        s.selected_method = Some(PayoutMethod::DigitalWallet);
        s.selected_detail_option = Some(DetailOption::PayPal);
        assert_eq!(s.payout_summary().as_deref(), Some("Digital Wallet (PayPal)"));
    }

    #[test]
    fn session_serde_roundtrip() {
        let mut s = SessionState {
            current_step_index: 2,
            selected_method: Some(PayoutMethod::GiftCard),
            selected_detail_option: Some(DetailOption::Target),
            is_logged_in: true,
            ..Default::default()
        };
        s.form_data.insert("email".into(), "a@example.com".into());

        let json = serde_json::to_string(&s).unwrap();
        let parsed: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.session_id, s.session_id);
        assert_eq!(parsed.current_step_index, 2);
        assert_eq!(parsed.selected_detail_option, Some(DetailOption::Target));
        assert_eq!(parsed.form_data["email"], "a@example.com");
    }
}

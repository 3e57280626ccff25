//! Step-flow controller: owns the session and walks the step sequence.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::FlowError;

use super::ledger::{InvoiceRecord, PayoutLedger};
use super::payout::{DetailOption, PayoutMethod};
use super::session::{FlowPhase, SessionState};
use super::step::{StepSequence, WizardStep};
use super::tax::TaxForm;
use super::transitions::{route_backward, route_forward, BackwardRoute, ForwardRoute};

/// What a navigation call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing moved.
    Unchanged,
    /// The wizard moved between two steps.
    Moved { from: WizardStep, to: WizardStep },
    /// The sequence is exhausted; `summary` names the payout channel.
    Completed { summary: Option<String> },
}

/// Drives one wizard session over a [`StepSequence`].
#[derive(Debug, Clone)]
pub struct StepFlowController {
    sequence: StepSequence,
    session: SessionState,
}

impl StepFlowController {
    /// Create a controller in the idle (logged out) state.
    pub fn new(sequence: StepSequence) -> Self {
        Self {
            sequence,
            session: SessionState::default(),
        }
    }

    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> FlowPhase {
        self.session.phase()
    }

    pub fn current_step(&self) -> Option<WizardStep> {
        self.sequence.get(self.session.current_step_index)
    }

    /// Whether the current step is the last one in the sequence.
    pub fn is_last_step(&self) -> bool {
        self.session.current_step_index + 1 >= self.sequence.len()
    }

    /// Swap in a new sequence, staying on the current step when the new
    /// sequence still has it.
    pub fn set_sequence(&mut self, sequence: StepSequence) {
        let current = self.current_step();
        let index = match current.and_then(|step| sequence.index_of(step)) {
            Some(i) => i,
            None => self
                .session
                .current_step_index
                .min(sequence.len().saturating_sub(1)),
        };
        debug!(
            from = ?current,
            index,
            steps = sequence.len(),
            "Step sequence replaced"
        );
        self.sequence = sequence;
        self.session.current_step_index = index;
    }

    /// Position the wizard directly on `step`.
    pub fn go_to(&mut self, step: WizardStep) -> Result<(), FlowError> {
        let index = self
            .sequence
            .index_of(step)
            .ok_or(FlowError::StepNotInSequence { step })?;
        self.session.current_step_index = index;
        self.session.detail_blocked = false;
        Ok(())
    }

    /// Move forward according to the transition table.
    pub fn advance(&mut self) -> Result<StepOutcome, FlowError> {
        let phase = self.phase();
        if matches!(
            phase,
            FlowPhase::Idle | FlowPhase::Success | FlowPhase::Dashboard
        ) {
            return Err(FlowError::NotInFlow { phase });
        }

        let index = self.session.current_step_index;
        let current = self.current_step().ok_or_else(|| FlowError::InvalidSequence {
            reason: format!("step index {index} is out of range"),
        })?;

        let route = route_forward(
            current,
            self.session.selected_method,
            self.session.selected_detail_option.is_some(),
        );

        match route {
            ForwardRoute::Hold => {
                debug!(step = %current, "Advance held: nothing selected yet");
                Ok(StepOutcome::Unchanged)
            }
            ForwardRoute::RequireDetailOption(method) => {
                self.session.detail_blocked = true;
                warn!(step = %current, method = %method, "Advance rejected: detail option required");
                Err(FlowError::DetailOptionRequired {
                    method: method.label().to_lowercase(),
                })
            }
            ForwardRoute::JumpTo(target) => match self.sequence.index_of(target) {
                Some(target_index) if target_index > index => {
                    Ok(self.move_to(current, target_index))
                }
                _ => Ok(self.next_or_complete(current)),
            },
            ForwardRoute::Next => Ok(self.next_or_complete(current)),
        }
    }

    /// Move backward according to the transition table.
    pub fn retreat(&mut self) -> StepOutcome {
        if matches!(
            self.phase(),
            FlowPhase::Idle | FlowPhase::Success | FlowPhase::Dashboard
        ) {
            return StepOutcome::Unchanged;
        }
        let Some(current) = self.current_step() else {
            return StepOutcome::Unchanged;
        };

        match route_backward(current) {
            BackwardRoute::ResetTo(target) => {
                self.session.selected_method = None;
                self.session.selected_detail_option = None;
                match self.sequence.index_of(target) {
                    Some(i) => self.move_to(current, i),
                    None => StepOutcome::Unchanged,
                }
            }
            BackwardRoute::Previous if self.session.current_step_index > 0 => {
                let i = self.session.current_step_index - 1;
                self.move_to(current, i)
            }
            BackwardRoute::Previous => StepOutcome::Unchanged,
        }
    }

    /// Choose a payout method. Any earlier detail option is dropped.
    pub fn select_method(&mut self, method: PayoutMethod) {
        debug!(method = %method, "Payout method selected");
        self.session.selected_method = Some(method);
        self.session.selected_detail_option = None;
        self.session.detail_blocked = false;
    }

    /// Choose a detail option. It must belong to the selected method.
    pub fn select_detail_option(&mut self, option: DetailOption) -> Result<(), FlowError> {
        let method = self
            .session
            .selected_method
            .ok_or(FlowError::MethodRequired)?;
        if option.method() != method {
            return Err(FlowError::IncompatibleDetailOption {
                option: option.to_string(),
                method: method.to_string(),
            });
        }
        debug!(method = %method, option = %option, "Detail option selected");
        self.session.selected_detail_option = Some(option);
        self.session.detail_blocked = false;
        Ok(())
    }

    /// Start onboarding from the first step with a fresh session.
    pub fn restart(&mut self) {
        self.session = SessionState {
            is_logged_in: true,
            ..SessionState::default()
        };
        info!(session_id = %self.session.session_id, "Onboarding restarted");
    }

    /// Returning-user shortcut: logged in with a completed demo setup.
    pub fn login(&mut self) {
        self.session.is_logged_in = true;
        self.session.onboarding_completed = true;
        self.session.selected_method = Some(PayoutMethod::DigitalWallet);
        self.session.selected_detail_option = Some(DetailOption::PayPal);
        self.session.detail_blocked = false;
        self.session.ledger = PayoutLedger::demo();
        info!(session_id = %self.session.session_id, "Logged in");
    }

    pub fn logout(&mut self) {
        let old = self.session.session_id;
        self.session = SessionState::default();
        info!(session_id = %old, "Logged out");
    }

    /// Re-open the payout method choice after onboarding.
    pub fn change_payout_method(&mut self) -> Result<(), FlowError> {
        self.go_to(WizardStep::Payout)?;
        self.session.onboarding_completed = false;
        self.session.show_success = false;
        self.session.completed_at = None;
        Ok(())
    }

    /// Leave the success screen for the payout dashboard.
    pub fn dismiss_success(&mut self) -> Result<(), FlowError> {
        let phase = self.phase();
        if phase != FlowPhase::Success {
            return Err(FlowError::DashboardUnavailable { phase });
        }
        self.session.show_success = false;
        Ok(())
    }

    pub fn ledger(&self) -> &PayoutLedger {
        &self.session.ledger
    }

    pub fn upload_invoice(
        &mut self,
        file_name: &str,
        today: NaiveDate,
    ) -> Result<&InvoiceRecord, FlowError> {
        self.require_dashboard()?;
        self.session.ledger.upload_invoice(file_name, today)
    }

    pub fn view_invoice(&mut self, key: &str) -> Result<&InvoiceRecord, FlowError> {
        self.require_dashboard()?;
        self.session.ledger.view_invoice(key)
    }

    pub fn close_invoice(&mut self) -> bool {
        self.session.ledger.close_invoice()
    }

    pub fn update_form_field(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.session.form_data.insert(field.into(), value.into());
    }

    /// Validate the tax form and advance past the `tax` step.
    pub fn submit_tax_form(&mut self, form: &TaxForm) -> Result<StepOutcome, FlowError> {
        let actual = self.current_step().ok_or(FlowError::StepNotInSequence {
            step: WizardStep::Tax,
        })?;
        if actual != WizardStep::Tax {
            return Err(FlowError::WrongStep {
                expected: WizardStep::Tax,
                actual,
            });
        }
        form.validate()?;
        info!(form_type = ?form.form_type, "Tax information submitted");
        self.advance()
    }

    /// Dashboard operations need a logged-in user who finished onboarding.
    fn require_dashboard(&self) -> Result<(), FlowError> {
        match self.phase() {
            FlowPhase::Dashboard | FlowPhase::Success => Ok(()),
            phase => Err(FlowError::DashboardUnavailable { phase }),
        }
    }

    fn move_to(&mut self, from: WizardStep, index: usize) -> StepOutcome {
        self.session.current_step_index = index;
        self.session.detail_blocked = false;
        match self.sequence.get(index) {
            Some(to) => {
                info!(from = %from, to = %to, index, "Wizard step changed");
                StepOutcome::Moved { from, to }
            }
            None => StepOutcome::Unchanged,
        }
    }

    fn next_or_complete(&mut self, current: WizardStep) -> StepOutcome {
        let next = self.session.current_step_index + 1;
        if next < self.sequence.len() {
            return self.move_to(current, next);
        }

        self.session.show_success = true;
        self.session.onboarding_completed = true;
        self.session.detail_blocked = false;
        self.session.completed_at = Some(Utc::now());
        let summary = self.session.payout_summary();
        info!(
            session_id = %self.session.session_id,
            payout = summary.as_deref().unwrap_or("none"),
            "Onboarding completed"
        );
        StepOutcome::Completed { summary }
    }
}

impl Default for StepFlowController {
    fn default() -> Self {
        Self::new(StepSequence::reference())
    }
}

//! Transition table for the wizard.
//!
//! `route_forward` is keyed on (current step, selected method, detail option
//! present) and names a target by step label; the controller resolves the
//! label against its sequence. No index arithmetic happens here.

use super::payout::PayoutMethod;
use super::step::WizardStep;

/// Where an advance request should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardRoute {
    /// Stay put without complaint (nothing to act on yet).
    Hold,
    /// Stay put and report that the method needs a detail option.
    RequireDetailOption(PayoutMethod),
    /// Jump to a named step if the sequence has it after the current one,
    /// otherwise fall through to `Next`.
    JumpTo(WizardStep),
    /// Move to the following step, or finish if there is none.
    Next,
}

/// Where a retreat request should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackwardRoute {
    /// Clear the payout choice and return to the named step.
    ResetTo(WizardStep),
    /// Move to the preceding step, if any.
    Previous,
}

/// Resolve an advance request.
pub fn route_forward(
    current: WizardStep,
    method: Option<PayoutMethod>,
    has_detail_option: bool,
) -> ForwardRoute {
    use WizardStep::*;

    match (current, method, has_detail_option) {
        (Payout, None, _) => ForwardRoute::Hold,
        (Payout, Some(_), _) => ForwardRoute::Next,

        // Reachable only through a direct jump; nothing to route on.
        (Details, None, _) => ForwardRoute::Hold,
        (Details, Some(m), false) if m.requires_detail_option() => {
            ForwardRoute::RequireDetailOption(m)
        }
        (Details, Some(PayoutMethod::BankTransfer), _) => ForwardRoute::JumpTo(Bank),
        (Details, Some(_), _) => ForwardRoute::Next,

        (Profile | Kyc | Bank | Tax, _, _) => ForwardRoute::Next,
    }
}

/// Resolve a retreat request.
pub fn route_backward(current: WizardStep) -> BackwardRoute {
    match current {
        WizardStep::Details => BackwardRoute::ResetTo(WizardStep::Payout),
        _ => BackwardRoute::Previous,
    }
}

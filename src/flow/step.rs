//! Wizard steps and the ordered sequence the controller walks.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::widget::VerificationStep;

/// One named stage of the onboarding wizard.
///
/// `Payout` and `Details` are wizard-internal steps for the payout method
/// sub-flow; the rest mirror the configurable verification steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Profile,
    Kyc,
    Payout,
    Details,
    Bank,
    Tax,
}

impl WizardStep {
    /// Whether this step is a configurable verification panel.
    pub fn is_verification(&self) -> bool {
        !matches!(self, Self::Payout | Self::Details)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Kyc => "Identity Verification",
            Self::Payout => "Payout Method",
            Self::Details => "Payout Details",
            Self::Bank => "Bank Verification",
            Self::Tax => "Tax Information",
        }
    }
}

impl From<VerificationStep> for WizardStep {
    fn from(step: VerificationStep) -> Self {
        match step {
            VerificationStep::Profile => Self::Profile,
            VerificationStep::Kyc => Self::Kyc,
            VerificationStep::Bank => Self::Bank,
            VerificationStep::Tax => Self::Tax,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Kyc => "kyc",
            Self::Payout => "payout",
            Self::Details => "details",
            Self::Bank => "bank",
            Self::Tax => "tax",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WizardStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "kyc" => Ok(Self::Kyc),
            "payout" => Ok(Self::Payout),
            "details" => Ok(Self::Details),
            "bank" => Ok(Self::Bank),
            "tax" => Ok(Self::Tax),
            _ => Err(format!("unknown wizard step: {s}")),
        }
    }
}

/// Ordered, duplicate-free list of wizard steps.
///
/// Always contains `payout` followed (not necessarily directly) by
/// `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSequence {
    steps: Vec<WizardStep>,
}

impl StepSequence {
    /// Build a sequence, rejecting duplicates and a missing or misordered
    /// payout sub-flow.
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, FlowError> {
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].contains(step) {
                return Err(FlowError::InvalidSequence {
                    reason: format!("step {step} appears more than once"),
                });
            }
        }

        let payout = steps.iter().position(|s| *s == WizardStep::Payout);
        let details = steps.iter().position(|s| *s == WizardStep::Details);
        match (payout, details) {
            (Some(p), Some(d)) if p < d => Ok(Self { steps }),
            (Some(_), Some(_)) => Err(FlowError::InvalidSequence {
                reason: "payout must come before details".to_string(),
            }),
            _ => Err(FlowError::InvalidSequence {
                reason: "payout and details steps are required".to_string(),
            }),
        }
    }

    /// The fixed five-step order: profile, payout, details, bank, tax.
    pub fn reference() -> Self {
        Self {
            steps: vec![
                WizardStep::Profile,
                WizardStep::Payout,
                WizardStep::Details,
                WizardStep::Bank,
                WizardStep::Tax,
            ],
        }
    }

    /// Reconcile configured verification steps with the payout sub-flow.
    ///
    /// `profile` leads when enabled, then `payout` and `details`, then the
    /// remaining verification steps in configured order. An empty
    /// configuration (payouts-only mode) yields just the sub-flow.
    pub fn from_config(enabled: &[VerificationStep]) -> Self {
        let mut steps = Vec::with_capacity(enabled.len() + 2);
        if enabled.contains(&VerificationStep::Profile) {
            steps.push(WizardStep::Profile);
        }
        steps.push(WizardStep::Payout);
        steps.push(WizardStep::Details);
        for step in enabled {
            let step = WizardStep::from(*step);
            if step != WizardStep::Profile && !steps.contains(&step) {
                steps.push(step);
            }
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<WizardStep> {
        self.steps.get(index).copied()
    }

    pub fn index_of(&self, step: WizardStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    pub fn contains(&self, step: WizardStep) -> bool {
        self.steps.contains(&step)
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self::reference()
    }
}

//! Error types for the payout widget core.

use std::time::Duration;

use crate::flow::{FlowPhase, WizardStep};

/// Top-level error type for the widget.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown configuration field: {0}")]
    InvalidConfigField(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Wizard validation and transition errors.
///
/// All of these leave the session untouched; the caller fixes the input and
/// retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Please select a specific {method} option to continue")]
    DetailOptionRequired { method: String },

    #[error("{option} is not available for {method}")]
    IncompatibleDetailOption { option: String, method: String },

    #[error("Select a payout method first")]
    MethodRequired,

    #[error("Payout method {method} is disabled for this widget")]
    MethodDisabled { method: String },

    #[error("Tax form incomplete: missing {}", missing.join(", "))]
    TaxFormIncomplete { missing: Vec<String> },

    #[error("Expected to be at step {expected}, currently at {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Step {step} is not part of the current sequence")]
    StepNotInSequence { step: WizardStep },

    #[error("Invalid step sequence: {reason}")]
    InvalidSequence { reason: String },

    #[error("Wizard is not in flow (phase: {phase})")]
    NotInFlow { phase: FlowPhase },

    #[error("The payout dashboard is only available after onboarding (phase: {phase})")]
    DashboardUnavailable { phase: FlowPhase },

    #[error("Please choose an invoice file to upload")]
    InvoiceFileRequired,

    #[error("Invoice {invoice} not found")]
    InvoiceNotFound { invoice: String },
}

/// Style assistant errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("A style reply is already pending")]
    RequestPending,

    #[error("Nothing to send: message is empty and no logo is attached")]
    EmptyMessage,

    #[error("Unsupported upload type {mime}: please upload an image file")]
    UnsupportedUpload { mime: String },

    #[error("Style request failed after {attempts} attempt(s): {reason}")]
    RequestFailed { attempts: u32, reason: String },

    #[error("Style reply was cancelled")]
    Cancelled,

    #[error("No style preview to apply")]
    NothingToApply,

    #[error("Style reply timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Result type alias for the widget.
pub type Result<T> = std::result::Result<T, Error>;

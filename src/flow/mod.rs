//! Onboarding wizard: step sequence, session state and transitions.
//!
//! The controller walks an ordered [`StepSequence`]. Branching (the payout
//! method sub-flow, the bank-transfer shortcut) is resolved by the table in
//! [`transitions`], keyed on step labels rather than indices.

pub mod controller;
pub mod ledger;
pub mod payout;
pub mod session;
pub mod step;
pub mod tax;
pub mod transitions;

pub use controller::{StepFlowController, StepOutcome};
pub use ledger::{InvoiceRecord, PayoutLedger, PayoutRecord, PayoutStatus};
pub use payout::{DetailOption, PayoutMethod};
pub use session::{FlowPhase, SessionState};
pub use step::{StepSequence, WizardStep};
pub use tax::{PolicyType, TaxForm, TaxFormType};

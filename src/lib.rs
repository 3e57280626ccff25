//! Payout Widget: embeddable payout-onboarding wizard core.
//!
//! A configurable multi-step wizard (profile, payout method, payout details,
//! bank, tax) driven by a shared config store, plus a chat assistant that
//! turns a brand description or logo into a previewable theme.

pub mod app;
pub mod config;
pub mod error;
pub mod flow;
pub mod style;
pub mod widget;

pub use app::{PayoutWidget, WidgetSnapshot};
pub use config::WidgetSettings;
pub use error::{Error, Result};

//! Widget configuration: data model, shared store and remount key.

pub mod key;
pub mod model;
pub mod store;

pub use key::WidgetKey;
pub use model::{
    ButtonStyle, RecipientType, Theme, VerificationStep, WidgetConfig, WidgetConfigPatch,
};
pub use store::{ConfigEvent, ConfigStore};

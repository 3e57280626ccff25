//! Style customization: presets, keyword rules, preview/commit and the chat
//! assistant that drives them.

pub mod chat;
pub mod presets;
pub mod preview;
pub mod responder;
pub mod rules;

pub use chat::{ChatMessage, ChatRole, ReplyTicket, StyleChat};
pub use presets::StylePreset;
pub use preview::{PreviewState, StyleConfigurator};
pub use responder::{KeywordResponder, StyleRequest, StyleResponder};
pub use rules::{MatchBasis, StyleRules, StyleSuggestion};

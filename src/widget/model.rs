//! Widget configuration data model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::flow::PayoutMethod;

pub const DEFAULT_PRIMARY_COLOR: &str = "#0f2a35";
pub const DEFAULT_ACCENT_COLOR: &str = "#d0e92a";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#143745";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_BORDER_COLOR: &str = "#21404d";
pub const DEFAULT_BORDER_RADIUS: i32 = 8;

/// Who is being paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    #[default]
    Vendor,
    Insured,
    Individual,
    Business,
    Contractor,
}

/// A configurable verification panel of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStep {
    Profile,
    Kyc,
    Bank,
    Tax,
}

impl VerificationStep {
    /// Default wizard order; `kyc` comes before `bank`.
    pub const DEFAULT_ORDER: [VerificationStep; 4] =
        [Self::Profile, Self::Kyc, Self::Bank, Self::Tax];
}

impl std::fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Kyc => "kyc",
            Self::Bank => "bank",
            Self::Tax => "tax",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for VerificationStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "kyc" => Ok(Self::Kyc),
            "bank" => Ok(Self::Bank),
            "tax" => Ok(Self::Tax),
            _ => Err(format!("unknown verification step: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    #[default]
    Rounded,
    Square,
    Pill,
}

/// Colors and shape of the widget.
///
/// Colors are CSS color strings and are not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub primary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    /// Corner radius in pixels. Negative values are stored as given.
    pub border_radius: i32,
    pub button_style: ButtonStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            border_radius: DEFAULT_BORDER_RADIUS,
            button_style: ButtonStyle::default(),
        }
    }
}

/// Widget-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub recipient_type: RecipientType,
    /// Ordered, duplicate-free verification steps.
    pub enabled_steps: Vec<VerificationStep>,
    pub enabled_payout_methods: BTreeSet<PayoutMethod>,
    pub show_progress_bar: bool,
    pub show_step_numbers: bool,
    pub theme: Theme,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            recipient_type: RecipientType::default(),
            enabled_steps: VerificationStep::DEFAULT_ORDER.to_vec(),
            enabled_payout_methods: PayoutMethod::ALL.into_iter().collect(),
            show_progress_bar: true,
            show_step_numbers: true,
            theme: Theme::default(),
        }
    }
}

impl WidgetConfig {
    pub fn is_step_enabled(&self, step: VerificationStep) -> bool {
        self.enabled_steps.contains(&step)
    }

    pub fn is_method_enabled(&self, method: PayoutMethod) -> bool {
        self.enabled_payout_methods.contains(&method)
    }
}

/// Partial update: each present top-level key replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfigPatch {
    pub recipient_type: Option<RecipientType>,
    pub enabled_steps: Option<Vec<VerificationStep>>,
    pub enabled_payout_methods: Option<BTreeSet<PayoutMethod>>,
    pub show_progress_bar: Option<bool>,
    pub show_step_numbers: Option<bool>,
    pub theme: Option<Theme>,
}

impl WidgetConfigPatch {
    /// Top-level keys accepted in an untyped patch.
    pub const FIELDS: [&'static str; 6] = [
        "recipient_type",
        "enabled_steps",
        "enabled_payout_methods",
        "show_progress_bar",
        "show_step_numbers",
        "theme",
    ];

    pub fn theme(theme: Theme) -> Self {
        Self {
            theme: Some(theme),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge into `config`.
    pub fn apply_to(self, config: &mut WidgetConfig) {
        if let Some(v) = self.recipient_type {
            config.recipient_type = v;
        }
        if let Some(mut steps) = self.enabled_steps {
            dedup_in_order(&mut steps);
            config.enabled_steps = steps;
        }
        if let Some(v) = self.enabled_payout_methods {
            config.enabled_payout_methods = v;
        }
        if let Some(v) = self.show_progress_bar {
            config.show_progress_bar = v;
        }
        if let Some(v) = self.show_step_numbers {
            config.show_step_numbers = v;
        }
        if let Some(v) = self.theme {
            config.theme = v;
        }
    }
}

fn dedup_in_order(steps: &mut Vec<VerificationStep>) {
    let mut seen = Vec::with_capacity(steps.len());
    steps.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(*s);
            true
        }
    });
}

//! Keyword rule table mapping brand descriptions to style presets.
//!
//! Rules are tried in order and the first match wins:
//! - blue / ocean → Modern Blue
//! - purple / tech → Tech Purple
//! - green / eco / nature → Corporate Green
//! - orange / warm / energetic → Vibrant Orange
//!
//! With no keyword hit, an attached image or a mention of a logo picks a
//! preset at random "from the brand assets"; anything else falls back to a
//! random preset as well. Randomness is supplied by the caller.

use rand::Rng;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::presets::{self, StylePreset};

/// Why a suggestion was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchBasis {
    /// A keyword rule matched.
    Keyword { pattern: String },
    /// An uploaded image or a logo mention.
    BrandAsset,
    /// Nothing matched.
    Fallback,
}

/// A preset proposed for an utterance, with display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleSuggestion {
    pub preset: StylePreset,
    /// Shown to the user; not consumed by other components.
    pub rationale: String,
    pub basis: MatchBasis,
}

/// A single keyword rule with a compiled case-insensitive regex.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// Human-readable pattern description, e.g. `blue|ocean`.
    pub pattern: String,
    regex: Regex,
    pub preset: StylePreset,
    pub rationale: String,
}

/// Ordered keyword rules plus the brand-asset trigger.
pub struct StyleRules {
    rules: Vec<StyleRule>,
    asset_regex: Regex,
}

impl StyleRules {
    /// The built-in rule table.
    pub fn default_rules() -> Self {
        let mut rules = Self::empty();
        let table: [(&[&str], StylePreset, &str); 4] = [
            (
                &["blue", "ocean"],
                presets::MODERN_BLUE,
                "A modern blue theme reads as trustworthy and professional, so I built a style around blue tones.",
            ),
            (
                &["purple", "tech"],
                presets::TECH_PURPLE,
                "A tech-leaning purple theme keeps things modern and innovative.",
            ),
            (
                &["green", "eco", "nature"],
                presets::CORPORATE_GREEN,
                "A natural green theme fits eco-minded brand values and suggests growth.",
            ),
            (
                &["orange", "warm", "energetic"],
                presets::VIBRANT_ORANGE,
                "A vibrant orange theme gives the widget an energetic, bold feel.",
            ),
        ];
        for (keywords, preset, rationale) in table {
            rules.add_rule(keywords, preset, rationale);
        }
        rules
    }

    /// A table with no keyword rules; every utterance is random.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            asset_regex: keyword_regex(&["logo", "image", "upload"]),
        }
    }

    /// Append a keyword rule. Keywords match as case-insensitive substrings.
    pub fn add_rule(&mut self, keywords: &[&str], preset: StylePreset, rationale: &str) {
        self.rules.push(StyleRule {
            pattern: keywords.join("|"),
            regex: keyword_regex(keywords),
            preset,
            rationale: rationale.to_string(),
        });
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Map an utterance to a preset.
    ///
    /// Deterministic whenever a keyword rule matches; otherwise draws
    /// uniformly from the catalog using `rng`.
    pub fn interpret<R: Rng>(
        &self,
        utterance: &str,
        has_image: bool,
        rng: &mut R,
    ) -> StyleSuggestion {
        if let Some(rule) = self.rules.iter().find(|r| r.regex.is_match(utterance)) {
            debug!(pattern = %rule.pattern, preset = rule.preset.name, "Style keyword matched");
            return StyleSuggestion {
                preset: rule.preset,
                rationale: rule.rationale.clone(),
                basis: MatchBasis::Keyword {
                    pattern: rule.pattern.clone(),
                },
            };
        }

        let preset = presets::CATALOG[rng.gen_range(0..presets::CATALOG.len())];
        if has_image || self.asset_regex.is_match(utterance) {
            debug!(preset = preset.name, has_image, "Style picked from brand assets");
            StyleSuggestion {
                preset,
                rationale: "I looked over your brand assets and put together a theme that matches your visual identity.".to_string(),
                basis: MatchBasis::BrandAsset,
            }
        } else {
            debug!(preset = preset.name, "No style keyword matched, using fallback");
            StyleSuggestion {
                preset,
                rationale: "Here is a custom style that should suit your brand. Ask me to adjust colors, borders or spacing any time.".to_string(),
                basis: MatchBasis::Fallback,
            }
        }
    }
}

impl Default for StyleRules {
    fn default() -> Self {
        Self::default_rules()
    }
}

/// Case-insensitive alternation of escaped literals.
fn keyword_regex(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    // Escaped literals always compile.
    Regex::new(&format!("(?i)(?:{alternation})")).unwrap()
}

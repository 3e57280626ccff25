//! Tax information form submitted at the `tax` step.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxFormType {
    /// W-9, U.S. persons.
    #[default]
    W9,
    /// W-8, non-U.S. persons.
    W8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    #[default]
    Standard,
    Premium,
    Basic,
}

/// Tax form fields. Only `name`, `tax_id` and `certified` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxForm {
    pub form_type: TaxFormType,
    /// Name as shown on the income tax return.
    pub name: String,
    /// SSN or foreign TIN.
    pub tax_id: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub beneficiary: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub policy_type: PolicyType,
    /// The signer certified the information under penalty of perjury.
    pub certified: bool,
}

impl TaxForm {
    pub fn validate(&self) -> Result<(), FlowError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name".to_string());
        }
        if self.tax_id.trim().is_empty() {
            missing.push("tax_id".to_string());
        }
        if !self.certified {
            missing.push("certification".to_string());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FlowError::TaxFormIncomplete { missing })
        }
    }
}

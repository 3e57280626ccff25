//! Payout methods and their detail options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The channel chosen for fund disbursement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Cryptocurrency,
    DigitalWallet,
    CardPayment,
    PrepaidCard,
    GiftCard,
}

impl PayoutMethod {
    pub const ALL: [PayoutMethod; 6] = [
        Self::BankTransfer,
        Self::Cryptocurrency,
        Self::DigitalWallet,
        Self::CardPayment,
        Self::PrepaidCard,
        Self::GiftCard,
    ];

    /// Whether the method needs a detail option before the wizard can leave
    /// the `details` step.
    pub fn requires_detail_option(&self) -> bool {
        matches!(self, Self::DigitalWallet | Self::PrepaidCard | Self::GiftCard)
    }

    /// Detail options offered for this method. Empty when none apply.
    pub fn detail_options(&self) -> &'static [DetailOption] {
        match self {
            Self::DigitalWallet => &[DetailOption::PayPal, DetailOption::Venmo],
            Self::PrepaidCard => &[DetailOption::VisaPrepaid],
            Self::GiftCard => &[
                DetailOption::Amazon,
                DetailOption::Walmart,
                DetailOption::Target,
            ],
            Self::BankTransfer | Self::Cryptocurrency | Self::CardPayment => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BankTransfer => "Bank Transfer",
            Self::Cryptocurrency => "Cryptocurrency",
            Self::DigitalWallet => "Digital Wallet",
            Self::CardPayment => "Card Payment",
            Self::PrepaidCard => "Prepaid Card",
            Self::GiftCard => "Gift Card",
        }
    }
}

impl std::fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PayoutMethod {
    type Err = String;

    /// Accepts the display label, the snake_case name, or the short admin
    /// alias (`bank`, `crypto`, `digital`, `card`, `prepaid`, `gift`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "bank_transfer" | "bank" => Ok(Self::BankTransfer),
            "cryptocurrency" | "crypto" => Ok(Self::Cryptocurrency),
            "digital_wallet" | "digital" | "wallet" => Ok(Self::DigitalWallet),
            "card_payment" | "card" => Ok(Self::CardPayment),
            "prepaid_card" | "prepaid" => Ok(Self::PrepaidCard),
            "gift_card" | "gift" => Ok(Self::GiftCard),
            _ => Err(format!("unknown payout method: {s}")),
        }
    }
}

/// A sub-choice required by some payout methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailOption {
    #[serde(rename = "paypal")]
    PayPal,
    Venmo,
    VisaPrepaid,
    Amazon,
    Walmart,
    Target,
}

impl DetailOption {
    /// The payout method this option belongs to.
    pub fn method(&self) -> PayoutMethod {
        match self {
            Self::PayPal | Self::Venmo => PayoutMethod::DigitalWallet,
            Self::VisaPrepaid => PayoutMethod::PrepaidCard,
            Self::Amazon | Self::Walmart | Self::Target => PayoutMethod::GiftCard,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PayPal => "PayPal",
            Self::Venmo => "Venmo",
            Self::VisaPrepaid => "Visa Prepaid",
            Self::Amazon => "Amazon",
            Self::Walmart => "Walmart",
            Self::Target => "Target",
        }
    }
}

impl std::fmt::Display for DetailOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DetailOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "");
        match key.as_str() {
            "paypal" => Ok(Self::PayPal),
            "venmo" => Ok(Self::Venmo),
            "visaprepaid" | "visa" => Ok(Self::VisaPrepaid),
            "amazon" => Ok(Self::Amazon),
            "walmart" => Ok(Self::Walmart),
            "target" => Ok(Self::Target),
            _ => Err(format!("unknown detail option: {s}")),
        }
    }
}

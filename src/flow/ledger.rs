//! Returning-user dashboard data: payout history and invoices.
//!
//! Session scoped and in memory only. A login seeds the demo history; a
//! fresh onboarding starts empty.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Completed,
    Pending,
    AwaitingApproval,
}

impl PayoutStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::AwaitingApproval => "Awaiting Approval",
        }
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One disbursement in the payout history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub status: PayoutStatus,
    /// Payout channel summary, e.g. "Digital Wallet (PayPal)".
    pub method: String,
    /// Invoice number the payout settles.
    pub invoice: String,
    pub description: String,
}

/// An invoice as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: String,
    pub invoice: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub status: PayoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Uploaded by the user rather than derived from a payout.
    pub uploaded: bool,
}

impl From<&PayoutRecord> for InvoiceRecord {
    fn from(p: &PayoutRecord) -> Self {
        Self {
            id: p.id.clone(),
            invoice: p.invoice.clone(),
            date: p.date,
            amount: p.amount,
            description: p.description.clone(),
            status: p.status,
            file_name: None,
            uploaded: false,
        }
    }
}

/// Payout history, uploaded invoices and the invoice open in the detail
/// view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLedger {
    pub payouts: Vec<PayoutRecord>,
    pub uploaded_invoices: Vec<InvoiceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_invoice: Option<InvoiceRecord>,
}

impl PayoutLedger {
    /// History shown to a returning user.
    pub fn demo() -> Self {
        let rows: [(&str, Decimal, (i32, u32, u32), PayoutStatus, &str, &str, &str); 5] = [
            ("p1", dec!(1250.00), (2023, 5, 15), PayoutStatus::Completed, "Bank Transfer", "INV-2023-05-01", "April commission payment"),
            ("p2", dec!(890.75), (2023, 6, 12), PayoutStatus::Completed, "Bank Transfer", "INV-2023-06-01", "May commission payment"),
            ("p3", dec!(1475.50), (2023, 7, 15), PayoutStatus::Completed, "Digital Wallet (PayPal)", "INV-2023-07-01", "June commission payment"),
            ("p4", dec!(2100.00), (2023, 8, 15), PayoutStatus::Pending, "Digital Wallet (PayPal)", "INV-2023-08-01", "July commission payment"),
            ("p5", dec!(1890.25), (2023, 9, 15), PayoutStatus::AwaitingApproval, "Digital Wallet (PayPal)", "INV-2023-09-01", "August commission payment"),
        ];
        let payouts = rows
            .into_iter()
            .map(|(id, amount, (y, m, d), status, method, invoice, description)| PayoutRecord {
                id: id.to_string(),
                amount,
                date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
                status,
                method: method.to_string(),
                invoice: invoice.to_string(),
                description: description.to_string(),
            })
            .collect();
        Self {
            payouts,
            ..Self::default()
        }
    }

    /// Every invoice, payout-derived first, then uploads in upload order.
    pub fn invoices(&self) -> Vec<InvoiceRecord> {
        self.payouts
            .iter()
            .map(InvoiceRecord::from)
            .chain(self.uploaded_invoices.iter().cloned())
            .collect()
    }

    /// Sum of completed payouts.
    pub fn total_paid(&self) -> Decimal {
        self.payouts
            .iter()
            .filter(|p| p.status == PayoutStatus::Completed)
            .map(|p| p.amount)
            .sum()
    }

    /// Record an uploaded invoice file. It awaits approval with a zero
    /// amount and an `INV-YYYYMMDD` number for `today`.
    pub fn upload_invoice(
        &mut self,
        file_name: &str,
        today: NaiveDate,
    ) -> Result<&InvoiceRecord, FlowError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(FlowError::InvoiceFileRequired);
        }
        let record = InvoiceRecord {
            id: format!("user-{}", Uuid::new_v4().simple()),
            invoice: format!("INV-{}", today.format("%Y%m%d")),
            date: today,
            amount: Decimal::ZERO,
            description: file_name.to_string(),
            status: PayoutStatus::AwaitingApproval,
            file_name: Some(file_name.to_string()),
            uploaded: true,
        };
        info!(invoice = %record.invoice, file = file_name, "Invoice uploaded");
        self.uploaded_invoices.push(record);
        Ok(&self.uploaded_invoices[self.uploaded_invoices.len() - 1])
    }

    /// Open an invoice in the detail view, by record id or invoice number.
    pub fn view_invoice(&mut self, key: &str) -> Result<&InvoiceRecord, FlowError> {
        let found = self
            .invoices()
            .into_iter()
            .find(|i| i.id == key || i.invoice.eq_ignore_ascii_case(key))
            .ok_or_else(|| FlowError::InvoiceNotFound {
                invoice: key.to_string(),
            })?;
        let selected: &InvoiceRecord = self.selected_invoice.insert(found);
        Ok(selected)
    }

    /// Close the detail view. Returns whether one was open.
    pub fn close_invoice(&mut self) -> bool {
        self.selected_invoice.take().is_some()
    }
}

/// Render an amount as dollars with thousands separators, e.g. `$1,250.00`.
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn demo_history_has_every_status() {
        let ledger = PayoutLedger::demo();
        assert_eq!(ledger.payouts.len(), 5);
        assert_eq!(ledger.payouts[0].date, day(2023, 5, 15));
        assert!(ledger.payouts.iter().any(|p| p.status == PayoutStatus::Pending));
        assert_eq!(ledger.payouts[4].status, PayoutStatus::AwaitingApproval);
        assert_eq!(ledger.total_paid(), dec!(3616.25));
    }

    #[test]
    fn upload_appends_awaiting_invoice() {
        let mut ledger = PayoutLedger::default();
        let record = ledger.upload_invoice("march.pdf", day(2024, 3, 9)).unwrap();
        assert_eq!(record.invoice, "INV-20240309");
        assert_eq!(record.status, PayoutStatus::AwaitingApproval);
        assert_eq!(record.amount, Decimal::ZERO);
        assert_eq!(record.file_name.as_deref(), Some("march.pdf"));
        assert!(record.uploaded);
        assert_eq!(ledger.invoices().len(), 1);
    }

    #[test]
    fn upload_requires_a_file_name() {
        let mut ledger = PayoutLedger::default();
        assert_eq!(
            ledger.upload_invoice("  ", day(2024, 1, 1)).unwrap_err(),
            FlowError::InvoiceFileRequired
        );
        assert!(ledger.uploaded_invoices.is_empty());
    }

    #[test]
    fn view_finds_payout_and_uploaded_invoices() {
        let mut ledger = PayoutLedger::demo();
        let id = ledger
            .upload_invoice("q3.pdf", day(2024, 9, 30))
            .unwrap()
            .id
            .clone();

        let viewed = ledger.view_invoice("inv-2023-07-01").unwrap();
        assert_eq!(viewed.amount, dec!(1475.50));
        assert!(!viewed.uploaded);

        let viewed = ledger.view_invoice(&id).unwrap();
        assert_eq!(viewed.description, "q3.pdf");
        assert_eq!(
            ledger.selected_invoice.as_ref().map(|i| i.id.as_str()),
            Some(id.as_str())
        );

        assert!(matches!(
            ledger.view_invoice("INV-1999"),
            Err(FlowError::InvoiceNotFound { .. })
        ));
        assert!(ledger.close_invoice());
        assert!(!ledger.close_invoice());
    }

    #[test]
    fn amounts_render_with_separators() {
        assert_eq!(format_amount(dec!(1250)), "$1,250.00");
        assert_eq!(format_amount(dec!(890.75)), "$890.75");
        assert_eq!(format_amount(dec!(1234567.5)), "$1,234,567.50");
        assert_eq!(format_amount(Decimal::ZERO), "$0.00");
    }
}

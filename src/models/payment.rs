use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::credits::CreditStatus;

/// Placeholder PIX charge. The payload mimics the EMV QR layout but carries
/// no real-world validity.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCharge {
    pub qr_payload: String,
    pub pix_key: String,
    pub amount: Decimal,
    pub payee_name: String,
    pub reference_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoletoSlip {
    pub download_url: String,
    pub digitable_line: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBundle {
    pub pix: PixCharge,
    pub boleto: BoletoSlip,
}

/// Billing block embedded in a batch: the bundle plus amount and due date.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub batch_id: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub pix: PixCharge,
    pub boleto: BoletoSlip,
    pub status: CreditStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Boleto,
    Receipt,
}

/// A billing artifact tracked for cascade deletion with its beneficiary.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub kind: DocumentKind,
    pub batch_id: u32,
    pub beneficiary_id: Option<u32>,
    pub filename: String,
}

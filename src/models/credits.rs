use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::payment::{BillingInfo, PaymentBundle};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    Pending,
    Settled,
    Cancelled,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    /// Sequence number scoped to the owning beneficiary.
    pub id: u32,
    pub amount: Decimal,
    pub credit_date: NaiveDate,
    pub status: CreditStatus,
    pub batch_id: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: u32,
    pub date: NaiveDate,
    pub status: CreditStatus,
    pub credit_ids: Vec<u32>,
    pub total_amount: Decimal,
    pub billing: BillingInfo,
}

/// One entry of a `POST /credit-batches` request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub beneficiary_id: u32,
    pub amount: Option<Decimal>,
    pub credit_date: NaiveDate,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueBatchRequest {
    #[serde(default)]
    pub credits: Vec<BatchItem>,
}

/// A freshly issued credit together with its owner, as echoed back to the
/// caller of a batch issuance.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDetail {
    pub beneficiary_id: u32,
    pub full_name: String,
    pub national_id: String,
    pub credit: Credit,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub batch: Batch,
    pub credits: Vec<CreditDetail>,
    pub payment: PaymentBundle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryRef {
    pub id: u32,
    pub full_name: String,
    pub national_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedCredit {
    #[serde(flatten)]
    pub credit: Credit,
    pub beneficiary: BeneficiaryRef,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchWithCredits {
    #[serde(flatten)]
    pub batch: Batch,
    pub credits: Vec<ResolvedCredit>,
}

/// The boleto falls due two calendar days before the credit date.
pub fn boleto_due_date(credit_date: NaiveDate) -> Option<NaiveDate> {
    credit_date.checked_sub_days(Days::new(2))
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::models::credits::Credit;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub id: u32,
    pub full_name: String,
    /// Always stored in the `XXX.XXX.XXX-XX` display form.
    pub national_id: String,
    pub credits: Vec<Credit>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBeneficiary {
    pub full_name: Option<String>,
    pub national_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryUpdate {
    pub full_name: Option<String>,
    pub national_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryFilter {
    pub name: Option<String>,
    pub national_id: Option<String>,
}

/// Formats a raw CPF into the canonical `XXX.XXX.XXX-XX` display form.
/// Accepts any punctuation in the input; only the digits matter.
pub fn normalize_national_id(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 11 {
        return Err(ServiceError::Validation(
            "nationalId must contain 11 digits".to_string(),
        ));
    }

    Ok(format!(
        "{}.{}.{}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..]
    ))
}

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::{Result, ServiceError};
use crate::models::beneficiaries::{Beneficiary, BeneficiaryFilter};
use crate::models::credits::{
    BatchItem, BeneficiaryRef, Credit, CreditDetail, CreditStatus, ResolvedCredit,
};

#[derive(Default)]
struct RegistryState {
    beneficiaries: Vec<Beneficiary>,
    next_id: u32,
}

/// In-memory beneficiary registry. Every public operation takes the lock
/// exactly once, so uniqueness and pending-credit checks are atomic with
/// the write they guard.
#[derive(Clone, Default)]
pub struct BeneficiaryRepository {
    state: Arc<RwLock<RegistryState>>,
}

impl BeneficiaryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self, filter: &BeneficiaryFilter) -> Vec<Beneficiary> {
        let name = filter.name.as_deref().filter(|v| !v.is_empty());
        let national_id = filter.national_id.as_deref().filter(|v| !v.is_empty());

        let state = self.state.read().await;
        state
            .beneficiaries
            .iter()
            .filter(|b| match name {
                Some(name) => b.full_name.to_lowercase().contains(&name.to_lowercase()),
                None => true,
            })
            .filter(|b| match national_id {
                Some(national_id) => b.national_id.contains(national_id),
                None => true,
            })
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u32) -> Result<Beneficiary> {
        let state = self.state.read().await;
        state
            .beneficiaries
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("beneficiary not found".to_string()))
    }

    /// `national_id` must already be normalized.
    pub async fn insert(&self, full_name: String, national_id: String) -> Result<Beneficiary> {
        let mut state = self.state.write().await;
        if state
            .beneficiaries
            .iter()
            .any(|b| b.national_id == national_id)
        {
            return Err(ServiceError::Conflict(
                "nationalId already registered".to_string(),
            ));
        }

        state.next_id += 1;
        let beneficiary = Beneficiary {
            id: state.next_id,
            full_name,
            national_id,
            credits: Vec::new(),
        };
        state.beneficiaries.push(beneficiary.clone());

        Ok(beneficiary)
    }

    /// Partial update; omitted fields keep their previous value.
    pub async fn update(
        &self,
        id: u32,
        full_name: Option<String>,
        national_id: Option<String>,
    ) -> Result<Beneficiary> {
        let mut state = self.state.write().await;
        let pos = state
            .beneficiaries
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| ServiceError::NotFound("beneficiary not found".to_string()))?;

        if let Some(national_id) = &national_id {
            if state
                .beneficiaries
                .iter()
                .any(|b| b.national_id == *national_id && b.id != id)
            {
                return Err(ServiceError::Conflict(
                    "nationalId already registered to another beneficiary".to_string(),
                ));
            }
        }

        let beneficiary = &mut state.beneficiaries[pos];
        if let Some(full_name) = full_name {
            beneficiary.full_name = full_name;
        }
        if let Some(national_id) = national_id {
            beneficiary.national_id = national_id;
        }

        Ok(beneficiary.clone())
    }

    /// Removes the beneficiary unless it still owns a pending credit, and
    /// returns the removed record so callers can cascade cleanups.
    pub async fn delete(&self, id: u32) -> Result<Beneficiary> {
        let mut state = self.state.write().await;
        let pos = state
            .beneficiaries
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| ServiceError::NotFound("beneficiary not found".to_string()))?;

        if state.beneficiaries[pos]
            .credits
            .iter()
            .any(|c| c.status == CreditStatus::Pending)
        {
            return Err(ServiceError::Conflict(
                "cannot delete beneficiary with pending credits".to_string(),
            ));
        }

        Ok(state.beneficiaries.remove(pos))
    }

    /// Validates every item and only then appends the credits, all under a
    /// single write lock. A failing item leaves the registry untouched.
    pub async fn apply_batch(
        &self,
        items: &[BatchItem],
        batch_id: u32,
        credit_date: NaiveDate,
    ) -> Result<Vec<CreditDetail>> {
        let mut state = self.state.write().await;

        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let pos = state
                .beneficiaries
                .iter()
                .position(|b| b.id == item.beneficiary_id)
                .ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "beneficiary {} not found",
                        item.beneficiary_id
                    ))
                })?;

            let amount = match item.amount {
                Some(amount) if amount > Decimal::ZERO => amount,
                _ => {
                    return Err(ServiceError::Validation(format!(
                        "invalid amount for beneficiary {}",
                        state.beneficiaries[pos].full_name
                    )))
                }
            };

            resolved.push((pos, amount));
        }

        let mut details = Vec::with_capacity(items.len());
        for (pos, amount) in resolved {
            let beneficiary = &mut state.beneficiaries[pos];
            let credit = Credit {
                id: beneficiary.credits.len() as u32 + 1,
                amount,
                credit_date,
                status: CreditStatus::Pending,
                batch_id,
            };
            beneficiary.credits.push(credit.clone());
            details.push(CreditDetail {
                beneficiary_id: beneficiary.id,
                full_name: beneficiary.full_name.clone(),
                national_id: beneficiary.national_id.clone(),
                credit,
            });
        }

        Ok(details)
    }

    /// All credits belonging to a batch, each annotated with its owner.
    pub async fn credits_for_batch(&self, batch_id: u32) -> Vec<ResolvedCredit> {
        let state = self.state.read().await;
        state
            .beneficiaries
            .iter()
            .flat_map(|b| {
                b.credits
                    .iter()
                    .filter(|c| c.batch_id == batch_id)
                    .map(move |c| ResolvedCredit {
                        credit: c.clone(),
                        beneficiary: BeneficiaryRef {
                            id: b.id,
                            full_name: b.full_name.clone(),
                            national_id: b.national_id.clone(),
                        },
                    })
            })
            .collect()
    }
}

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Result, ServiceError};
use crate::models::credits::Batch;

#[derive(Default)]
struct BatchState {
    batches: Vec<Batch>,
    next_id: u32,
}

/// In-memory batch store. Batches are immutable once inserted.
#[derive(Clone, Default)]
pub struct BatchRepository {
    state: Arc<RwLock<BatchState>>,
}

impl BatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the id for a batch before its credits are written. Ids of
    /// batches that fail validation later are simply burned.
    pub async fn reserve_id(&self) -> u32 {
        let mut state = self.state.write().await;
        state.next_id += 1;
        state.next_id
    }

    pub async fn insert(&self, batch: Batch) {
        let mut state = self.state.write().await;
        state.batches.push(batch);
    }

    pub async fn list(&self) -> Vec<Batch> {
        self.state.read().await.batches.clone()
    }

    pub async fn get(&self, id: u32) -> Result<Batch> {
        self.state
            .read()
            .await
            .batches
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("batch not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::credits::CreditStatus;
    use crate::models::payment::{BillingInfo, BoletoSlip, PixCharge};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_batch(id: u32) -> Batch {
        let pix = PixCharge {
            qr_payload: "payload".to_string(),
            pix_key: "chave@pix.com".to_string(),
            amount: dec!(15.75),
            payee_name: "Sistema de Beneficiarios LTDA".to_string(),
            reference_id: "PGTO000001".to_string(),
        };
        let boleto = BoletoSlip {
            download_url: format!("http://localhost:3000/boletos/download/{}/a.pdf", id),
            digitable_line: "23793.00000 00000.00000 00000.00000 0 00000".to_string(),
        };
        Batch {
            id,
            date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            status: CreditStatus::Pending,
            credit_ids: vec![1],
            total_amount: dec!(15.75),
            billing: BillingInfo {
                batch_id: id,
                amount: dec!(15.75),
                due_date: NaiveDate::from_ymd_opt(2026, 9, 8).unwrap(),
                pix,
                boleto,
                status: CreditStatus::Pending,
            },
        }
    }

    #[tokio::test]
    async fn test_reserved_ids_are_sequential() {
        let repository = BatchRepository::new();
        assert_eq!(repository.reserve_id().await, 1);
        assert_eq!(repository.reserve_id().await, 2);
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repository = BatchRepository::new();
        let id = repository.reserve_id().await;
        repository.insert(sample_batch(id)).await;

        let found = repository.get(id).await.unwrap();
        assert_eq!(found.total_amount, dec!(15.75));
        assert_eq!(repository.list().await.len(), 1);

        assert!(matches!(
            repository.get(99).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rust_decimal::Decimal;
use tokio::sync::oneshot;

use super::{RequestHandler, Service};
use crate::error::ServiceError;
use crate::models::credits::{
    self, Batch, BatchItem, BatchResult, BatchWithCredits, CreditStatus,
};
use crate::models::payment::{BillingInfo, DocumentKind};
use crate::repositories::batches::BatchRepository;
use crate::repositories::beneficiaries::BeneficiaryRepository;
use crate::repositories::documents::{self, DocumentRepository, ReceiptData, ReceiptRenderer};
use crate::repositories::payment::InstrumentGenerator;

pub enum BatchServiceRequest {
    Issue {
        items: Vec<BatchItem>,
        response: oneshot::Sender<Result<BatchResult, ServiceError>>,
    },
    List {
        response: oneshot::Sender<Result<Vec<Batch>, ServiceError>>,
    },
    Get {
        id: u32,
        response: oneshot::Sender<Result<BatchWithCredits, ServiceError>>,
    },
    DownloadBoleto {
        batch_id: u32,
        response: oneshot::Sender<Result<Vec<u8>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct BatchRequestHandler {
    beneficiaries: BeneficiaryRepository,
    batches: BatchRepository,
    documents: DocumentRepository,
    generator: Arc<dyn InstrumentGenerator>,
    renderer: Arc<dyn ReceiptRenderer>,
    base_url: String,
}

impl BatchRequestHandler {
    pub fn new(
        beneficiaries: BeneficiaryRepository,
        batches: BatchRepository,
        documents: DocumentRepository,
        generator: Arc<dyn InstrumentGenerator>,
        renderer: Arc<dyn ReceiptRenderer>,
        base_url: String,
    ) -> Self {
        BatchRequestHandler {
            beneficiaries,
            batches,
            documents,
            generator,
            renderer,
            base_url,
        }
    }

    async fn issue(&self, items: Vec<BatchItem>) -> Result<BatchResult, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::Validation(
                "at least one credit item is required".to_string(),
            ));
        }

        // The first item sets the date for the whole batch.
        let credit_date = items[0].credit_date;
        let today = Local::now().date_naive();
        if credit_date < today {
            return Err(ServiceError::Validation(
                "credit date cannot be before the current date".to_string(),
            ));
        }
        let due_date = credits::boleto_due_date(credit_date).ok_or_else(|| {
            ServiceError::Validation("credit date is out of range".to_string())
        })?;

        let batch_id = self.batches.reserve_id().await;
        let details = self
            .beneficiaries
            .apply_batch(&items, batch_id, credit_date)
            .await?;

        let total_amount: Decimal = details.iter().map(|d| d.credit.amount).sum();
        let credit_ids = details.iter().map(|d| d.credit.id).collect();

        let payment = self.generator.bundle(total_amount, batch_id);
        let batch = Batch {
            id: batch_id,
            date: credit_date,
            status: CreditStatus::Pending,
            credit_ids,
            total_amount,
            billing: BillingInfo {
                batch_id,
                amount: total_amount,
                due_date,
                pix: payment.pix.clone(),
                boleto: payment.boleto.clone(),
                status: CreditStatus::Pending,
            },
        };
        self.batches.insert(batch.clone()).await;

        for detail in &details {
            self.documents
                .register(
                    DocumentKind::Boleto,
                    batch_id,
                    Some(detail.beneficiary_id),
                    format!("boleto-lote-{}.pdf", batch_id),
                )
                .await;
        }

        let receipt_url = self.publish_receipt(&batch, details.len()).await?;
        log::info!(
            "Issued batch {} with {} credit(s), total {}.",
            batch_id,
            details.len(),
            total_amount
        );

        Ok(BatchResult {
            batch,
            credits: details,
            payment,
            receipt_url: Some(receipt_url),
        })
    }

    /// Renders the receipt artifact and registers it. The batch is already
    /// persisted at this point; a rendering failure surfaces as 500 without
    /// rolling the credits back.
    async fn publish_receipt(
        &self,
        batch: &Batch,
        credit_count: usize,
    ) -> Result<String, ServiceError> {
        let data = ReceiptData {
            batch,
            credit_count,
        };
        let bytes = self.renderer.render(&data).map_err(|e| {
            log::error!("Receipt rendering failed for batch {}: {}", batch.id, e);
            ServiceError::ExternalService("failed to render batch receipt".to_string())
        })?;
        log::debug!("Rendered receipt for batch {} ({} bytes).", batch.id, bytes.len());

        let filename = format!("comprovante-lote-{}.png", batch.id);
        self.documents
            .register(DocumentKind::Receipt, batch.id, None, filename.clone())
            .await;

        Ok(format!("{}/comprovantes/{}", self.base_url, filename))
    }

    async fn get(&self, id: u32) -> Result<BatchWithCredits, ServiceError> {
        let batch = self.batches.get(id).await?;
        let credits = self.beneficiaries.credits_for_batch(id).await;

        Ok(BatchWithCredits { batch, credits })
    }

    async fn download_boleto(&self, batch_id: u32) -> Result<Vec<u8>, ServiceError> {
        let batch = self
            .batches
            .get(batch_id)
            .await
            .map_err(|_| ServiceError::NotFound("boleto not found".to_string()))?;

        Ok(documents::boleto_pdf(&batch))
    }
}

#[async_trait]
impl RequestHandler<BatchServiceRequest> for BatchRequestHandler {
    async fn handle_request(&self, request: BatchServiceRequest) {
        match request {
            BatchServiceRequest::Issue { items, response } => {
                let _ = response.send(self.issue(items).await);
            }
            BatchServiceRequest::List { response } => {
                let _ = response.send(Ok(self.batches.list().await));
            }
            BatchServiceRequest::Get { id, response } => {
                let _ = response.send(self.get(id).await);
            }
            BatchServiceRequest::DownloadBoleto { batch_id, response } => {
                let _ = response.send(self.download_boleto(batch_id).await);
            }
        }
    }
}

pub struct BatchService;

impl BatchService {
    pub fn new() -> Self {
        BatchService {}
    }
}

#[async_trait]
impl Service<BatchServiceRequest, BatchRequestHandler> for BatchService {}

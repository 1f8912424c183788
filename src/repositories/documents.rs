use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::credits::Batch;
use crate::models::payment::{DocumentKind, StoredDocument};

/// Registry of generated billing artifacts. Documents that reference a
/// beneficiary are removed together with it.
#[derive(Clone, Default)]
pub struct DocumentRepository {
    documents: Arc<RwLock<Vec<StoredDocument>>>,
}

impl DocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        kind: DocumentKind,
        batch_id: u32,
        beneficiary_id: Option<u32>,
        filename: String,
    ) -> StoredDocument {
        let document = StoredDocument {
            id: Uuid::new_v4().hyphenated().to_string(),
            kind,
            batch_id,
            beneficiary_id,
            filename,
        };
        self.documents.write().await.push(document.clone());

        document
    }

    /// Returns how many documents were dropped.
    pub async fn remove_for_beneficiary(&self, beneficiary_id: u32) -> usize {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.beneficiary_id != Some(beneficiary_id));

        before - documents.len()
    }
}

/// Fake boleto document shaped like a minimal PDF. Not a
/// standards-compliant file.
pub fn boleto_pdf(batch: &Batch) -> Vec<u8> {
    let content = format!(
        "%PDF-1.3\n\
         1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
         2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
         3 0 obj\n<< /Type /Page /Parent 2 0 R /Resources << /Font << /F1 4 0 R >> >> \
         /MediaBox [0 0 612 792] /Contents 5 0 R >>\nendobj\n\
         4 0 obj\n<< /Type /Font /Subtype /Type1 /Name /F1 /BaseFont /Helvetica >>\nendobj\n\
         5 0 obj\n<< /Length 200 >>\nstream\n\
         BT\n\
         /F1 16 Tf\n\
         50 700 Td\n\
         (BOLETO BANCARIO - SISTEMA DE BENEFICIARIOS) Tj\n\
         0 -50 Td\n\
         (Valor: R$ {amount}) Tj\n\
         0 -30 Td\n\
         (Vencimento: {due_date}) Tj\n\
         0 -30 Td\n\
         (Linha Digitavel: {digitable_line}) Tj\n\
         ET\n\
         endstream\nendobj\n\
         xref\ntrailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n0\n%%EOF\n",
        amount = batch.billing.amount.round_dp(2),
        due_date = batch.billing.due_date,
        digitable_line = batch.billing.boleto.digitable_line,
    );

    content.into_bytes()
}

/// Data handed to the receipt collaborator.
pub struct ReceiptData<'a> {
    pub batch: &'a Batch,
    pub credit_count: usize,
}

/// Opaque `render(data) -> bytes` collaborator. The real renderer draws a
/// receipt image; tests and the default wiring use the placeholder below.
pub trait ReceiptRenderer: Send + Sync {
    fn render(&self, data: &ReceiptData<'_>) -> Result<Vec<u8>, anyhow::Error>;
}

/// Stand-in renderer that emits a plain-text artifact with the batch
/// summary.
pub struct PlaceholderReceiptRenderer;

impl ReceiptRenderer for PlaceholderReceiptRenderer {
    fn render(&self, data: &ReceiptData<'_>) -> Result<Vec<u8>, anyhow::Error> {
        let body = format!(
            "COMPROVANTE DE LOTE {id}\n\
             Data: {date}\n\
             Creditos: {count}\n\
             Valor total: R$ {amount}\n\
             Favorecido: {payee}\n",
            id = data.batch.id,
            date = data.batch.date,
            count = data.credit_count,
            amount = data.batch.total_amount.round_dp(2),
            payee = data.batch.billing.pix.payee_name,
        );

        Ok(body.into_bytes())
    }
}

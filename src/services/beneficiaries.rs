use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{RequestHandler, Service};
use crate::error::ServiceError;
use crate::models::beneficiaries::{self, Beneficiary, BeneficiaryFilter};
use crate::repositories::beneficiaries::BeneficiaryRepository;
use crate::repositories::documents::DocumentRepository;

pub enum BeneficiaryRequest {
    List {
        filter: BeneficiaryFilter,
        response: oneshot::Sender<Result<Vec<Beneficiary>, ServiceError>>,
    },
    Get {
        id: u32,
        response: oneshot::Sender<Result<Beneficiary, ServiceError>>,
    },
    Create {
        full_name: Option<String>,
        national_id: Option<String>,
        response: oneshot::Sender<Result<Beneficiary, ServiceError>>,
    },
    Update {
        id: u32,
        full_name: Option<String>,
        national_id: Option<String>,
        response: oneshot::Sender<Result<Beneficiary, ServiceError>>,
    },
    Delete {
        id: u32,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct BeneficiaryRequestHandler {
    repository: BeneficiaryRepository,
    documents: DocumentRepository,
}

impl BeneficiaryRequestHandler {
    pub fn new(repository: BeneficiaryRepository, documents: DocumentRepository) -> Self {
        BeneficiaryRequestHandler {
            repository,
            documents,
        }
    }

    async fn create(
        &self,
        full_name: Option<String>,
        national_id: Option<String>,
    ) -> Result<Beneficiary, ServiceError> {
        let (full_name, national_id) = match (
            full_name.filter(|v| !v.trim().is_empty()),
            national_id.filter(|v| !v.trim().is_empty()),
        ) {
            (Some(full_name), Some(national_id)) => (full_name, national_id),
            _ => {
                return Err(ServiceError::Validation(
                    "fullName and nationalId are required".to_string(),
                ))
            }
        };

        let national_id = beneficiaries::normalize_national_id(&national_id)?;
        self.repository.insert(full_name, national_id).await
    }

    async fn update(
        &self,
        id: u32,
        full_name: Option<String>,
        national_id: Option<String>,
    ) -> Result<Beneficiary, ServiceError> {
        // Blank fields behave like omitted ones.
        let full_name = full_name.filter(|v| !v.trim().is_empty());
        let national_id = match national_id.filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(beneficiaries::normalize_national_id(&raw)?),
            None => None,
        };

        self.repository.update(id, full_name, national_id).await
    }

    async fn delete(&self, id: u32) -> Result<(), ServiceError> {
        let beneficiary = self.repository.delete(id).await?;

        let removed = self.documents.remove_for_beneficiary(beneficiary.id).await;
        if removed > 0 {
            log::info!(
                "Removed {} billing document(s) for beneficiary {}.",
                removed,
                beneficiary.id
            );
        }

        Ok(())
    }
}

#[async_trait]
impl RequestHandler<BeneficiaryRequest> for BeneficiaryRequestHandler {
    async fn handle_request(&self, request: BeneficiaryRequest) {
        match request {
            BeneficiaryRequest::List { filter, response } => {
                let beneficiaries = self.repository.list(&filter).await;
                let _ = response.send(Ok(beneficiaries));
            }
            BeneficiaryRequest::Get { id, response } => {
                let _ = response.send(self.repository.get(id).await);
            }
            BeneficiaryRequest::Create {
                full_name,
                national_id,
                response,
            } => {
                let _ = response.send(self.create(full_name, national_id).await);
            }
            BeneficiaryRequest::Update {
                id,
                full_name,
                national_id,
                response,
            } => {
                let _ = response.send(self.update(id, full_name, national_id).await);
            }
            BeneficiaryRequest::Delete { id, response } => {
                let _ = response.send(self.delete(id).await);
            }
        }
    }
}

pub struct BeneficiaryService;

impl BeneficiaryService {
    pub fn new() -> Self {
        BeneficiaryService {}
    }
}

#[async_trait]
impl Service<BeneficiaryRequest, BeneficiaryRequestHandler> for BeneficiaryService {}

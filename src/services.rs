use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::batches::BatchRepository;
use crate::repositories::beneficiaries::BeneficiaryRepository;
use crate::repositories::documents::{DocumentRepository, PlaceholderReceiptRenderer};
use crate::repositories::payment::RandomInstrumentGenerator;
use crate::settings::Settings;

pub mod batches;
pub mod beneficiaries;
pub mod http;

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(settings: Settings, listen: &str) -> Result<(), anyhow::Error> {
    let beneficiary_repository = BeneficiaryRepository::new();
    let batch_repository = BatchRepository::new();
    let document_repository = DocumentRepository::new();

    let (beneficiary_tx, mut beneficiary_rx) = mpsc::channel(512);
    let (batch_tx, mut batch_rx) = mpsc::channel(512);

    log::info!("Starting beneficiary service.");
    let mut beneficiary_service = beneficiaries::BeneficiaryService::new();
    let beneficiary_handler = beneficiaries::BeneficiaryRequestHandler::new(
        beneficiary_repository.clone(),
        document_repository.clone(),
    );
    tokio::spawn(async move {
        beneficiary_service
            .run(beneficiary_handler, &mut beneficiary_rx)
            .await;
    });

    log::info!("Starting credit batch service.");
    let mut batch_service = batches::BatchService::new();
    let batch_handler = batches::BatchRequestHandler::new(
        beneficiary_repository,
        batch_repository,
        document_repository,
        Arc::new(RandomInstrumentGenerator::new(
            settings.payment.payee_name.clone(),
            settings.payment.merchant_city.clone(),
            settings.payment.base_url.clone(),
        )),
        Arc::new(PlaceholderReceiptRenderer),
        settings.payment.base_url.clone(),
    );
    tokio::spawn(async move {
        batch_service.run(batch_handler, &mut batch_rx).await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(listen, beneficiary_tx, batch_tx).await
}

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::batches::BatchServiceRequest;
use super::beneficiaries::BeneficiaryRequest;
use crate::error::ServiceError;

pub mod batches;
pub mod beneficiaries;

#[derive(Clone)]
pub struct AppState {
    pub beneficiary_channel: mpsc::Sender<BeneficiaryRequest>,
    pub batch_channel: mpsc::Sender<BatchServiceRequest>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/beneficiaries",
            get(beneficiaries::list).post(beneficiaries::create),
        )
        .route(
            "/beneficiaries/{id}",
            get(beneficiaries::get_by_id)
                .put(beneficiaries::update)
                .delete(beneficiaries::remove),
        )
        .route(
            "/credit-batches",
            get(batches::list).post(batches::issue),
        )
        .route("/credit-batches/{id}", get(batches::get_by_id))
        .route(
            "/boletos/download/{batch_id}/{filename}",
            get(batches::download_boleto),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn start_http_server(
    listen: &str,
    beneficiary_channel: mpsc::Sender<BeneficiaryRequest>,
    batch_channel: mpsc::Sender<BatchServiceRequest>,
) -> Result<(), anyhow::Error> {
    let state = AppState {
        beneficiary_channel,
        batch_channel,
    };

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// A dropped channel or responder means a service task died.
pub(crate) fn channel_error(detail: String) -> Response {
    log::error!("Service channel failure: {}", detail);
    ServiceError::Communication("service unavailable".to_string()).into_response()
}

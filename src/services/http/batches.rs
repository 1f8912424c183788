use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::oneshot;

use super::{channel_error, AppState};
use crate::models::credits::IssueBatchRequest;
use crate::services::batches::BatchServiceRequest;

pub async fn issue(State(state): State<AppState>, Json(req): Json<IssueBatchRequest>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .batch_channel
        .send(BatchServiceRequest::Issue {
            items: req.credits,
            response: tx,
        })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(result)) => (StatusCode::CREATED, Json(json!(result))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .batch_channel
        .send(BatchServiceRequest::List { response: tx })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(batches)) => (StatusCode::OK, Json(json!(batches))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .batch_channel
        .send(BatchServiceRequest::Get { id, response: tx })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(batch)) => (StatusCode::OK, Json(json!(batch))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn download_boleto(
    State(state): State<AppState>,
    Path((batch_id, _filename)): Path<(u32, String)>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .batch_channel
        .send(BatchServiceRequest::DownloadBoleto {
            batch_id,
            response: tx,
        })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=boleto-lote-{}.pdf", batch_id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

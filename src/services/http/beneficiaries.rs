use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio::sync::oneshot;

use super::{channel_error, AppState};
use crate::models::beneficiaries::{BeneficiaryFilter, BeneficiaryUpdate, NewBeneficiary};
use crate::services::beneficiaries::BeneficiaryRequest;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<BeneficiaryFilter>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .beneficiary_channel
        .send(BeneficiaryRequest::List {
            filter,
            response: tx,
        })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(beneficiaries)) => (StatusCode::OK, Json(json!(beneficiaries))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .beneficiary_channel
        .send(BeneficiaryRequest::Get { id, response: tx })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(beneficiary)) => (StatusCode::OK, Json(json!(beneficiary))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn create(State(state): State<AppState>, Json(req): Json<NewBeneficiary>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .beneficiary_channel
        .send(BeneficiaryRequest::Create {
            full_name: req.full_name,
            national_id: req.national_id,
            response: tx,
        })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(beneficiary)) => (StatusCode::CREATED, Json(json!(beneficiary))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<BeneficiaryUpdate>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .beneficiary_channel
        .send(BeneficiaryRequest::Update {
            id,
            full_name: req.full_name,
            national_id: req.national_id,
            response: tx,
        })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(beneficiary)) => (StatusCode::OK, Json(json!(beneficiary))).into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let (tx, rx) = oneshot::channel();
    let sent = state
        .beneficiary_channel
        .send(BeneficiaryRequest::Delete { id, response: tx })
        .await;
    if let Err(e) = sent {
        return channel_error(e.to_string());
    }

    match rx.await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(service_error)) => service_error.into_response(),
        Err(e) => channel_error(e.to_string()),
    }
}

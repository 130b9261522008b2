//! Resource CRUD handlers: list/read, create, update, delete.

use crate::error::AppError;
use crate::service::{parse_id, Reply, ResourceInput, ResourceService};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub id: Option<String>,
}

fn body_to_input(service: &ResourceService, body: Result<Json<Value>, JsonRejection>) -> Result<ResourceInput, AppError> {
    let Json(value) = body.map_err(|e| match e.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(e.body_text()),
        _ => AppError::BadRequest(e.body_text()),
    })?;
    ResourceInput::from_json(service.def(), value)
}

pub async fn list(
    State(service): State<ResourceService>,
    Query(params): Query<ListParams>,
) -> Result<Reply, AppError> {
    let id = match params.id.as_deref() {
        Some(raw) if !raw.is_empty() => match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            // No row can carry a non-integer id.
            Err(_) => return Ok(Reply::Rows(Vec::new())),
        },
        _ => None,
    };
    service.list(id).await
}

pub async fn create(
    State(service): State<ResourceService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Reply, AppError> {
    let input = body_to_input(&service, body)?;
    service.create(&input).await
}

pub async fn update(
    State(service): State<ResourceService>,
    Path(id_str): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Reply, AppError> {
    let id = parse_id(&id_str)?;
    let input = body_to_input(&service, body)?;
    service.update(id, &input).await
}

pub async fn delete(
    State(service): State<ResourceService>,
    Path(id_str): Path<String>,
) -> Result<Reply, AppError> {
    let id = parse_id(&id_str)?;
    service.delete(id).await
}

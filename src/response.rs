//! Response envelopes for successful service replies.

use crate::service::Reply;
use crate::store::MutationSummary;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const NO_RESULTS: &str = "The query returned no results";
pub const CREATED: &str = "Record created successfully";
pub const UNCHANGED: &str = "There are no changes to apply";
pub const UPDATED: &str = "Record updated successfully";

#[derive(Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize)]
pub struct CreatedBody {
    pub message: &'static str,
    pub data: MutationSummary,
}

pub fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(MessageBody { message: message.into() })).into_response()
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Rows(rows) => (StatusCode::OK, Json(DataBody { data: rows })).into_response(),
            Reply::NoResults => message(StatusCode::OK, NO_RESULTS),
            Reply::Created(summary) => (
                StatusCode::CREATED,
                Json(CreatedBody {
                    message: CREATED,
                    data: summary,
                }),
            )
                .into_response(),
            Reply::Unchanged => message(StatusCode::OK, UNCHANGED),
            Reply::Updated => message(StatusCode::OK, UPDATED),
            Reply::NotFound(msg) | Reply::Deleted(msg) | Reply::DeleteFailed(msg) => message(StatusCode::OK, msg),
        }
    }
}

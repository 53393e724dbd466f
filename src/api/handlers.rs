//! API handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::state::{AppState, DataState};
use crate::serialize::serialize_rows;
use crate::table::TextEncoding;

pub const NO_DATA_MESSAGE: &str = "No data found in the file";

/// Body of every non-success response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn no_data() -> Self {
        Self {
            message: Some(NO_DATA_MESSAGE.to_string()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(msg.into()),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Return every row of the loaded table
pub async fn get_data(State(state): State<AppState>) -> Result<Response, ApiError> {
    let loaded = match state.data.as_ref() {
        DataState::Ready(loaded) => loaded,
        DataState::Unavailable { reason } => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: Some(reason.clone()),
                    ..ErrorResponse::no_data()
                }),
            ));
        }
    };

    if loaded.table.is_empty() {
        return Err((StatusCode::NOT_FOUND, Json(ErrorResponse::no_data())));
    }

    let rows = serialize_rows(&loaded.table);
    let body = serde_json::to_vec(&rows).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode rows");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::error(e.to_string())),
        )
    })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// Health check with data status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let version = env!("CARGO_PKG_VERSION").to_string();

    let response = match state.data.as_ref() {
        DataState::Ready(loaded) => HealthResponse {
            status: "ready".to_string(),
            version,
            rows: Some(loaded.table.row_count()),
            columns: Some(loaded.table.column_count()),
            encoding: Some(loaded.encoding),
            skipped_lines: Some(loaded.skipped_lines),
            reason: None,
        },
        DataState::Unavailable { reason } => HealthResponse {
            status: "unavailable".to_string(),
            version,
            rows: None,
            columns: None,
            encoding: None,
            skipped_lines: None,
            reason: Some(reason.clone()),
        },
    };

    Json(response)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<TextEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

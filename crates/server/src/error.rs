use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{export::ExportError, import::ImportError};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// Everything a handler can fail with. Nothing here is fatal to the process;
/// each variant resolves to an error envelope the frontend shows as a toast.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("registro não encontrado")]
    NotFound,
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("requisição inválida: {0}")]
    BadRequest(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Export(ExportError::NaoFinalizado) => StatusCode::BAD_REQUEST,
            ApiError::Import(ImportError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Import(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Export(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

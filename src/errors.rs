use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(ErrorBody {
                error: self.to_string(),
            }),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(ErrorBody {
                error: self.to_string(),
            }),
            AppError::Internal(msg) => {
                log::error!("record service failure: {}", msg);
                HttpResponse::InternalServerError().json(ErrorBody {
                    error: "Internal server error".to_string(),
                })
            }
        }
    }
}

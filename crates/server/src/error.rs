use std::fmt;

use hybrid_ocr_pipeline::{OcrError, api::EngineAttempt};
use rocket::{
    Request,
    http::Status,
    response::{self, Responder},
    serde::json::Json,
};
use serde::Serialize;

/// API-level failure, rendered as `{"error": {"message", "type", …}}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Ocr(OcrError),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            // A misconfigured deployment, not a property of the request.
            ApiError::Ocr(OcrError::NoEngineAvailable { .. }) => Status::ServiceUnavailable,
            ApiError::Ocr(_) => Status::InternalServerError,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Ocr(err) => err.kind_label(),
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn attempts(&self) -> Option<&[EngineAttempt]> {
        match self {
            ApiError::Ocr(err) if !err.attempts().is_empty() => Some(err.attempts()),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => f.write_str(message),
            ApiError::Ocr(err) => write!(f, "{err}"),
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        ApiError::Ocr(err)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: String,
    r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<&'a [EngineAttempt]>,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: self.kind_label(),
                attempts: self.attempts(),
            },
        };
        let mut response = Json(body).respond_to(request)?;
        response.set_status(status);
        Ok(response)
    }
}

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// `abi::Error` as an HTTP response: `{ "message": ... }` with the mapped status.
#[derive(Debug)]
pub struct ApiError(pub abi::Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            abi::Error::InvalidInput
            | abi::Error::MissingTime
            | abi::Error::NoEaters
            | abi::Error::TableAlreadyReserved
            | abi::Error::DinerOverlap(_) => StatusCode::BAD_REQUEST,
            abi::Error::TableNotFound | abi::Error::ReservationNotFound => StatusCode::NOT_FOUND,
            abi::Error::DbError(_) | abi::Error::ConfigRead | abi::Error::ConfigParse => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<abi::Error> for ApiError {
    fn from(e: abi::Error) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(reason = %rejection.body_text(), "malformed request body");
        Self(abi::Error::InvalidInput)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_internal() {
            error!(error = ?self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

use crate::parser::WriteError;
use crate::tracker::TrackerError;
use axum::http::StatusCode;

pub const IMPORT_FAILED: &str = "Failed to parse JSON file.";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<WriteError> for AppError {
    fn from(err: WriteError) -> Self {
        Self::internal(err)
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::UnknownProfile(_) => Self::not_found(err.to_string()),
            TrackerError::BlankName => Self::bad_request(err.to_string()),
            TrackerError::MalformedSnapshot(_) => Self::bad_request(IMPORT_FAILED),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

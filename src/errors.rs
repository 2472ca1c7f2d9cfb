use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::JsonResponse;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("유효하지 않은 게시판입니다")]
    InvalidBoard,
    #[error("잘못된 게시글 ID입니다")]
    InvalidPostId,
    #[error("잘못된 요청 파라미터입니다")]
    InvalidQuery,
    #[error("게시글을 찾을 수 없습니다")]
    NotFound,
    #[error("서버 오류가 발생했습니다")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RequestErrorJson {
    pub error: String,
}

impl RequestErrorJson {
    pub fn new(error: &str) -> RequestErrorJson {
        RequestErrorJson {
            error: error.to_string(),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBoard
            | RequestError::InvalidPostId
            | RequestError::InvalidQuery => StatusCode::BAD_REQUEST,
            RequestError::NotFound => StatusCode::NOT_FOUND,
            RequestError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs database failures. The driver message never leaves the server.
    pub fn report(&self) {
        if let RequestError::DatabaseError(e) = self {
            tracing::error!(error = %e, "Database error");
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJson> {
        self.report();
        (
            self.status_code(),
            Json(RequestErrorJson::new(&self.to_string())),
        )
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use planner::PlannerError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PlannerError`] and renders it as a JSON body with a status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Planner(err) => match err {
                PlannerError::InputInvalid(_) => StatusCode::BAD_REQUEST,
                PlannerError::CityNotFound(_) => StatusCode::NOT_FOUND,
                PlannerError::UpstreamQuotaExhausted | PlannerError::UpstreamRateLimited => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                PlannerError::UpstreamMalformed(_) => StatusCode::BAD_GATEWAY,
                PlannerError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
                PlannerError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Planner(err) => match err {
                PlannerError::InputInvalid(_) => "INPUT_INVALID",
                PlannerError::CityNotFound(_) => "NOT_FOUND",
                PlannerError::UpstreamQuotaExhausted => "UPSTREAM_QUOTA_EXHAUSTED",
                PlannerError::UpstreamRateLimited => "UPSTREAM_RATE_LIMITED",
                PlannerError::UpstreamMalformed(_) => "UPSTREAM_MALFORMED",
                PlannerError::DeadlineExceeded => "DEADLINE_EXCEEDED",
                PlannerError::Catalog(_) => "INTERNAL_ERROR",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error");
            "An internal error occurred".to_string()
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request failed");
            self.to_string()
        };

        let body = json!({
            "error": message,
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

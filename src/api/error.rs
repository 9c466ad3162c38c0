use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

const CONFIGURATION_HEADLINE: &str = "Server configuration error";

/// HTTP face of an [`AppError`]. Handlers pick the headline message; the
/// status and details come from the error kind.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl ApiError {
    pub fn from_app(err: AppError, headline: &str) -> Self {
        let status = status_for(&err);
        let body = match err {
            AppError::NotFound(what) => ErrorBody {
                error: what,
                details: None,
                kind: None,
            },
            AppError::InvalidRequest(reason) => ErrorBody {
                error: "Invalid request".to_string(),
                details: Some(reason),
                kind: None,
            },
            AppError::Configuration(reason) => ErrorBody {
                error: CONFIGURATION_HEADLINE.to_string(),
                details: Some(reason),
                kind: None,
            },
            other => ErrorBody {
                error: headline.to_string(),
                details: Some(details_for(&other)),
                kind: None,
            },
        };
        Self { status, body }
    }

    /// Adds the error kind as `type`; the sentiment route reports it.
    pub fn with_type(mut self, err_kind: &'static str) -> Self {
        self.body.kind = Some(err_kind);
        self
    }

    /// Collapses every failure into a bare 500 with only `error`.
    pub fn opaque(headline: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: headline.to_string(),
                details: None,
                kind: None,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Upstream { .. }
        | AppError::Timeout
        | AppError::Transport(_)
        | AppError::MalformedPayload(_) => StatusCode::BAD_GATEWAY,
    }
}

fn details_for(err: &AppError) -> String {
    match err {
        AppError::Timeout => "timeout".to_string(),
        AppError::Upstream { status, message } => format!("provider returned {}: {}", status, message),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_of(err: ApiError) -> serde_json::Value {
        serde_json::to_value(&err.body).unwrap()
    }

    #[test]
    fn timeout_maps_to_bad_gateway_with_timeout_details() {
        let err = ApiError::from_app(AppError::Timeout, "Failed to fetch blockchain stats");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_of(err),
            json!({"error": "Failed to fetch blockchain stats", "details": "timeout"})
        );
    }

    #[test]
    fn not_found_has_no_details() {
        let err = ApiError::from_app(AppError::NotFound("Chain not found".into()), "ignored");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(err), json!({"error": "Chain not found"}));
    }

    #[test]
    fn configuration_errors_are_500_with_a_clear_message() {
        let err = ApiError::from_app(
            AppError::Configuration("Reddit credentials are not configured".into()),
            "Failed to fetch data from Reddit API",
        )
        .with_type("ConfigurationError");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(err),
            json!({
                "error": "Server configuration error",
                "details": "Reddit credentials are not configured",
                "type": "ConfigurationError"
            })
        );
    }

    #[test]
    fn upstream_and_malformed_errors_are_bad_gateway() {
        let upstream = AppError::Upstream {
            status: 503,
            message: "maintenance".into(),
        };
        let err = ApiError::from_app(upstream, "Failed to fetch transactions");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_of(err)["details"],
            json!("provider returned 503: maintenance")
        );

        let err = ApiError::from_app(AppError::MalformedPayload("bad".into()), "x");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn opaque_errors_only_carry_the_headline() {
        let err = ApiError::opaque("Failed to fetch data from Blockchair API");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(err),
            json!({"error": "Failed to fetch data from Blockchair API"})
        );
    }
}

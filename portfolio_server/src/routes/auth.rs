//! Bearer token guard for the admin API.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use super::AppState;
use crate::error::ApiError;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// True when `presented` matches the configured token. An empty configured
/// token never matches.
pub fn token_matches(configured: &str, presented: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    configured.as_bytes().ct_eq(presented.as_bytes()).into()
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = bearer_token(&req)
        .map(|token| token_matches(&state.config.admin_token, token))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected admin request"
        );
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortfolioConfig;
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[test]
    fn empty_configured_token_never_matches() {
        assert!(!token_matches("", ""));
        assert!(!token_matches("", "anything"));
    }

    #[test]
    fn tokens_must_match_exactly() {
        assert!(token_matches("s3cret", "s3cret"));
        assert!(!token_matches("s3cret", "s3cre"));
        assert!(!token_matches("s3cret", "s3cret!"));
    }

    #[tokio::test]
    async fn admin_requires_token() {
        let response = app()
            .oneshot(request("GET", "/admin/api/blogs", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let response = app()
            .oneshot(request("GET", "/admin/api/blogs", Some("guess"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unconfigured_token_disables_admin() {
        let app = app_with(PortfolioConfig::default());
        let response = app
            .oneshot(request("GET", "/admin/api/stats", Some(""), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

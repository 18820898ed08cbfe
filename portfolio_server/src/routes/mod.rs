//! HTTP routes: the public content API under `/api` and the token-guarded
//! admin API under `/admin/api`.
//!
//! Public paths keep their trailing slash (`/api/blog-posts/`), admin
//! paths do not.

pub mod admin;
pub mod auth;
pub mod backup;
pub mod client;
pub mod engagement;
pub mod public;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use diesel_async::pooled_connection::deadpool::Object;
use diesel_async::AsyncPgConnection;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::PortfolioConfig;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<PortfolioConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: PortfolioConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    pub async fn conn(&self) -> ApiResult<Object<AsyncPgConnection>> {
        Ok(self.pool.get().await?)
    }
}

/// Unwrap a JSON body, turning axum's rejection into the API error shape.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn cors_layer(config: &PortfolioConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if config.cors_origins.is_empty() {
        return base.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

fn timeout_layer(config: &PortfolioConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_secs),
    )
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let public = Router::new()
        .route("/api/", get(public::index))
        .route("/api/education/", get(public::education_list))
        .route("/api/education/{id}/", get(public::education_detail))
        .route("/api/experience/", get(public::experience_list))
        .route("/api/experience/{id}/", get(public::experience_detail))
        .route("/api/projects/", get(public::project_list))
        .route("/api/projects/{slug}/", get(public::project_detail))
        .route("/api/research/", get(public::research_list))
        .route("/api/research/{slug}/", get(public::research_detail))
        .route("/api/research-icons/", get(public::research_icons))
        .route("/api/home/", get(public::home))
        .route("/api/blogs/", get(public::blogs_data))
        .route("/api/blogs/category/{category}/", get(public::blogs_by_category))
        .route("/api/blog-posts/", get(public::blog_list))
        .route("/api/blog-posts/{slug}/", get(public::blog_detail))
        .route("/api/trending-blogs/", get(public::trending_blogs))
        .route("/api/featured-blogs/", get(public::featured_blogs))
        .route("/api/blog-settings/", get(public::blog_settings))
        .route("/api/media/", get(public::media_list))
        .route("/api/media/{uuid}/", get(public::media_detail))
        .route("/api/cdn/{slug}", get(public::cdn))
        .route("/api/newsletter/subscribe/", post(public::subscribe))
        .route(
            "/api/blog-posts/{slug}/increment-view/",
            post(engagement::increment_view),
        )
        .route(
            "/api/blog-posts/{slug}/toggle-like/",
            post(engagement::toggle_like),
        )
        .route(
            "/api/blog-posts/{slug}/update-duration/",
            post(engagement::update_duration),
        )
        .route(
            "/api/blog-posts/{slug}/comments/",
            post(engagement::create_comment),
        )
        .route(
            "/api/blog-posts/{slug}/comments/list/",
            get(engagement::list_comments),
        );

    let admin = admin::router(&config)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CompressionLayer::new())
        .layer(timeout_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use http_body_util::BodyExt;

    pub const TOKEN: &str = "test-admin-token";

    /// Router over a pool that never connects: handlers that reach the
    /// database would fail, so tests only exercise paths that return first.
    pub fn app() -> Router {
        app_with(PortfolioConfig {
            admin_token: TOKEN.to_string(),
            ..PortfolioConfig::default()
        })
    }

    pub fn app_with(config: PortfolioConfig) -> Router {
        let pool = crate::db::build_pool("postgres://localhost:1/unused", 1).unwrap();
        build_router(AppState::new(pool, config))
    }

    pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn index_lists_endpoints() {
        let response = app()
            .oneshot(request("GET", "/api/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let available = body["available"].as_array().unwrap();
        assert!(available.iter().any(|v| v == "blog-posts"));
        assert!(available.iter().any(|v| v == "research_icons"));
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let response = app()
            .oneshot(request("GET", "/api/nope/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_nosniff() {
        let response = app()
            .oneshot(request("GET", "/api/", None, None))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let req = axum::http::Request::builder()
            .method("OPTIONS")
            .uri("/api/blog-posts/")
            .header("Origin", "https://reader.example")
            .header("Access-Control-Request-Method", "GET")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[test]
    fn configured_origins_are_parsed() {
        let config = PortfolioConfig {
            cors_origins: vec!["https://a.example".into(), "bad\norigin".into()],
            ..PortfolioConfig::default()
        };
        // Invalid origins are skipped rather than failing startup.
        let _ = cors_layer(&config);
    }

    #[tokio::test]
    async fn slow_requests_time_out_with_408() {
        let config = PortfolioConfig {
            request_timeout_secs: 0,
            ..PortfolioConfig::default()
        };
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "done"
                }),
            )
            .layer(timeout_layer(&config));
        let response = app
            .oneshot(request("GET", "/slow", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn malformed_json_uses_error_shape() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/newsletter/subscribe/",
                None,
                Some("{not json"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }
}

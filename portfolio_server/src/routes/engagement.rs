//! Reader interactions on published posts: views, likes, reading time and
//! comments.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::client::ClientMeta;
use super::{json_body, AppState};
use crate::error::{ApiError, ApiResult};
use crate::models::blog::Blog;
use crate::models::comment::{BlogComment, CommentEcho, CommentRequest};
use crate::services::engagement_service::{self, Device, LikeAction};
use crate::services::{blog_service, comment_service};

#[derive(Debug, Default, Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LikeRequest {
    #[serde(default)]
    pub fingerprint: String,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DurationRequest {
    #[serde(default)]
    pub fingerprint: String,
    pub duration: Option<i64>,
}

async fn published_blog(
    conn: &mut diesel_async::AsyncPgConnection,
    slug: &str,
) -> ApiResult<Blog> {
    blog_service::find_published(conn, slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))
}

fn device(fingerprint: String, session_id: &str, client: ClientMeta) -> Device {
    Device::new(fingerprint, session_id, client.ip_address, client.user_agent)
}

fn checked_fingerprint(raw: &str) -> ApiResult<String> {
    let fingerprint = raw.trim();
    engagement_service::validate_fingerprint(fingerprint).map_err(ApiError::BadRequest)?;
    Ok(fingerprint.to_string())
}

/// `400` carrying the current counter so the client can still render it.
fn fingerprint_required(counter: &str, value: i32) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": "Fingerprint is required",
            counter: value,
        })),
    )
        .into_response()
}

pub async fn increment_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    client: ClientMeta,
    payload: Result<Json<ViewRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(payload)?;
    let fingerprint = checked_fingerprint(&req.fingerprint)?;
    let mut conn = state.conn().await?;
    let blog = published_blog(&mut conn, &slug).await?;
    if fingerprint.is_empty() {
        return Ok(fingerprint_required("views", blog.views));
    }

    let device = device(fingerprint, &req.session_id, client);
    let outcome = engagement_service::record_view(&mut conn, blog.id, &device).await?;
    Ok(Json(json!({
        "success": true,
        "message": outcome.message(),
        "views": outcome.views,
        "is_new_view": outcome.is_new_view,
    }))
    .into_response())
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    client: ClientMeta,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(payload)?;
    let fingerprint = checked_fingerprint(&req.fingerprint)?;
    let mut conn = state.conn().await?;
    let blog = published_blog(&mut conn, &slug).await?;
    if fingerprint.is_empty() {
        return Ok(fingerprint_required("likes", blog.likes));
    }
    let action = LikeAction::parse(req.action.as_deref()).ok_or_else(|| {
        ApiError::BadRequest(r#"Invalid action. Use "like" or "unlike""#.into())
    })?;

    let device = device(fingerprint, "", client);
    let outcome = engagement_service::toggle_like(&mut conn, blog.id, &device, action).await?;
    Ok(Json(json!({
        "success": true,
        "message": outcome.message,
        "likes": outcome.likes,
        "is_liked": outcome.is_liked,
    }))
    .into_response())
}

pub async fn update_duration(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<DurationRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let req = json_body(payload)?;
    let fingerprint = checked_fingerprint(&req.fingerprint)?;
    if fingerprint.is_empty() {
        return Err(ApiError::BadRequest("Fingerprint is required".into()));
    }
    let seconds = req
        .duration
        .ok_or_else(|| ApiError::BadRequest("Duration is required".into()))
        .and_then(|d| engagement_service::validate_duration(d).map_err(ApiError::BadRequest))?;

    let mut conn = state.conn().await?;
    let blog = published_blog(&mut conn, &slug).await?;
    let total = engagement_service::add_duration(&mut conn, blog.id, &fingerprint, seconds)
        .await?
        .ok_or_else(|| ApiError::NotFound("No view recorded for this device".into()))?;

    Ok(Json(json!({
        "success": true,
        "total_duration": total,
        "total_duration_display": crate::format::display_duration(i64::from(total)),
    })))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(payload)?;
    let mut conn = state.conn().await?;
    let blog = published_blog(&mut conn, &slug).await?;
    if !blog.allow_comments {
        return Err(ApiError::Forbidden(
            "Comments are disabled for this blog".into(),
        ));
    }

    let new_comment = comment_service::validate(blog.id, &req).map_err(ApiError::BadRequest)?;
    let comment = comment_service::create_comment(&mut conn, new_comment).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Comment added successfully",
            "comment": CommentEcho::from(comment),
        })),
    )
        .into_response())
}

/// Approved comments, newest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<BlogComment>>> {
    let mut conn = state.conn().await?;
    let blog = published_blog(&mut conn, &slug).await?;
    Ok(Json(comment_service::list_approved(&mut conn, blog.id).await?))
}

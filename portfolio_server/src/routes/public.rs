//! Read-only content endpoints and the newsletter signup.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use super::{json_body, AppState};
use crate::error::{ApiError, ApiResult};
use crate::models::blog::{BlogDetail, BlogListItem};
use crate::models::education::EducationEntry;
use crate::models::experience::ExperienceEntry;
use crate::models::media::{MediaDetail, MediaFile, MediaListItem};
use crate::models::newsletter::SubscribeRequest;
use crate::models::project::Project;
use crate::models::research::{ResearchIcon, ResearchPublication};
use crate::models::settings::{BlogsData, TrackingSettings};
use crate::services::newsletter_service::{self, SubscribeOutcome};
use crate::services::{
    blog_service, education_service, experience_service, media_service, project_service,
    research_service, singleton_service,
};

const AVAILABLE: [&str; 10] = [
    "education",
    "experience",
    "projects",
    "research_publications",
    "research_icons",
    "home",
    "blogs",
    "blog-posts",
    "trending-blogs",
    "featured-blogs",
];

pub async fn index() -> Json<Value> {
    Json(json!({ "available": AVAILABLE }))
}

// ── Portfolio ──

pub async fn education_list(State(state): State<AppState>) -> ApiResult<Json<Vec<EducationEntry>>> {
    let mut conn = state.conn().await?;
    Ok(Json(education_service::list_visible(&mut conn).await?))
}

pub async fn education_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EducationEntry>> {
    let mut conn = state.conn().await?;
    education_service::find_visible(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Education entry"))
}

pub async fn experience_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ExperienceEntry>>> {
    let mut conn = state.conn().await?;
    Ok(Json(experience_service::list_visible(&mut conn).await?))
}

pub async fn experience_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ExperienceEntry>> {
    let mut conn = state.conn().await?;
    experience_service::find_visible(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Experience entry"))
}

pub async fn project_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let mut conn = state.conn().await?;
    Ok(Json(project_service::list_visible(&mut conn).await?))
}

pub async fn project_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Project>> {
    let mut conn = state.conn().await?;
    project_service::find_by_slug(&mut conn, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project"))
}

pub async fn research_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ResearchPublication>>> {
    let mut conn = state.conn().await?;
    Ok(Json(research_service::list_visible(&mut conn).await?))
}

pub async fn research_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ResearchPublication>> {
    let mut conn = state.conn().await?;
    research_service::find_by_slug(&mut conn, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research publication"))
}

pub async fn research_icons(State(state): State<AppState>) -> ApiResult<Json<Vec<ResearchIcon>>> {
    let mut conn = state.conn().await?;
    Ok(Json(research_service::list_icons(&mut conn).await?))
}

pub async fn home(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let mut conn = state.conn().await?;
    singleton_service::get_home(&mut conn)
        .await?
        .map(|home| Json(home.to_document()))
        .ok_or_else(|| ApiError::not_found("Home data"))
}

pub async fn blogs_data(State(state): State<AppState>) -> ApiResult<Json<BlogsData>> {
    let mut conn = state.conn().await?;
    singleton_service::get_blogs_data(&mut conn)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blogs data"))
}

// ── Blog posts ──

fn list_items(blogs: Vec<crate::models::blog::Blog>) -> Json<Vec<BlogListItem>> {
    Json(blogs.into_iter().map(BlogListItem::from).collect())
}

pub async fn blog_list(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogListItem>>> {
    let mut conn = state.conn().await?;
    Ok(list_items(blog_service::list_published(&mut conn).await?))
}

pub async fn blog_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogDetail>> {
    let mut conn = state.conn().await?;
    blog_service::find_published(&mut conn, &slug)
        .await?
        .map(|blog| Json(BlogDetail::from(blog)))
        .ok_or_else(|| ApiError::not_found("Blog"))
}

pub async fn trending_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogListItem>>> {
    let mut conn = state.conn().await?;
    Ok(list_items(blog_service::list_trending(&mut conn).await?))
}

pub async fn featured_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogListItem>>> {
    let mut conn = state.conn().await?;
    Ok(list_items(blog_service::list_featured(&mut conn).await?))
}

pub async fn blogs_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<BlogListItem>>> {
    let mut conn = state.conn().await?;
    Ok(list_items(
        blog_service::list_by_category(&mut conn, &category).await?,
    ))
}

pub async fn blog_settings(State(state): State<AppState>) -> ApiResult<Json<TrackingSettings>> {
    let mut conn = state.conn().await?;
    Ok(Json(singleton_service::get_settings(&mut conn).await?))
}

// ── Media ──

pub async fn media_list(State(state): State<AppState>) -> ApiResult<Json<Vec<MediaListItem>>> {
    let mut conn = state.conn().await?;
    let media = media_service::list_public(&mut conn).await?;
    Ok(Json(
        media
            .iter()
            .map(|m| m.to_list_item(&state.config.public_url))
            .collect(),
    ))
}

pub async fn media_detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Json<MediaDetail>> {
    let uuid = Uuid::parse_str(&raw).map_err(|_| ApiError::not_found("Media file"))?;
    let mut conn = state.conn().await?;
    media_service::find_public_by_uuid(&mut conn, uuid)
        .await?
        .map(|m| Json(m.to_detail(&state.config.public_url)))
        .ok_or_else(|| ApiError::not_found("Media file"))
}

/// Stream a public media file by slug.
pub async fn cdn(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Response> {
    let mut conn = state.conn().await?;
    let media = media_service::find_public_by_slug(&mut conn, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Media file"))?;
    drop(conn);

    let (file, len) = media_service::open_file(&state.config, &media)
        .await?
        .ok_or_else(|| ApiError::not_found("Media file"))?;
    Ok(file_response(&media, file, len))
}

fn file_response(media: &MediaFile, file: tokio::fs::File, len: u64) -> Response {
    let disposition = format!(
        "inline; filename=\"{}\"",
        media.original_filename.replace(['"', '\\'], "_")
    );
    (
        [
            (header::CONTENT_TYPE, media.mime_type.clone()),
            (header::CONTENT_LENGTH, len.to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}

// ── Newsletter ──

pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(payload)?;
    let email = newsletter_service::normalize_email(&req.email)
        .ok_or_else(|| ApiError::BadRequest("Enter a valid email address.".into()))?;

    let mut conn = state.conn().await?;
    let (status, message) = match newsletter_service::subscribe(&mut conn, &email).await? {
        SubscribeOutcome::AlreadySubscribed => {
            return Err(ApiError::BadRequest(
                "This email is already subscribed to our newsletter.".into(),
            ))
        }
        SubscribeOutcome::Subscribed(_) => {
            (StatusCode::CREATED, "Successfully subscribed to the newsletter.")
        }
        SubscribeOutcome::Reactivated(_) => (StatusCode::OK, "Subscription re-activated."),
    };
    tracing::info!(email = %email, "Newsletter subscription");
    Ok((
        status,
        Json(json!({ "success": true, "message": message, "email": email })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn invalid_email_is_rejected_before_lookup() {
        let response = app()
            .oneshot(request(
                "POST",
                "/api/newsletter/subscribe/",
                None,
                Some(r#"{"email": "not-an-address"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Enter a valid email address.");
    }

    #[tokio::test]
    async fn missing_email_is_rejected() {
        let response = app()
            .oneshot(request("POST", "/api/newsletter/subscribe/", None, Some("{}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_media_uuid_is_404() {
        let response = app()
            .oneshot(request("GET", "/api/media/not-a-uuid/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn education_id_must_be_numeric() {
        let response = app()
            .oneshot(request("GET", "/api/education/abc/", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cdn_response_streams_file_with_headers() {
        use http_body_util::BodyExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.7 body").unwrap();
        let file = tokio::fs::File::open(&path).await.unwrap();

        let now = chrono::Utc::now();
        let media = super::MediaFile {
            id: 1,
            uuid: uuid::Uuid::nil(),
            slug: "cv".into(),
            file_type: "document".into(),
            original_filename: "My \"CV\".pdf".into(),
            file_path: "uploads/2026/10/cv.pdf".into(),
            file_size: 13,
            mime_type: "application/pdf".into(),
            title: "CV".into(),
            alt_text: String::new(),
            is_public: true,
            uploaded_at: now,
            updated_at: now,
        };

        let response = super::file_response(&media, file, 13);
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["content-type"], "application/pdf");
        assert_eq!(headers["content-length"], "13");
        assert_eq!(headers["cache-control"], "public, max-age=86400");
        assert_eq!(headers["content-disposition"], "inline; filename=\"My _CV_.pdf\"");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"%PDF-1.7 body");
    }
}

//! Content editing API, mounted under `/admin/api` behind
//! [`super::auth::require_admin`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::{backup, json_body, AppState};
use crate::config::PortfolioConfig;
use crate::dashboard::stats::{self, DashboardStats};
use crate::error::{ApiError, ApiResult};
use crate::format::fill_slug;
use crate::models::blog::{Blog, BlogInput};
use crate::models::comment::{BlogComment, CommentRequest, CommentUpdate};
use crate::models::education::{EducationEntry, EducationInput};
use crate::models::engagement::{BlogLike, BlogViewLog};
use crate::models::experience::{ExperienceEntry, ExperienceInput};
use crate::models::home::{HomeData, HomeInput};
use crate::models::media::{MediaDetail, MediaUpdate};
use crate::models::newsletter::NewsletterSubscriber;
use crate::models::project::{Project, ProjectInput};
use crate::models::research::{ResearchIcon, ResearchIconInput, ResearchInput, ResearchPublication};
use crate::models::settings::{BlogSettings, BlogsData, BlogsDataInput, TrackingSettings};
use crate::services::blog_service::{self, BlogAction, BlogFilter};
use crate::services::comment_service::{self, CommentAction, CommentFilter};
use crate::services::engagement_service::{self, EngagementFilter};
use crate::services::media_service::{self, Upload};
use crate::services::{
    education_service, experience_service, newsletter_service, project_service, research_service,
    singleton_service,
};

pub fn router(config: &PortfolioConfig) -> Router<AppState> {
    Router::new()
        .route("/admin/api/education", get(education_list).post(education_create))
        .route(
            "/admin/api/education/{id}",
            get(education_get).put(education_update).delete(education_delete),
        )
        .route("/admin/api/experience", get(experience_list).post(experience_create))
        .route(
            "/admin/api/experience/{id}",
            get(experience_get).put(experience_update).delete(experience_delete),
        )
        .route("/admin/api/projects", get(project_list).post(project_create))
        .route(
            "/admin/api/projects/{id}",
            get(project_get).put(project_update).delete(project_delete),
        )
        .route("/admin/api/research", get(research_list).post(research_create))
        .route(
            "/admin/api/research/{id}",
            get(research_get).put(research_update).delete(research_delete),
        )
        .route("/admin/api/research-icons", get(icon_list).post(icon_create))
        .route(
            "/admin/api/research-icons/{id}",
            get(icon_get).put(icon_update).delete(icon_delete),
        )
        .route("/admin/api/blogs", get(blog_list).post(blog_create))
        .route("/admin/api/blogs/actions", post(blog_actions))
        .route(
            "/admin/api/blogs/{id}",
            get(blog_get).put(blog_update).delete(blog_delete),
        )
        .route("/admin/api/comments", get(comment_list).post(comment_create))
        .route("/admin/api/comments/actions", post(comment_actions))
        .route(
            "/admin/api/comments/{id}",
            get(comment_get).put(comment_update).delete(comment_delete),
        )
        .route("/admin/api/media", get(media_list).post(media_upload))
        .route(
            "/admin/api/media/{id}",
            get(media_get).put(media_update).delete(media_delete),
        )
        .route("/admin/api/newsletter", get(subscriber_list))
        .route(
            "/admin/api/newsletter/{id}",
            axum::routing::delete(subscriber_delete),
        )
        .route("/admin/api/home", get(home_get).put(home_put))
        .route("/admin/api/blogs-data", get(blogs_data_get).put(blogs_data_put))
        .route("/admin/api/blog-settings", get(settings_get).put(settings_put))
        .route("/admin/api/blog-views", get(view_log))
        .route("/admin/api/blog-likes", get(like_log))
        .route("/admin/api/stats", get(dashboard))
        .route("/admin/api/backup/export", get(backup::export))
        .route(
            "/admin/api/backup/import",
            post(backup::import).layer(DefaultBodyLimit::max(config.max_backup_bytes())),
        )
}

fn created<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

fn deleted(found: bool, what: &str) -> ApiResult<StatusCode> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(what))
    }
}

fn require_slug(slug: &mut String, title: &str) -> ApiResult<()> {
    if fill_slug(slug, title) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "A slug or a title with letters or digits is required".into(),
        ))
    }
}

// ── Education ──

async fn education_list(State(state): State<AppState>) -> ApiResult<Json<Vec<EducationEntry>>> {
    let mut conn = state.conn().await?;
    Ok(Json(education_service::list_all(&mut conn).await?))
}

async fn education_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EducationEntry>> {
    let mut conn = state.conn().await?;
    education_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Education entry"))
}

async fn education_create(
    State(state): State<AppState>,
    payload: Result<Json<EducationInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    Ok(created(education_service::create(&mut conn, &input).await?))
}

async fn education_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<EducationInput>, JsonRejection>,
) -> ApiResult<Json<EducationEntry>> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    education_service::update(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Education entry"))
}

async fn education_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(
        education_service::delete(&mut conn, id).await?,
        "Education entry",
    )
}

// ── Experience ──

async fn experience_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ExperienceEntry>>> {
    let mut conn = state.conn().await?;
    Ok(Json(experience_service::list_all(&mut conn).await?))
}

async fn experience_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ExperienceEntry>> {
    let mut conn = state.conn().await?;
    experience_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Experience entry"))
}

async fn experience_create(
    State(state): State<AppState>,
    payload: Result<Json<ExperienceInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    Ok(created(experience_service::create(&mut conn, &input).await?))
}

async fn experience_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ExperienceInput>, JsonRejection>,
) -> ApiResult<Json<ExperienceEntry>> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    experience_service::update(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Experience entry"))
}

async fn experience_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(
        experience_service::delete(&mut conn, id).await?,
        "Experience entry",
    )
}

// ── Projects ──

async fn project_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let mut conn = state.conn().await?;
    Ok(Json(project_service::list_all(&mut conn).await?))
}

async fn project_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let mut conn = state.conn().await?;
    project_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project"))
}

async fn project_create(
    State(state): State<AppState>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Response> {
    let mut input = json_body(payload)?;
    require_slug(&mut input.slug, &input.title)?;
    let mut conn = state.conn().await?;
    Ok(created(project_service::create_project(&mut conn, &input).await?))
}

async fn project_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let mut input = json_body(payload)?;
    require_slug(&mut input.slug, &input.title)?;
    let mut conn = state.conn().await?;
    project_service::update_project(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project"))
}

async fn project_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(project_service::delete_project(&mut conn, id).await?, "Project")
}

// ── Research ──

async fn research_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ResearchPublication>>> {
    let mut conn = state.conn().await?;
    Ok(Json(research_service::list_all(&mut conn).await?))
}

async fn research_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ResearchPublication>> {
    let mut conn = state.conn().await?;
    research_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research publication"))
}

async fn research_create(
    State(state): State<AppState>,
    payload: Result<Json<ResearchInput>, JsonRejection>,
) -> ApiResult<Response> {
    let mut input = json_body(payload)?;
    require_slug(&mut input.slug, &input.title)?;
    let mut conn = state.conn().await?;
    Ok(created(research_service::create(&mut conn, &input).await?))
}

async fn research_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ResearchInput>, JsonRejection>,
) -> ApiResult<Json<ResearchPublication>> {
    let mut input = json_body(payload)?;
    require_slug(&mut input.slug, &input.title)?;
    let mut conn = state.conn().await?;
    research_service::update(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research publication"))
}

async fn research_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(
        research_service::delete(&mut conn, id).await?,
        "Research publication",
    )
}

async fn icon_list(State(state): State<AppState>) -> ApiResult<Json<Vec<ResearchIcon>>> {
    let mut conn = state.conn().await?;
    Ok(Json(research_service::list_icons(&mut conn).await?))
}

async fn icon_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ResearchIcon>> {
    let mut conn = state.conn().await?;
    research_service::find_icon(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research icon"))
}

async fn icon_create(
    State(state): State<AppState>,
    payload: Result<Json<ResearchIconInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    Ok(created(research_service::create_icon(&mut conn, &input).await?))
}

async fn icon_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ResearchIconInput>, JsonRejection>,
) -> ApiResult<Json<ResearchIcon>> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    research_service::update_icon(&mut conn, id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Research icon"))
}

async fn icon_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(
        research_service::delete_icon(&mut conn, id).await?,
        "Research icon",
    )
}

// ── Blogs ──

#[derive(Debug, Deserialize)]
struct ActionRequest<A> {
    action: A,
    #[serde(default)]
    ids: Vec<i64>,
}

async fn blog_list(
    State(state): State<AppState>,
    Query(filter): Query<BlogFilter>,
) -> ApiResult<Json<Vec<Blog>>> {
    let mut conn = state.conn().await?;
    Ok(Json(blog_service::list_admin(&mut conn, &filter).await?))
}

async fn blog_get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Blog>> {
    let mut conn = state.conn().await?;
    blog_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blog"))
}

fn prepared(payload: Result<Json<BlogInput>, JsonRejection>) -> ApiResult<BlogInput> {
    let mut input = json_body(payload)?;
    if !blog_service::prepare_input(&mut input) {
        return Err(ApiError::BadRequest(
            "A slug or a title with letters or digits is required".into(),
        ));
    }
    Ok(input)
}

async fn blog_create(
    State(state): State<AppState>,
    payload: Result<Json<BlogInput>, JsonRejection>,
) -> ApiResult<Response> {
    let input = prepared(payload)?;
    let mut conn = state.conn().await?;
    Ok(created(blog_service::create(&mut conn, &input).await?))
}

async fn blog_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<BlogInput>, JsonRejection>,
) -> ApiResult<Json<Blog>> {
    let input = prepared(payload)?;
    let mut conn = state.conn().await?;
    let blog = blog_service::update(&mut conn, id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    tracing::info!(blog_id = blog.id, slug = %blog.slug, "Blog updated");
    Ok(Json(blog))
}

async fn blog_delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(blog_service::delete(&mut conn, id).await?, "Blog")
}

async fn blog_actions(
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest<BlogAction>>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let req = json_body(payload)?;
    let mut conn = state.conn().await?;
    let updated = blog_service::apply_action(&mut conn, req.action, &req.ids).await?;
    Ok(Json(json!({ "updated": updated })))
}

// ── Comments ──

#[derive(Debug, Deserialize)]
struct AdminCommentRequest {
    blog: i64,
    #[serde(flatten)]
    comment: CommentRequest,
}

async fn comment_list(
    State(state): State<AppState>,
    Query(filter): Query<CommentFilter>,
) -> ApiResult<Json<Vec<BlogComment>>> {
    let mut conn = state.conn().await?;
    Ok(Json(comment_service::list_admin(&mut conn, &filter).await?))
}

async fn comment_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BlogComment>> {
    let mut conn = state.conn().await?;
    comment_service::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Comment"))
}

async fn comment_create(
    State(state): State<AppState>,
    payload: Result<Json<AdminCommentRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let req = json_body(payload)?;
    let new_comment =
        comment_service::validate(req.blog, &req.comment).map_err(ApiError::BadRequest)?;
    let mut conn = state.conn().await?;
    Ok(created(comment_service::create_comment(&mut conn, new_comment).await?))
}

async fn comment_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CommentUpdate>, JsonRejection>,
) -> ApiResult<Json<BlogComment>> {
    let changes = json_body(payload)?;
    let mut conn = state.conn().await?;
    comment_service::update(&mut conn, id, &changes)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Comment"))
}

async fn comment_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(comment_service::delete(&mut conn, id).await?, "Comment")
}

async fn comment_actions(
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest<CommentAction>>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let req = json_body(payload)?;
    let mut conn = state.conn().await?;
    let updated = comment_service::apply_action(&mut conn, req.action, &req.ids).await?;
    Ok(Json(json!({ "updated": updated })))
}

// ── Media ──

async fn media_list(State(state): State<AppState>) -> ApiResult<Json<Vec<MediaDetail>>> {
    let mut conn = state.conn().await?;
    let media = media_service::list_all(&mut conn).await?;
    Ok(Json(
        media
            .iter()
            .map(|m| m.to_detail(&state.config.public_url))
            .collect(),
    ))
}

async fn media_get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MediaDetail>> {
    let mut conn = state.conn().await?;
    media_service::find(&mut conn, id)
        .await?
        .map(|m| Json(m.to_detail(&state.config.public_url)))
        .ok_or_else(|| ApiError::not_found("Media file"))
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Collect the multipart upload form into an [`Upload`].
async fn read_upload(mut multipart: Multipart) -> ApiResult<Upload> {
    let mut upload = Upload {
        filename: String::new(),
        bytes: Vec::new(),
        title: String::new(),
        alt_text: String::new(),
        slug: String::new(),
        is_public: true,
    };
    let mut has_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.filename = field.file_name().unwrap_or("upload").to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?
                    .to_vec();
                has_file = true;
            }
            "title" | "alt_text" | "slug" | "is_public" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                match name.as_str() {
                    "title" => upload.title = text.trim().to_string(),
                    "alt_text" => upload.alt_text = text.trim().to_string(),
                    "slug" => upload.slug = text.trim().to_string(),
                    _ => upload.is_public = truthy(&text),
                }
            }
            _ => {}
        }
    }

    if !has_file || upload.bytes.is_empty() {
        return Err(ApiError::BadRequest("No file was submitted.".into()));
    }
    Ok(upload)
}

async fn media_upload(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let upload = read_upload(multipart).await?;
    let mut conn = state.conn().await?;
    let media = media_service::store_upload(&mut conn, &state.config, upload).await?;
    Ok(created(media.to_detail(&state.config.public_url)))
}

async fn media_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<MediaUpdate>, JsonRejection>,
) -> ApiResult<Json<MediaDetail>> {
    let changes = json_body(payload)?;
    let mut conn = state.conn().await?;
    media_service::update(&mut conn, id, &changes)
        .await?
        .map(|m| Json(m.to_detail(&state.config.public_url)))
        .ok_or_else(|| ApiError::not_found("Media file"))
}

async fn media_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(
        media_service::delete(&mut conn, &state.config, id).await?,
        "Media file",
    )
}

// ── Newsletter ──

async fn subscriber_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NewsletterSubscriber>>> {
    let mut conn = state.conn().await?;
    Ok(Json(newsletter_service::list(&mut conn).await?))
}

async fn subscriber_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    deleted(newsletter_service::delete(&mut conn, id).await?, "Subscriber")
}

// ── Singletons ──

async fn home_get(State(state): State<AppState>) -> ApiResult<Json<HomeData>> {
    let mut conn = state.conn().await?;
    singleton_service::get_home(&mut conn)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Home data"))
}

async fn home_put(
    State(state): State<AppState>,
    payload: Result<Json<HomeInput>, JsonRejection>,
) -> ApiResult<Json<HomeData>> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    Ok(Json(singleton_service::save_home(&mut conn, input).await?))
}

async fn blogs_data_get(State(state): State<AppState>) -> ApiResult<Json<BlogsData>> {
    let mut conn = state.conn().await?;
    singleton_service::get_blogs_data(&mut conn)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blogs data"))
}

async fn blogs_data_put(
    State(state): State<AppState>,
    payload: Result<Json<BlogsDataInput>, JsonRejection>,
) -> ApiResult<Json<BlogsData>> {
    let input = json_body(payload)?;
    let mut conn = state.conn().await?;
    Ok(Json(singleton_service::save_blogs_data(&mut conn, &input).await?))
}

async fn settings_get(State(state): State<AppState>) -> ApiResult<Json<TrackingSettings>> {
    let mut conn = state.conn().await?;
    Ok(Json(singleton_service::get_settings(&mut conn).await?))
}

async fn settings_put(
    State(state): State<AppState>,
    payload: Result<Json<TrackingSettings>, JsonRejection>,
) -> ApiResult<Json<BlogSettings>> {
    let settings = json_body(payload)?;
    settings.validate().map_err(ApiError::BadRequest)?;
    let mut conn = state.conn().await?;
    Ok(Json(singleton_service::save_settings(&mut conn, &settings).await?))
}

// ── Engagement logs and stats ──

async fn view_log(
    State(state): State<AppState>,
    Query(filter): Query<EngagementFilter>,
) -> ApiResult<Json<Vec<BlogViewLog>>> {
    let mut conn = state.conn().await?;
    Ok(Json(engagement_service::list_views(&mut conn, &filter).await?))
}

async fn like_log(
    State(state): State<AppState>,
    Query(filter): Query<EngagementFilter>,
) -> ApiResult<Json<Vec<BlogLike>>> {
    let mut conn = state.conn().await?;
    Ok(Json(engagement_service::list_likes(&mut conn, &filter).await?))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    top: Option<i64>,
    days: Option<i32>,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<DashboardStats>> {
    let mut conn = state.conn().await?;
    let stats = stats::query_dashboard(
        &mut conn,
        query.top.unwrap_or(10),
        query.days.unwrap_or(30),
    )
    .await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::*;
    use tower::ServiceExt;

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(truthy(v), "{v}");
        }
        for v in ["", "0", "false", "no", "off"] {
            assert!(!truthy(v), "{v}");
        }
    }

    #[test]
    fn slug_falls_back_to_title() {
        let mut slug = String::new();
        assert!(require_slug(&mut slug, "Graph Neural Nets").is_ok());
        assert_eq!(slug, "graph-neural-nets");

        let mut slug = String::new();
        let err = require_slug(&mut slug, "!!!").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn action_requests_parse() {
        let req: ActionRequest<BlogAction> =
            serde_json::from_str(r#"{"action": "mark_trending", "ids": [1, 2]}"#).unwrap();
        assert_eq!(req.action, BlogAction::MarkTrending);
        assert_eq!(req.ids, vec![1, 2]);

        let req: ActionRequest<CommentAction> =
            serde_json::from_str(r#"{"action": "approve"}"#).unwrap();
        assert_eq!(req.action, CommentAction::Approve);
        assert!(req.ids.is_empty());

        assert!(serde_json::from_str::<ActionRequest<BlogAction>>(r#"{"action": "delete"}"#).is_err());
    }

    #[tokio::test]
    async fn unknown_bulk_action_is_400() {
        let response = app()
            .oneshot(request(
                "POST",
                "/admin/api/blogs/actions",
                Some(TOKEN),
                Some(r#"{"action": "explode", "ids": [1]}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected() {
        let response = app()
            .oneshot(request(
                "PUT",
                "/admin/api/blog-settings",
                Some(TOKEN),
                Some(r#"{"duration_update_interval": 0, "inactivity_threshold": 120}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "duration_update_interval must be positive");
    }

    #[tokio::test]
    async fn comment_create_validates_first() {
        let response = app()
            .oneshot(request(
                "POST",
                "/admin/api/comments",
                Some(TOKEN),
                Some(r#"{"blog": 1, "author_name": "Ann", "author_email": "nope", "comment_text": "hi"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nLogo\r\n--{boundary}--\r\n"
        );
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/admin/api/media")
            .header("Authorization", format!("Bearer {TOKEN}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(axum::body::Body::from(body))
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "No file was submitted.");
    }
}

//! Admin backup download and restore upload.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::AppState;
use crate::backup::{self, ImportReport};
use crate::error::{ApiError, ApiResult};

/// Build a fresh export and return it as a zip attachment.
pub async fn export(State(state): State<AppState>) -> ApiResult<Response> {
    let mut conn = state.conn().await?;
    let zip_path = backup::export_portfolio_data(&mut conn, &state.config, None).await?;
    drop(conn);

    let bytes = tokio::fs::read(&zip_path)
        .await
        .map_err(|e| ApiError::Internal(format!("reading {}: {e}", zip_path.display())))?;
    let file_name = zip_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "portfolio_backup.zip".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Overwrite must be confirmed explicitly.
fn confirmed(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "yes" | "true")
}

struct ImportForm {
    archive: Vec<u8>,
    overwrite: bool,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ImportForm> {
    let mut archive = None;
    let mut overwrite = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "backup_file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if !bytes.is_empty() {
                    archive = Some(bytes.to_vec());
                }
            }
            "overwrite" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                overwrite = confirmed(&text);
            }
            _ => {}
        }
    }

    let archive =
        archive.ok_or_else(|| ApiError::BadRequest("Please select a backup file.".into()))?;
    if !overwrite {
        return Err(ApiError::BadRequest(
            "You must confirm overwrite by setting overwrite=yes.".into(),
        ));
    }
    Ok(ImportForm { archive, overwrite })
}

/// Restore from an uploaded archive. The report is returned as-is; a
/// failed import still answers 200 with `success: false`.
pub async fn import(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ImportReport>> {
    let form = read_form(multipart).await?;

    let upload = tempfile::Builder::new()
        .prefix("portfolio_upload_")
        .suffix(".zip")
        .tempfile()
        .map_err(|e| ApiError::Internal(format!("creating upload file: {e}")))?;
    tokio::fs::write(upload.path(), &form.archive)
        .await
        .map_err(|e| ApiError::Internal(format!("writing upload file: {e}")))?;

    let mut conn = state.conn().await?;
    let report =
        backup::import_portfolio_data(&mut conn, &state.config, upload.path(), form.overwrite)
            .await;
    if report.success {
        tracing::info!(imported = ?report.imported, "Backup restored from upload");
    } else {
        tracing::error!(errors = ?report.errors, "Backup restore from upload failed");
    }
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    const BOUNDARY: &str = "XBACKUP";

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> axum::http::Request<axum::body::Body> {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                     Content-Type: application/zip\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        axum::http::Request::builder()
            .method("POST")
            .uri("/admin/api/backup/import")
            .header("Authorization", format!("Bearer {TOKEN}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(axum::body::Body::from(body))
            .unwrap()
    }

    #[test]
    fn only_explicit_confirmation_counts() {
        assert!(confirmed("yes"));
        assert!(confirmed("True"));
        assert!(!confirmed("on"));
        assert!(!confirmed(""));
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let req = multipart_request(&[("overwrite", None, "yes")]);
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Please select a backup file.");
    }

    #[tokio::test]
    async fn overwrite_must_be_confirmed() {
        let req = multipart_request(&[("backup_file", Some("backup.zip"), "PK")]);
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("You must confirm overwrite"));
    }

    #[tokio::test]
    async fn import_requires_admin_token() {
        let mut req = multipart_request(&[("overwrite", None, "yes")]);
        req.headers_mut().remove("Authorization");
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

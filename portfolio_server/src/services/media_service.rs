//! Media library: upload storage, lookup and removal.
//!
//! Files live under `<media_root>/uploads/<yyyy>/<mm>/<uuid>.<ext>`; the
//! row keeps the path relative to the media root.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Datelike, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::config::PortfolioConfig;
use crate::models::media::{FileType, MediaFile, MediaUpdate, NewMediaFile};
use crate::schema::media_files;

/// A file received from the admin upload form.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub alt_text: String,
    pub slug: String,
    pub is_public: bool,
}

/// MIME type guessed from the file name.
pub fn detect_mime(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// `uploads/<yyyy>/<mm>/<uuid>.<ext>`
pub fn upload_path(uuid: Uuid, filename: &str, at: DateTime<Utc>) -> String {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    let name = match ext {
        Some(ext) => format!("{uuid}.{ext}"),
        None => uuid.to_string(),
    };
    format!("uploads/{:04}/{:02}/{name}", at.year(), at.month())
}

/// Join a stored relative path onto a root, refusing anything that could
/// leave the root.
pub fn resolve_under(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut out = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (out != root).then_some(out)
}

/// Slug seed: the title, else the file name without its extension.
pub fn base_slug(upload: &Upload) -> String {
    if !upload.slug.trim().is_empty() {
        return crate::format::slugify(&upload.slug);
    }
    let source = if upload.title.trim().is_empty() {
        Path::new(&upload.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        upload.title.clone()
    };
    crate::format::slugify(&source)
}

async fn slug_taken(conn: &mut AsyncPgConnection, slug: &str) -> anyhow::Result<bool> {
    let count: i64 = media_files::table
        .filter(media_files::slug.eq(slug))
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

/// Write the upload to disk and record it.
pub async fn store_upload(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    upload: Upload,
) -> anyhow::Result<MediaFile> {
    let uuid = Uuid::new_v4();
    let relative = upload_path(uuid, &upload.filename, Utc::now());
    let absolute = resolve_under(&config.media_root, &relative)
        .ok_or_else(|| anyhow::anyhow!("invalid upload path {relative}"))?;

    let mut slug = base_slug(&upload);
    if slug.is_empty() {
        slug = uuid.simple().to_string();
    } else if slug_taken(conn, &slug).await? {
        slug = format!("{slug}-{}", &uuid.simple().to_string()[..8]);
    }

    if let Some(parent) = absolute.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&absolute, &upload.bytes)
        .await
        .with_context(|| format!("writing {}", absolute.display()))?;

    let mime_type = detect_mime(&upload.filename);
    let file_type = FileType::from_mime(&mime_type);
    let new_media = NewMediaFile {
        uuid,
        slug,
        file_type: file_type.as_str().to_string(),
        original_filename: upload.filename,
        file_path: relative,
        file_size: upload.bytes.len() as i64,
        mime_type,
        title: upload.title,
        alt_text: upload.alt_text,
        is_public: upload.is_public,
    };

    let inserted = diesel::insert_into(media_files::table)
        .values(&new_media)
        .returning(MediaFile::as_returning())
        .get_result(conn)
        .await;

    match inserted {
        Ok(media) => {
            crate::metrics::media_uploaded(&media.file_type, media.file_size);
            tracing::info!(
                media_id = media.id,
                slug = %media.slug,
                file_type = %media.file_type,
                size = media.file_size,
                "Media uploaded"
            );
            Ok(media)
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&absolute).await {
                tracing::warn!(path = %absolute.display(), "Failed to remove orphaned upload: {rm}");
            }
            Err(e.into())
        }
    }
}

pub async fn list_public(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<MediaFile>> {
    let results = media_files::table
        .filter(media_files::is_public.eq(true))
        .order(media_files::uploaded_at.desc())
        .select(MediaFile::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<MediaFile>> {
    let results = media_files::table
        .order(media_files::uploaded_at.desc())
        .select(MediaFile::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find_public_by_uuid(
    conn: &mut AsyncPgConnection,
    uuid: Uuid,
) -> anyhow::Result<Option<MediaFile>> {
    let result = media_files::table
        .filter(media_files::uuid.eq(uuid))
        .filter(media_files::is_public.eq(true))
        .select(MediaFile::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn find_public_by_slug(
    conn: &mut AsyncPgConnection,
    slug: &str,
) -> anyhow::Result<Option<MediaFile>> {
    let result = media_files::table
        .filter(media_files::slug.eq(slug))
        .filter(media_files::is_public.eq(true))
        .select(MediaFile::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<MediaFile>> {
    let result = media_files::table
        .find(id)
        .select(MediaFile::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    changes: &MediaUpdate,
) -> anyhow::Result<Option<MediaFile>> {
    let result = diesel::update(media_files::table.find(id))
        .set((changes, media_files::updated_at.eq(Utc::now())))
        .returning(MediaFile::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Remove the row and its file. A file already gone is only a warning.
pub async fn delete(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    id: i64,
) -> anyhow::Result<bool> {
    let removed: Option<MediaFile> = diesel::delete(media_files::table.find(id))
        .returning(MediaFile::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    let Some(media) = removed else {
        return Ok(false);
    };

    match resolve_under(&config.media_root, &media.file_path) {
        Some(path) => {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), "Media file not removed: {e}");
            }
        }
        None => tracing::warn!(file_path = %media.file_path, "Media row had an unsafe path"),
    }
    tracing::info!(media_id = media.id, slug = %media.slug, "Media deleted");
    Ok(true)
}

/// Open `relative` under `root` for streaming, with its length. `None`
/// when the path escapes the root or the file is missing.
pub async fn open_under(
    root: &Path,
    relative: &str,
) -> anyhow::Result<Option<(tokio::fs::File, u64)>> {
    let Some(path) = resolve_under(root, relative) else {
        return Ok(None);
    };
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Media file missing on disk");
            return Ok(None);
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("opening {}", path.display()))),
    };
    let len = file
        .metadata()
        .await
        .with_context(|| format!("reading metadata of {}", path.display()))?
        .len();
    Ok(Some((file, len)))
}

pub async fn open_file(
    config: &PortfolioConfig,
    media: &MediaFile,
) -> anyhow::Result<Option<(tokio::fs::File, u64)>> {
    open_under(&config.media_root, &media.file_path).await
}

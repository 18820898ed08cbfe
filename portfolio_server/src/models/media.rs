//! Uploaded media files served through the CDN route.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::media_files;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = media_files)]
pub struct MediaFile {
    pub id: i64,
    pub uuid: Uuid,
    pub slug: String,
    pub file_type: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub title: String,
    pub alt_text: String,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = media_files)]
pub struct NewMediaFile {
    pub uuid: Uuid,
    pub slug: String,
    pub file_type: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub title: String,
    pub alt_text: String,
    pub is_public: bool,
}

/// Metadata edit from the admin API; the stored file never changes.
#[derive(Debug, Clone, AsChangeset, Deserialize)]
#[diesel(table_name = media_files)]
pub struct MediaUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub is_public: Option<bool>,
}

/// Broad category used for filtering in the media library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl FileType {
    pub fn from_mime(mime: &str) -> Self {
        let (top, sub) = mime.split_once('/').unwrap_or((mime, ""));
        match top {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Document,
            "application" if is_document_subtype(sub) => Self::Document,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

fn is_document_subtype(sub: &str) -> bool {
    sub == "pdf"
        || sub == "msword"
        || sub == "rtf"
        || sub.starts_with("vnd.openxmlformats-officedocument")
        || sub.starts_with("vnd.oasis.opendocument")
        || sub.starts_with("vnd.ms-")
}

/// Detail shape with resolved URLs.
#[derive(Debug, Serialize)]
pub struct MediaDetail {
    pub id: i64,
    pub uuid: Uuid,
    pub slug: String,
    pub file_type: String,
    pub original_filename: String,
    pub file_size: i64,
    pub file_size_display: String,
    pub file_extension: String,
    pub mime_type: String,
    pub title: String,
    pub alt_text: String,
    pub file_url: String,
    pub api_url: String,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing shape.
#[derive(Debug, Serialize)]
pub struct MediaListItem {
    pub id: i64,
    pub uuid: Uuid,
    pub slug: String,
    pub file_type: String,
    pub original_filename: String,
    pub file_size_display: String,
    pub file_extension: String,
    pub title: String,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl MediaFile {
    pub fn file_url(&self, public_url: &str) -> String {
        format!("{}/api/cdn/{}", public_url.trim_end_matches('/'), self.slug)
    }

    pub fn api_url(&self, public_url: &str) -> String {
        format!("{}/api/media/{}/", public_url.trim_end_matches('/'), self.uuid)
    }

    pub fn file_extension(&self) -> String {
        std::path::Path::new(&self.original_filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    pub fn to_detail(&self, public_url: &str) -> MediaDetail {
        MediaDetail {
            id: self.id,
            uuid: self.uuid,
            slug: self.slug.clone(),
            file_type: self.file_type.clone(),
            original_filename: self.original_filename.clone(),
            file_size: self.file_size,
            file_size_display: crate::format::display_file_size(self.file_size),
            file_extension: self.file_extension(),
            mime_type: self.mime_type.clone(),
            title: self.title.clone(),
            alt_text: self.alt_text.clone(),
            file_url: self.file_url(public_url),
            api_url: self.api_url(public_url),
            is_public: self.is_public,
            uploaded_at: self.uploaded_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_list_item(&self, public_url: &str) -> MediaListItem {
        MediaListItem {
            id: self.id,
            uuid: self.uuid,
            slug: self.slug.clone(),
            file_type: self.file_type.clone(),
            original_filename: self.original_filename.clone(),
            file_size_display: crate::format::display_file_size(self.file_size),
            file_extension: self.file_extension(),
            title: self.title.clone(),
            file_url: self.file_url(public_url),
            uploaded_at: self.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MediaFile {
        let now = Utc::now();
        MediaFile {
            id: 7,
            uuid: Uuid::nil(),
            slug: "profile-photo".into(),
            file_type: "image".into(),
            original_filename: "Profile.JPG".into(),
            file_path: "uploads/2026/10/x.jpg".into(),
            file_size: 2048,
            mime_type: "image/jpeg".into(),
            title: "Profile".into(),
            alt_text: String::new(),
            is_public: true,
            uploaded_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn urls_are_built_from_public_base() {
        let media = sample();
        assert_eq!(
            media.file_url("http://localhost:8000/"),
            "http://localhost:8000/api/cdn/profile-photo"
        );
        assert_eq!(
            media.api_url("https://site.example"),
            "https://site.example/api/media/00000000-0000-0000-0000-000000000000/"
        );
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(sample().file_extension(), "jpg");
        let detail = sample().to_detail("http://x");
        assert_eq!(detail.file_size_display, "2.0 KB");
    }

    #[test]
    fn file_type_classification() {
        assert_eq!(FileType::from_mime("image/png"), FileType::Image);
        assert_eq!(FileType::from_mime("video/mp4"), FileType::Video);
        assert_eq!(FileType::from_mime("audio/mpeg"), FileType::Audio);
        assert_eq!(FileType::from_mime("application/pdf"), FileType::Document);
        assert_eq!(
            FileType::from_mime(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            FileType::Document
        );
        assert_eq!(FileType::from_mime("text/markdown"), FileType::Document);
        assert_eq!(FileType::from_mime("application/zip"), FileType::Other);
    }
}

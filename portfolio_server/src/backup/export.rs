//! Full export: fixtures, markdown copies, media mirror, manifest and
//! README, packed into one zip archive.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use super::archive;
use super::fixture::rows_to_fixture;
use super::frontmatter;
use super::tables::{TableSpec, EXPORT_ORDER};
use crate::config::PortfolioConfig;
use crate::models::blog::Blog;
use crate::schema::blogs;

#[derive(QueryableByName)]
struct Payload {
    #[diesel(sql_type = Text)]
    payload: String,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Written as `manifest.json`.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub export_date: String,
    pub app_version: String,
    pub models_exported: Vec<String>,
    pub totals: BTreeMap<String, i64>,
    /// `media_files/` relative path to SHA-256 hex.
    pub media_checksums: BTreeMap<String, String>,
}

/// All rows of a table as JSON objects, ordered by id.
async fn dump_table(
    conn: &mut AsyncPgConnection,
    entry: &TableSpec,
) -> anyhow::Result<Vec<serde_json::Value>> {
    let row: Payload = diesel::sql_query(format!(
        "SELECT COALESCE(json_agg(t ORDER BY t.id), '[]'::json)::text AS payload FROM {} t",
        entry.table
    ))
    .get_result(conn)
    .await?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&row.payload)?;
    Ok(rows)
}

async fn count_rows(conn: &mut AsyncPgConnection, table: &str) -> anyhow::Result<i64> {
    let row: RowCount = diesel::sql_query(format!("SELECT COUNT(*) AS count FROM {table}"))
        .get_result(conn)
        .await?;
    Ok(row.count)
}

fn staging_name() -> String {
    format!("portfolio_backup_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

/// Create a fresh, empty staging directory under `parent`. An existing
/// directory of the same name is an error, never reused, since staging is
/// removed after zipping.
async fn prepare_staging(parent: &Path) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("Failed to create export directory {}", parent.display()))?;
    let parent = tokio::fs::canonicalize(parent)
        .await
        .with_context(|| format!("Failed to resolve export directory {}", parent.display()))?;
    let staging = parent.join(staging_name());
    tokio::fs::create_dir(&staging)
        .await
        .with_context(|| format!("Failed to create staging directory {}", staging.display()))?;
    Ok(staging)
}

fn readme(totals: &BTreeMap<String, i64>) -> String {
    let count = |name: &str| totals.get(name).copied().unwrap_or(0);
    format!(
        "# Portfolio Data Backup\n\
         Created: {created}\n\
         \n\
         ## Contents:\n\
         - json_data/: All database tables exported as JSON fixtures\n\
         - blogs_markdown/: Blog posts in Markdown format\n\
         - media_files/: All uploaded media files (images, documents, etc.)\n\
         - manifest.json: Backup metadata and media checksums\n\
         \n\
         ## To Restore:\n\
         1. Upload this zip file to POST /admin/api/backup/import with overwrite=yes,\n\
         \x20  or run `portfolio import <this zip> --overwrite`\n\
         2. All data will be restored to the database\n\
         \n\
         ## Models Included:\n\
         - Education Entries: {education}\n\
         - Experience Entries: {experience}\n\
         - Projects: {projects}\n\
         - Research Publications: {research}\n\
         - Blog Posts: {blogs}\n\
         - Blog Comments: {comments}\n\
         - Media Files: {media}\n\
         - Home Page Data: {home}\n\
         \n\
         WARNING: Importing will overwrite existing data!\n",
        created = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        education = count("education"),
        experience = count("experience"),
        projects = count("projects"),
        research = count("research"),
        blogs = count("blogs"),
        comments = count("blog_comments"),
        media = count("media_files"),
        home = count("home_data"),
    )
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

/// Export everything into `<dir>/portfolio_backup_<timestamp>.zip` and
/// return the archive path. `dir` defaults to the configured export
/// directory; nothing already in it is touched.
pub async fn export_portfolio_data(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    dir: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let started = Instant::now();
    let result = run_export(conn, config, dir).await;
    let elapsed = started.elapsed().as_millis() as u64;
    crate::metrics::backup_finished("export", result.is_ok(), elapsed);
    match &result {
        Ok(path) => tracing::info!(archive = %path.display(), elapsed_ms = elapsed, "Export completed"),
        Err(e) => tracing::error!(error = %format!("{e:#}"), "Export failed"),
    }
    result
}

async fn run_export(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    dir: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let parent = dir.unwrap_or_else(|| config.export_dir.clone());
    let export_dir = prepare_staging(&parent).await?;

    // 1. Fixtures
    let json_dir = export_dir.join("json_data");
    tokio::fs::create_dir_all(&json_dir)
        .await
        .context("Failed to export JSON data")?;
    let mut totals = BTreeMap::new();
    for entry in EXPORT_ORDER {
        let rows = dump_table(conn, entry)
            .await
            .with_context(|| format!("Failed to export {}", entry.name))?;
        totals.insert(entry.name.to_string(), rows.len() as i64);
        let fixture = rows_to_fixture(entry, rows)
            .with_context(|| format!("Failed to export {}", entry.name))?;
        write_json(&json_dir.join(entry.file_name()), &fixture)
            .await
            .with_context(|| format!("Failed to export {}", entry.name))?;
    }
    totals.insert(
        "blog_views".to_string(),
        count_rows(conn, "blog_views").await?,
    );
    totals.insert(
        "blog_likes".to_string(),
        count_rows(conn, "blog_likes").await?,
    );

    // 2. Markdown copies
    let markdown_dir = export_dir.join("blogs_markdown");
    tokio::fs::create_dir_all(&markdown_dir)
        .await
        .context("Failed to export blog markdown")?;
    let posts: Vec<Blog> = blogs::table
        .order(blogs::id.asc())
        .select(Blog::as_select())
        .load(conn)
        .await
        .context("Failed to export blog markdown")?;
    for post in &posts {
        let path = markdown_dir.join(frontmatter::file_name(post));
        tokio::fs::write(&path, frontmatter::render(post))
            .await
            .with_context(|| format!("Failed to export blog markdown {}", path.display()))?;
    }

    // 3. Media mirror and checksums
    let media_root = config.media_root.clone();
    let media_dir = export_dir.join("media_files");
    let media_checksums = tokio::task::spawn_blocking(move || -> anyhow::Result<BTreeMap<String, String>> {
        std::fs::create_dir_all(&media_dir)?;
        archive::copy_tree(&media_root, &media_dir, &[])?;
        archive::checksum_tree(&media_dir)
    })
    .await?
    .context("Failed to export media files")?;

    // 4. Manifest and README
    let manifest = Manifest {
        export_date: Utc::now().to_rfc3339(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        models_exported: EXPORT_ORDER.iter().map(|s| s.name.to_string()).collect(),
        totals,
        media_checksums,
    };
    write_json(&export_dir.join("manifest.json"), &manifest)
        .await
        .context("Failed to write manifest")?;
    tokio::fs::write(export_dir.join("README.txt"), readme(&manifest.totals))
        .await
        .context("Failed to write README")?;

    // 5. Archive and clean up
    let zip_path = zip_path_for(&export_dir)?;
    let staging = export_dir.clone();
    let target = zip_path.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        archive::zip_dir(&staging, &target)?;
        std::fs::remove_dir_all(&staging)?;
        Ok(())
    })
    .await?
    .context("Failed to create zip archive")?;

    Ok(zip_path)
}

/// `<parent>/<dir name>.zip`
fn zip_path_for(export_dir: &Path) -> anyhow::Result<PathBuf> {
    let name = export_dir
        .file_name()
        .with_context(|| format!("export directory {} has no name", export_dir.display()))?;
    let mut file_name = name.to_os_string();
    file_name.push(".zip");
    Ok(export_dir.with_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_sits_next_to_staging_dir() {
        let path = zip_path_for(Path::new("/tmp/exports/portfolio_backup_20260101_000000")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/tmp/exports/portfolio_backup_20260101_000000.zip")
        );
    }

    #[tokio::test]
    async fn staging_is_a_fresh_timestamped_subdirectory() {
        let parent = tempfile::tempdir().unwrap();
        let keep = parent.path().join("thesis.docx");
        std::fs::write(&keep, b"draft").unwrap();

        let staging = prepare_staging(parent.path()).await.unwrap();
        assert!(staging.is_absolute());
        assert_eq!(
            staging.parent().unwrap(),
            std::fs::canonicalize(parent.path()).unwrap()
        );
        let name = staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("portfolio_backup_"));
        assert_eq!(name.len(), "portfolio_backup_".len() + "YYYYmmdd_HHMMSS".len());
        assert!(std::fs::read_dir(&staging).unwrap().next().is_none());
        assert!(keep.exists());
    }

    #[tokio::test]
    async fn existing_staging_dir_is_never_reused() {
        let parent = tempfile::tempdir().unwrap();
        let taken = parent.path().join(staging_name());
        std::fs::create_dir(&taken).unwrap();
        std::fs::write(taken.join("notes.txt"), b"mine").unwrap();

        // Same second, same name: refused rather than staged into.
        if let Err(e) = prepare_staging(parent.path()).await {
            assert!(format!("{e:#}").contains("Failed to create staging directory"));
        }
        assert!(taken.join("notes.txt").exists());
    }

    #[tokio::test]
    async fn relative_output_is_resolved() {
        let staging = prepare_staging(Path::new(".")).await.unwrap();
        assert!(staging.is_absolute());
        assert!(zip_path_for(&staging).is_ok());
        std::fs::remove_dir(&staging).unwrap();
    }

    #[test]
    fn readme_lists_counts() {
        let mut totals = BTreeMap::new();
        totals.insert("blogs".to_string(), 7);
        totals.insert("media_files".to_string(), 2);
        let text = readme(&totals);
        assert!(text.contains("- Blog Posts: 7\n"));
        assert!(text.contains("- Media Files: 2\n"));
        assert!(text.contains("- Projects: 0\n"));
        assert!(text.contains("WARNING"));
    }

    #[test]
    fn manifest_serializes_checksums() {
        let mut media_checksums = BTreeMap::new();
        media_checksums.insert("uploads/a.png".to_string(), "ab".repeat(32));
        let manifest = Manifest {
            export_date: "2026-01-01T00:00:00+00:00".into(),
            app_version: "0.1.0".into(),
            models_exported: vec!["blogs".into()],
            totals: BTreeMap::new(),
            media_checksums,
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["media_checksums"]["uploads/a.png"].as_str().unwrap().len(), 64);
        assert_eq!(json["models_exported"][0], "blogs");
    }
}

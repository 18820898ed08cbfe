//! Restore from an export archive.
//!
//! Archive-level problems (unreadable zip, failed wipe, failed media copy)
//! mark the report unsuccessful. A bad fixture file only records an error
//! and a zero count; the rest of the import carries on.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use serde_json::Value;

use super::archive;
use super::fixture::fixture_to_rows;
use super::tables::{TableSpec, DELETE_ORDER, IMPORT_ORDER};
use crate::config::PortfolioConfig;

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub success: bool,
    /// `<Model>_deleted`, `<name>.json` and `media_files_copied` counts.
    pub imported: BTreeMap<String, i64>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Value>,
}

impl ImportReport {
    fn fail(&mut self, err: anyhow::Error) {
        self.success = false;
        self.errors.push(format!("Import failed: {err:#}"));
    }
}

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// Columns a fixture row carries, in table order. Columns it leaves out
/// take their database defaults on insert and keep their value on update.
pub fn row_columns(entry: &TableSpec, row: &Value) -> Vec<&'static str> {
    entry
        .columns
        .iter()
        .copied()
        .filter(|c| row.get(*c).is_some())
        .collect()
}

/// Upsert-by-id statement over `id` plus `columns`, fed a JSON array in `$1`.
pub fn upsert_sql(table: &str, columns: &[&str]) -> String {
    let mut all = vec![quote("id")];
    all.extend(columns.iter().map(|c| quote(c)));
    let column_list = all.join(", ");
    let on_conflict = if columns.is_empty() {
        "DO NOTHING".to_string()
    } else {
        let updates = columns
            .iter()
            .map(|c| format!("{col} = EXCLUDED.{col}", col = quote(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("DO UPDATE SET {updates}")
    };
    format!(
        "INSERT INTO {table} ({column_list}) \
         SELECT {column_list} FROM json_populate_recordset(NULL::{table}, $1::json) \
         ON CONFLICT (id) {on_conflict}"
    )
}

/// Move the id sequence past the highest imported id.
fn sequence_sql(table: &str) -> String {
    format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)"
    )
}

async fn wipe(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<(String, i64)>> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        async move {
            let mut counts = Vec::with_capacity(DELETE_ORDER.len());
            for (model, table) in DELETE_ORDER {
                let deleted = diesel::sql_query(format!("DELETE FROM {table}"))
                    .execute(conn)
                    .await
                    .with_context(|| format!("clearing {table}"))?;
                counts.push((format!("{model}_deleted"), deleted as i64));
            }
            Ok(counts)
        }
        .scope_boxed()
    })
    .await
}

async fn import_file(
    conn: &mut AsyncPgConnection,
    entry: &TableSpec,
    path: &Path,
) -> anyhow::Result<i64> {
    let raw = tokio::fs::read_to_string(path).await?;
    let fixture: Value = serde_json::from_str(&raw)?;
    let rows = fixture_to_rows(entry, &fixture)?;
    if rows.is_empty() {
        return Ok(0);
    }

    // One statement per distinct column set; rows from hand-edited or
    // older archives may leave fields out.
    let mut batches: BTreeMap<Vec<&'static str>, Vec<Value>> = BTreeMap::new();
    for row in rows {
        batches.entry(row_columns(entry, &row)).or_default().push(row);
    }

    let table = entry.table;
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        async move {
            let mut written = 0;
            for (columns, rows) in batches {
                let payload = serde_json::to_string(&rows)?;
                written += diesel::sql_query(upsert_sql(table, &columns))
                    .bind::<Text, _>(payload)
                    .execute(conn)
                    .await?;
            }
            diesel::sql_query(sequence_sql(table)).execute(conn).await?;
            Ok(written as i64)
        }
        .scope_boxed()
    })
    .await
}

/// Media files whose bytes do not match the manifest checksum.
pub fn checksum_mismatches(
    manifest: Option<&Value>,
    actual: &BTreeMap<String, String>,
) -> Vec<String> {
    let Some(expected) = manifest
        .and_then(|m| m.get("media_checksums"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };
    expected
        .iter()
        .filter(|(name, sum)| actual.get(name.as_str()).map(String::as_str) != sum.as_str())
        .map(|(name, _)| name.clone())
        .collect()
}

/// Restore the archive at `zip_path`. With `overwrite`, existing content
/// is cleared first in one transaction.
pub async fn import_portfolio_data(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    zip_path: &Path,
    overwrite: bool,
) -> ImportReport {
    let started = Instant::now();
    let mut report = ImportReport {
        success: true,
        ..ImportReport::default()
    };

    if let Err(e) = run_import(conn, config, zip_path, overwrite, &mut report).await {
        report.fail(e);
    }

    let elapsed = started.elapsed().as_millis() as u64;
    crate::metrics::backup_finished("import", report.success, elapsed);
    tracing::info!(
        archive = %zip_path.display(),
        overwrite,
        success = report.success,
        errors = report.errors.len(),
        elapsed_ms = elapsed,
        "Import finished"
    );
    report
}

async fn run_import(
    conn: &mut AsyncPgConnection,
    config: &PortfolioConfig,
    zip_path: &Path,
    overwrite: bool,
    report: &mut ImportReport,
) -> anyhow::Result<()> {
    // Removed on drop, including every early return below.
    let workdir = tempfile::Builder::new()
        .prefix("portfolio_import_")
        .tempdir()
        .context("creating temporary directory")?;
    let import_dir: PathBuf = workdir.path().to_path_buf();

    let archive_path = zip_path.to_path_buf();
    let target = import_dir.clone();
    tokio::task::spawn_blocking(move || archive::extract(&archive_path, &target))
        .await?
        .context("extracting archive")?;

    let manifest_path = import_dir.join("manifest.json");
    if tokio::fs::try_exists(&manifest_path).await.unwrap_or(false) {
        let raw = tokio::fs::read_to_string(&manifest_path).await?;
        report.manifest =
            Some(serde_json::from_str(&raw).context("manifest.json is not valid JSON")?);
    }

    if overwrite {
        for (key, count) in wipe(conn).await.context("clearing existing data")? {
            report.imported.insert(key, count);
        }
    }

    let json_dir = import_dir.join("json_data");
    for entry in IMPORT_ORDER {
        let path = json_dir.join(entry.file_name());
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        match import_file(conn, entry, &path).await {
            Ok(count) => {
                report.imported.insert(entry.file_name(), count);
            }
            Err(e) => {
                tracing::warn!(file = %entry.file_name(), error = %format!("{e:#}"), "Fixture import failed");
                report
                    .errors
                    .push(format!("Error importing {}: {e:#}", entry.file_name()));
                report.imported.insert(entry.file_name(), 0);
            }
        }
    }

    let media_src = import_dir.join("media_files");
    if tokio::fs::try_exists(&media_src).await.unwrap_or(false) {
        let manifest = report.manifest.clone();
        let media_root = config.media_root.clone();
        let (copied, mismatched) = tokio::task::spawn_blocking(
            move || -> anyhow::Result<(usize, Vec<String>)> {
                let actual = archive::checksum_tree(&media_src)?;
                let mismatched = checksum_mismatches(manifest.as_ref(), &actual);
                std::fs::create_dir_all(&media_root)?;
                let copied = archive::copy_tree(&media_src, &media_root, &mismatched)?;
                Ok((copied.len(), mismatched))
            },
        )
        .await?
        .context("restoring media files")?;

        for name in mismatched {
            report
                .errors
                .push(format!("Checksum mismatch for media file {name}; not restored"));
        }
        report
            .imported
            .insert("media_files_copied".to_string(), copied as i64);
    }

    drop(workdir);
    Ok(())
}

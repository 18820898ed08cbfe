//! Blocking filesystem helpers for backups: zip packing, safe extraction,
//! directory mirroring and SHA-256 checksums.
//!
//! Callers in async code run these through `spawn_blocking`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Relative path with `/` separators, as stored in archives and manifests.
fn relative_name(root: &Path, path: &Path) -> anyhow::Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Files under `root` in a stable order.
fn files_under(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Deflate every file under `src` into a new archive at `dest`.
pub fn zip_dir(src: &Path, dest: &Path) -> anyhow::Result<usize> {
    let file = File::create(dest).with_context(|| format!("creating {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let files = files_under(src)?;
    for path in &files {
        let name = relative_name(src, path)?;
        zip.start_file(name.as_str(), options)?;
        let mut input = BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        );
        io::copy(&mut input, &mut zip).with_context(|| format!("compressing {name}"))?;
    }
    zip.finish()?;
    Ok(files.len())
}

/// Unpack `archive` into `dest`. Entries whose names would land outside
/// `dest` abort the extraction.
pub fn extract(archive: &Path, dest: &Path) -> anyhow::Result<usize> {
    let file = File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut zip = ZipArchive::new(file).context("not a valid zip archive")?;

    let mut extracted = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            bail!("archive entry {:?} escapes the extraction directory", entry.name());
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)
            .with_context(|| format!("creating {}", target.display()))?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }
    Ok(extracted)
}

/// Copy every file under `src` to the same relative path under `dest`,
/// skipping names in `skip`. Returns the relative names copied.
pub fn copy_tree(src: &Path, dest: &Path, skip: &[String]) -> anyhow::Result<Vec<String>> {
    let mut copied = Vec::new();
    if !src.is_dir() {
        return Ok(copied);
    }
    for path in files_under(src)? {
        let name = relative_name(src, &path)?;
        if skip.contains(&name) {
            continue;
        }
        let target = dest.join(&name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::copy(&path, &target)
            .with_context(|| format!("copying {} to {}", path.display(), target.display()))?;
        copied.push(name);
    }
    Ok(copied)
}

pub fn sha256_file(path: &Path) -> anyhow::Result<String> {
    let mut reader =
        BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Relative name to SHA-256 hex for every file under `root`.
pub fn checksum_tree(root: &Path) -> anyhow::Result<BTreeMap<String, String>> {
    let mut sums = BTreeMap::new();
    if !root.is_dir() {
        return Ok(sums);
    }
    for path in files_under(root)? {
        sums.insert(relative_name(root, &path)?, sha256_file(&path)?);
    }
    Ok(sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn zip_and_extract_preserve_layout() {
        let src = tempfile::tempdir().unwrap();
        write(src.path(), "manifest.json", "{}");
        write(src.path(), "json_data/blogs.json", "[]");
        write(src.path(), "media_files/uploads/2026/01/a.png", "png");

        let out = tempfile::tempdir().unwrap();
        let archive = out.path().join("backup.zip");
        assert_eq!(zip_dir(src.path(), &archive).unwrap(), 3);

        let dest = tempfile::tempdir().unwrap();
        assert_eq!(extract(&archive, dest.path()).unwrap(), 3);
        assert_eq!(
            fs::read_to_string(dest.path().join("media_files/uploads/2026/01/a.png")).unwrap(),
            "png"
        );
        assert_eq!(
            fs::read_to_string(dest.path().join("json_data/blogs.json")).unwrap(),
            "[]"
        );
    }

    #[test]
    fn extraction_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        {
            let mut zip = ZipWriter::new(File::create(&archive).unwrap());
            zip.start_file("../escaped.txt", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"nope").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        let err = extract(&archive, &dest).unwrap_err();
        assert!(err.to_string().contains("escapes"));
        assert!(!dir.path().join("escaped.txt").exists());
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not.zip");
        fs::write(&path, "plain text").unwrap();
        assert!(extract(&path, dir.path()).is_err());
    }

    #[test]
    fn copy_tree_mirrors_and_skips() {
        let src = tempfile::tempdir().unwrap();
        write(src.path(), "a/one.txt", "1");
        write(src.path(), "b/two.txt", "2");
        let dest = tempfile::tempdir().unwrap();

        let copied = copy_tree(src.path(), dest.path(), &["b/two.txt".to_string()]).unwrap();
        assert_eq!(copied, vec!["a/one.txt".to_string()]);
        assert!(dest.path().join("a/one.txt").exists());
        assert!(!dest.path().join("b/two.txt").exists());
    }

    #[test]
    fn copy_tree_of_missing_dir_is_empty() {
        let dest = tempfile::tempdir().unwrap();
        let copied = copy_tree(&dest.path().join("absent"), dest.path(), &[]).unwrap();
        assert!(copied.is_empty());
    }

    #[test]
    fn checksums_are_sha256_hex() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "x/hello.txt", "hello");
        let sums = checksum_tree(root.path()).unwrap();
        assert_eq!(
            sums.get("x/hello.txt").map(String::as_str),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
    }
}

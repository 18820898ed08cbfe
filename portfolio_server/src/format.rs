//! Text helpers: slugs, human-readable durations and sizes, email checks.

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .unwrap()
});

/// Maximum slug length accepted by the slug columns.
pub const MAX_SLUG_LEN: usize = 200;

/// Lowercase, ASCII-only, hyphen-separated slug.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = NON_SLUG_REGEX.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.len() > MAX_SLUG_LEN {
        slug[..MAX_SLUG_LEN].trim_end_matches('-').to_string()
    } else {
        slug.to_string()
    }
}

/// Derive an empty slug from the title. Returns false if the slug is
/// still empty afterwards.
pub fn fill_slug(slug: &mut String, title: &str) -> bool {
    if slug.trim().is_empty() {
        *slug = slugify(title);
    }
    !slug.is_empty()
}

/// `"1h 2m 3s"`, omitting zero units; `"0s"` for nothing.
pub fn display_duration(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

/// Bytes below 1 KB verbatim, otherwise one decimal in KB/MB/GB.
pub fn display_file_size(bytes: i64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// First `max` characters with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

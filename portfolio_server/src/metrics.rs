//! Prometheus metrics for engagement and backup observability.

use metrics::{counter, histogram};

/// Install the Prometheus exporter.
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a view request; `new` is false for a device already counted.
pub fn view_recorded(new: bool) {
    let outcome = if new { "new" } else { "duplicate" };
    counter!("portfolio_blog_views_total", "outcome" => outcome).increment(1);
}

/// Record a like toggle by resulting action.
pub fn like_toggled(action: &str, changed: bool) {
    counter!(
        "portfolio_blog_like_toggles_total",
        "action" => action.to_string(),
        "changed" => changed.to_string()
    )
    .increment(1);
}

/// Record reading time reported by the tracker.
pub fn reading_time(seconds: i32) {
    histogram!("portfolio_reading_time_seconds").record(f64::from(seconds));
}

pub fn comment_created() {
    counter!("portfolio_comments_total").increment(1);
}

pub fn newsletter_subscribed(reactivated: bool) {
    let kind = if reactivated { "reactivated" } else { "new" };
    counter!("portfolio_newsletter_subscriptions_total", "kind" => kind).increment(1);
}

pub fn media_uploaded(file_type: &str, bytes: i64) {
    counter!("portfolio_media_uploads_total", "file_type" => file_type.to_string()).increment(1);
    histogram!("portfolio_media_upload_bytes").record(bytes as f64);
}

/// Record a backup run: `kind` is `export` or `import`.
pub fn backup_finished(kind: &'static str, success: bool, duration_ms: u64) {
    let status = if success { "success" } else { "failure" };
    counter!("portfolio_backups_total", "kind" => kind, "status" => status).increment(1);
    histogram!("portfolio_backup_duration_ms", "kind" => kind).record(duration_ms as f64);
}

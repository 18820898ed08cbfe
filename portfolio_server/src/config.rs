//! Service configuration, loaded from environment variables.

use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Backup archives carry every media file, so they get a larger limit.
const BACKUP_UPLOAD_FACTOR: usize = 10;

#[derive(Clone, Debug)]
pub struct PortfolioConfig {
    /// Bearer token for the admin API. Empty disables admin access.
    pub admin_token: String,
    /// Root directory of uploaded media.
    pub media_root: PathBuf,
    /// Directory where export archives are staged.
    pub export_dir: PathBuf,
    /// Public base URL used for CDN and media links.
    pub public_url: String,
    pub max_upload_bytes: usize,
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
    pub db_max_connections: usize,
    pub request_timeout_secs: u64,
}

impl PortfolioConfig {
    pub fn from_env() -> Self {
        let admin_token = std::env::var("PORTFOLIO_ADMIN_TOKEN").unwrap_or_default();
        let media_root = std::env::var("PORTFOLIO_MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./media"));
        let export_dir = std::env::var("PORTFOLIO_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./exports"));
        let public_url = std::env::var("PORTFOLIO_PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let max_upload_bytes = std::env::var("PORTFOLIO_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        let cors_origins = std::env::var("PORTFOLIO_CORS_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();
        let db_max_connections = std::env::var("PORTFOLIO_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let request_timeout_secs = std::env::var("PORTFOLIO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        if admin_token.is_empty() {
            tracing::warn!("PORTFOLIO_ADMIN_TOKEN not set -- admin API disabled");
        }

        Self {
            admin_token,
            media_root,
            export_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
            max_upload_bytes,
            cors_origins,
            db_max_connections,
            request_timeout_secs,
        }
    }

    /// Body limit for backup archive uploads.
    pub fn max_backup_bytes(&self) -> usize {
        self.max_upload_bytes.saturating_mul(BACKUP_UPLOAD_FACTOR)
    }
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            media_root: PathBuf::from("./media"),
            export_dir: PathBuf::from("./exports"),
            public_url: "http://localhost:8000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: Vec::new(),
            db_max_connections: 10,
            request_timeout_secs: 30,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" https://a.example/ , ,http://localhost:3000"),
            vec!["https://a.example", "http://localhost:3000"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn backup_limit_is_ten_times_media_limit() {
        let config = PortfolioConfig::default();
        assert_eq!(config.max_backup_bytes(), 100 * 1024 * 1024);
    }
}

//! Per-device engagement records.
//!
//! One view and one like row per (blog, fingerprint); the unique
//! constraints in the migration enforce it.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{blog_likes, blog_views};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blog_views)]
pub struct BlogView {
    pub id: i64,
    pub blog_id: i64,
    pub fingerprint: String,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub viewed_at: DateTime<Utc>,
    pub viewed_date: NaiveDate,
    pub last_seen: DateTime<Utc>,
    pub duration_seconds: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blog_views)]
pub struct NewBlogView {
    pub blog_id: i64,
    pub fingerprint: String,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blog_likes)]
pub struct BlogLike {
    pub id: i64,
    pub blog_id: i64,
    pub fingerprint: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub is_active: bool,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blog_likes)]
pub struct NewBlogLike {
    pub blog_id: i64,
    pub fingerprint: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub is_active: bool,
}

/// Admin log row: a view with its human-readable reading time.
#[derive(Debug, Serialize)]
pub struct BlogViewLog {
    #[serde(flatten)]
    pub view: BlogView,
    pub duration_display: String,
}

impl From<BlogView> for BlogViewLog {
    fn from(view: BlogView) -> Self {
        let duration_display = crate::format::display_duration(i64::from(view.duration_seconds));
        Self {
            view,
            duration_display,
        }
    }
}

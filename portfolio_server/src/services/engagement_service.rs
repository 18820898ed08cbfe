//! Per-device view and like tracking.
//!
//! A device is identified by a client-side fingerprint. The unique
//! constraints on `(blog_id, fingerprint)` make the insert the arbiter:
//! only the request whose insert lands moves the counter.

use diesel::prelude::*;
use diesel::dsl::sql;
use diesel::sql_types::Integer;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;

use crate::models::engagement::{BlogLike, BlogView, BlogViewLog, NewBlogLike, NewBlogView};
use crate::schema::{blog_likes, blog_views, blogs};

/// Upper bound for a single reading-time report (one day).
pub const MAX_DURATION_SECONDS: i32 = 86_400;

/// Width of the `fingerprint` and `session_id` columns.
pub const MAX_FINGERPRINT_CHARS: usize = 255;
const MAX_SESSION_CHARS: usize = 255;

/// Who is engaging: fingerprint plus request metadata.
#[derive(Debug, Clone)]
pub struct Device {
    pub fingerprint: String,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl Device {
    /// The session id is cut to fit its column; the fingerprint must
    /// already have passed [`validate_fingerprint`].
    pub fn new(
        fingerprint: String,
        session_id: &str,
        ip_address: Option<String>,
        user_agent: String,
    ) -> Self {
        Self {
            fingerprint,
            session_id: session_id.chars().take(MAX_SESSION_CHARS).collect(),
            ip_address,
            user_agent,
        }
    }
}

pub fn validate_fingerprint(fingerprint: &str) -> Result<(), String> {
    if fingerprint.chars().count() > MAX_FINGERPRINT_CHARS {
        Err(format!(
            "Fingerprint must be at most {MAX_FINGERPRINT_CHARS} characters"
        ))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOutcome {
    pub views: i32,
    pub is_new_view: bool,
}

impl ViewOutcome {
    pub fn message(&self) -> &'static str {
        if self.is_new_view {
            "View count incremented"
        } else {
            "View already counted for this device"
        }
    }
}

/// Count a view once per device.
pub async fn record_view(
    conn: &mut AsyncPgConnection,
    blog_id: i64,
    device: &Device,
) -> anyhow::Result<ViewOutcome> {
    let new_view = NewBlogView {
        blog_id,
        fingerprint: device.fingerprint.clone(),
        session_id: device.session_id.clone(),
        ip_address: device.ip_address.clone(),
        user_agent: device.user_agent.clone(),
    };

    let outcome = conn
        .transaction::<_, anyhow::Error, _>(|conn| {
            async move {
                let inserted = diesel::insert_into(blog_views::table)
                    .values(&new_view)
                    .on_conflict((blog_views::blog_id, blog_views::fingerprint))
                    .do_nothing()
                    .execute(conn)
                    .await?;

                let is_new_view = inserted == 1;
                let views: i32 = if is_new_view {
                    diesel::update(blogs::table.find(blog_id))
                        .set(blogs::views.eq(blogs::views + 1))
                        .returning(blogs::views)
                        .get_result(conn)
                        .await?
                } else {
                    blogs::table
                        .find(blog_id)
                        .select(blogs::views)
                        .first(conn)
                        .await?
                };
                Ok(ViewOutcome { views, is_new_view })
            }
            .scope_boxed()
        })
        .await?;

    crate::metrics::view_recorded(outcome.is_new_view);
    tracing::info!(
        blog_id,
        fingerprint = %device.fingerprint,
        is_new_view = outcome.is_new_view,
        views = outcome.views,
        "Blog view recorded"
    );
    Ok(outcome)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Like,
    Unlike,
}

impl LikeAction {
    /// `None` defaults to `like`; anything but `like`/`unlike` is rejected.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.unwrap_or("like") {
            "like" => Some(Self::Like),
            "unlike" => Some(Self::Unlike),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
        }
    }
}

/// What happens to the device's like record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    Insert { active: bool },
    SetActive(bool),
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeTransition {
    pub change: RecordChange,
    pub delta: i32,
    pub is_liked: bool,
    pub message: &'static str,
}

/// Like state machine. `existing` is the device's record state
/// (`Some(is_active)`) or `None` when it has never interacted.
pub fn like_transition(existing: Option<bool>, action: LikeAction) -> LikeTransition {
    match (existing, action) {
        (None, LikeAction::Like) => LikeTransition {
            change: RecordChange::Insert { active: true },
            delta: 1,
            is_liked: true,
            message: "Blog liked",
        },
        (Some(false), LikeAction::Like) => LikeTransition {
            change: RecordChange::SetActive(true),
            delta: 1,
            is_liked: true,
            message: "Blog liked",
        },
        (Some(true), LikeAction::Like) => LikeTransition {
            change: RecordChange::Keep,
            delta: 0,
            is_liked: true,
            message: "Already liked by this device",
        },
        (None, LikeAction::Unlike) => LikeTransition {
            change: RecordChange::Insert { active: false },
            delta: 0,
            is_liked: false,
            message: "Not currently liked",
        },
        (Some(true), LikeAction::Unlike) => LikeTransition {
            change: RecordChange::SetActive(false),
            delta: -1,
            is_liked: false,
            message: "Blog unliked",
        },
        (Some(false), LikeAction::Unlike) => LikeTransition {
            change: RecordChange::Keep,
            delta: 0,
            is_liked: false,
            message: "Not currently liked",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub likes: i32,
    pub is_liked: bool,
    pub message: &'static str,
}

async fn find_like_for_update(
    conn: &mut AsyncPgConnection,
    blog_id: i64,
    fingerprint: &str,
) -> anyhow::Result<Option<BlogLike>> {
    let result = blog_likes::table
        .filter(blog_likes::blog_id.eq(blog_id))
        .filter(blog_likes::fingerprint.eq(fingerprint))
        .select(BlogLike::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

async fn set_like_active(
    conn: &mut AsyncPgConnection,
    like_id: i64,
    active: bool,
) -> anyhow::Result<()> {
    diesel::update(blog_likes::table.find(like_id))
        .set(blog_likes::is_active.eq(active))
        .execute(conn)
        .await?;
    Ok(())
}

/// Apply a like or unlike for a device; the record and the counter move
/// in one transaction and the counter never drops below zero.
pub async fn toggle_like(
    conn: &mut AsyncPgConnection,
    blog_id: i64,
    device: &Device,
    action: LikeAction,
) -> anyhow::Result<LikeOutcome> {
    let device = device.clone();

    let (transition, likes) = conn
        .transaction::<_, anyhow::Error, _>(|conn| {
            async move {
                let existing = find_like_for_update(conn, blog_id, &device.fingerprint).await?;
                let mut transition = like_transition(existing.as_ref().map(|l| l.is_active), action);

                match (transition.change, existing) {
                    (RecordChange::Insert { active }, _) => {
                        let inserted = diesel::insert_into(blog_likes::table)
                            .values(&NewBlogLike {
                                blog_id,
                                fingerprint: device.fingerprint.clone(),
                                ip_address: device.ip_address.clone(),
                                user_agent: device.user_agent.clone(),
                                is_active: active,
                            })
                            .on_conflict((blog_likes::blog_id, blog_likes::fingerprint))
                            .do_nothing()
                            .execute(conn)
                            .await?;

                        if inserted == 0 {
                            // A concurrent request created the record first.
                            let current = find_like_for_update(conn, blog_id, &device.fingerprint)
                                .await?
                                .ok_or_else(|| anyhow::anyhow!("like record disappeared"))?;
                            transition = like_transition(Some(current.is_active), action);
                            if let RecordChange::SetActive(active) = transition.change {
                                set_like_active(conn, current.id, active).await?;
                            }
                        }
                    }
                    (RecordChange::SetActive(active), Some(record)) => {
                        set_like_active(conn, record.id, active).await?;
                    }
                    _ => {}
                }

                let target = blogs::table.find(blog_id);
                let likes: i32 = match transition.delta {
                    0 => target.select(blogs::likes).first(conn).await?,
                    d if d > 0 => {
                        diesel::update(target)
                            .set(blogs::likes.eq(blogs::likes + d))
                            .returning(blogs::likes)
                            .get_result(conn)
                            .await?
                    }
                    _ => {
                        diesel::update(target)
                            .set(blogs::likes.eq(sql::<Integer>("GREATEST(likes - 1, 0)")))
                            .returning(blogs::likes)
                            .get_result(conn)
                            .await?
                    }
                };

                Ok((transition, likes))
            }
            .scope_boxed()
        })
        .await?;

    crate::metrics::like_toggled(action.as_str(), transition.delta != 0);
    tracing::info!(
        blog_id,
        action = action.as_str(),
        delta = transition.delta,
        likes,
        "Blog like toggled"
    );

    Ok(LikeOutcome {
        likes,
        is_liked: transition.is_liked,
        message: transition.message,
    })
}

/// Validate a reported reading-time increment.
pub fn validate_duration(seconds: i64) -> Result<i32, String> {
    if (1..=i64::from(MAX_DURATION_SECONDS)).contains(&seconds) {
        Ok(seconds as i32)
    } else {
        Err(format!(
            "Duration must be between 1 and {MAX_DURATION_SECONDS} seconds"
        ))
    }
}

/// Add reading time to the device's view record. `None` when the device
/// has no view record for the post.
pub async fn add_duration(
    conn: &mut AsyncPgConnection,
    blog_id: i64,
    fingerprint: &str,
    seconds: i32,
) -> anyhow::Result<Option<i32>> {
    let total = diesel::update(
        blog_views::table
            .filter(blog_views::blog_id.eq(blog_id))
            .filter(blog_views::fingerprint.eq(fingerprint)),
    )
    .set((
        blog_views::duration_seconds.eq(blog_views::duration_seconds + seconds),
        blog_views::last_seen.eq(chrono::Utc::now()),
    ))
    .returning(blog_views::duration_seconds)
    .get_result::<i32>(conn)
    .await
    .optional()?;

    if let Some(total) = total {
        crate::metrics::reading_time(seconds);
        tracing::debug!(blog_id, seconds, total, "Reading time updated");
    }
    Ok(total)
}

// ── Admin logs ──

#[derive(Debug, Default, Deserialize)]
pub struct EngagementFilter {
    pub blog_id: Option<i64>,
    pub limit: Option<i64>,
}

const DEFAULT_LOG_LIMIT: i64 = 200;
const MAX_LOG_LIMIT: i64 = 1000;

impl EngagementFilter {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LOG_LIMIT)
            .clamp(1, MAX_LOG_LIMIT)
    }
}

/// Most recent views first.
pub async fn list_views(
    conn: &mut AsyncPgConnection,
    filter: &EngagementFilter,
) -> anyhow::Result<Vec<BlogViewLog>> {
    let mut query = blog_views::table.into_boxed();
    if let Some(blog_id) = filter.blog_id {
        query = query.filter(blog_views::blog_id.eq(blog_id));
    }
    let views = query
        .order(blog_views::viewed_at.desc())
        .limit(filter.limit())
        .select(BlogView::as_select())
        .load(conn)
        .await?;
    Ok(views.into_iter().map(BlogViewLog::from).collect())
}

pub async fn list_likes(
    conn: &mut AsyncPgConnection,
    filter: &EngagementFilter,
) -> anyhow::Result<Vec<BlogLike>> {
    let mut query = blog_likes::table.into_boxed();
    if let Some(blog_id) = filter.blog_id {
        query = query.filter(blog_likes::blog_id.eq(blog_id));
    }
    let likes = query
        .order(blog_likes::liked_at.desc())
        .limit(filter.limit())
        .select(BlogLike::as_select())
        .load(conn)
        .await?;
    Ok(likes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_like_inserts_active_record() {
        let t = like_transition(None, LikeAction::Like);
        assert_eq!(t.change, RecordChange::Insert { active: true });
        assert_eq!(t.delta, 1);
        assert!(t.is_liked);
        assert_eq!(t.message, "Blog liked");
    }

    #[test]
    fn relike_after_unlike_reactivates() {
        let t = like_transition(Some(false), LikeAction::Like);
        assert_eq!(t.change, RecordChange::SetActive(true));
        assert_eq!(t.delta, 1);
        assert!(t.is_liked);
    }

    #[test]
    fn duplicate_like_is_a_no_op() {
        let t = like_transition(Some(true), LikeAction::Like);
        assert_eq!(t.change, RecordChange::Keep);
        assert_eq!(t.delta, 0);
        assert!(t.is_liked);
        assert_eq!(t.message, "Already liked by this device");
    }

    #[test]
    fn unlike_without_record_stores_inactive() {
        let t = like_transition(None, LikeAction::Unlike);
        assert_eq!(t.change, RecordChange::Insert { active: false });
        assert_eq!(t.delta, 0);
        assert!(!t.is_liked);
        assert_eq!(t.message, "Not currently liked");
    }

    #[test]
    fn unlike_active_record_decrements() {
        let t = like_transition(Some(true), LikeAction::Unlike);
        assert_eq!(t.change, RecordChange::SetActive(false));
        assert_eq!(t.delta, -1);
        assert_eq!(t.message, "Blog unliked");
    }

    #[test]
    fn unlike_inactive_record_is_a_no_op() {
        let t = like_transition(Some(false), LikeAction::Unlike);
        assert_eq!(t.change, RecordChange::Keep);
        assert_eq!(t.delta, 0);
        assert!(!t.is_liked);
    }

    #[test]
    fn like_sequence_keeps_count_equal_to_active_records() {
        // like, like, unlike, unlike, like: ends active with net +1.
        let actions = [
            LikeAction::Like,
            LikeAction::Like,
            LikeAction::Unlike,
            LikeAction::Unlike,
            LikeAction::Like,
        ];
        let mut state = None;
        let mut likes = 0;
        for action in actions {
            let t = like_transition(state, action);
            likes = (likes + t.delta).max(0);
            state = Some(t.is_liked);
        }
        assert_eq!(likes, 1);
        assert_eq!(state, Some(true));
    }

    #[test]
    fn action_parsing_defaults_to_like() {
        assert_eq!(LikeAction::parse(None), Some(LikeAction::Like));
        assert_eq!(LikeAction::parse(Some("unlike")), Some(LikeAction::Unlike));
        assert_eq!(LikeAction::parse(Some("love")), None);
        assert_eq!(LikeAction::parse(Some("")), None);
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(validate_duration(30), Ok(30));
        assert_eq!(validate_duration(86_400), Ok(86_400));
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-5).is_err());
        assert!(validate_duration(86_401).is_err());
    }

    #[test]
    fn oversized_fingerprint_is_rejected() {
        assert!(validate_fingerprint(&"f".repeat(MAX_FINGERPRINT_CHARS)).is_ok());
        let err = validate_fingerprint(&"f".repeat(300)).unwrap_err();
        assert!(err.contains("255"));
    }

    #[test]
    fn session_id_is_truncated_to_column_width() {
        let device = Device::new("fp".into(), &"é".repeat(400), None, String::new());
        assert_eq!(device.session_id.chars().count(), 255);
        let short = Device::new("fp".into(), "abc", None, String::new());
        assert_eq!(short.session_id, "abc");
    }

    #[test]
    fn view_messages() {
        let new = ViewOutcome {
            views: 1,
            is_new_view: true,
        };
        let dup = ViewOutcome {
            views: 1,
            is_new_view: false,
        };
        assert_eq!(new.message(), "View count incremented");
        assert_eq!(dup.message(), "View already counted for this device");
    }

    #[test]
    fn log_limit_is_clamped() {
        let filter = EngagementFilter {
            blog_id: None,
            limit: Some(50_000),
        };
        assert_eq!(filter.limit(), MAX_LOG_LIMIT);
        assert_eq!(EngagementFilter::default().limit(), DEFAULT_LOG_LIMIT);
    }

    // ── Against a live database ──

    use crate::db::test_db;

    fn test_device(fingerprint: &str) -> Device {
        Device::new(
            fingerprint.to_string(),
            "session",
            Some("203.0.113.9".into()),
            "test-agent".into(),
        )
    }

    async fn active_likes(conn: &mut AsyncPgConnection, blog_id: i64) -> i64 {
        blog_likes::table
            .filter(blog_likes::blog_id.eq(blog_id))
            .filter(blog_likes::is_active.eq(true))
            .count()
            .get_result(conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn repeat_view_from_same_device_is_not_counted() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;
        let blog = test_db::published_blog(conn, "View Counting").await;
        let reader = test_device(&test_db::fingerprint());

        let first = record_view(conn, blog.id, &reader).await.unwrap();
        assert_eq!(first, ViewOutcome { views: 1, is_new_view: true });

        let again = record_view(conn, blog.id, &reader).await.unwrap();
        assert_eq!(again, ViewOutcome { views: 1, is_new_view: false });

        let other = record_view(conn, blog.id, &test_device(&test_db::fingerprint()))
            .await
            .unwrap();
        assert_eq!(other, ViewOutcome { views: 2, is_new_view: true });

        let records: i64 = blog_views::table
            .filter(blog_views::blog_id.eq(blog.id))
            .count()
            .get_result(conn)
            .await
            .unwrap();
        assert_eq!(records, 2);

        crate::services::blog_service::delete(conn, blog.id).await.unwrap();
    }

    #[tokio::test]
    async fn likes_track_active_records() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;
        let blog = test_db::published_blog(conn, "Like Tracking").await;
        let alice = test_device(&test_db::fingerprint());
        let bob = test_device(&test_db::fingerprint());

        let steps = [
            (&alice, LikeAction::Unlike, 0, false, "Not currently liked"),
            (&alice, LikeAction::Like, 1, true, "Blog liked"),
            (&alice, LikeAction::Like, 1, true, "Already liked by this device"),
            (&bob, LikeAction::Like, 2, true, "Blog liked"),
            (&alice, LikeAction::Unlike, 1, false, "Blog unliked"),
            (&alice, LikeAction::Unlike, 1, false, "Not currently liked"),
            (&alice, LikeAction::Like, 2, true, "Blog liked"),
        ];
        for (device, action, likes, is_liked, message) in steps {
            let outcome = toggle_like(conn, blog.id, device, action).await.unwrap();
            assert_eq!(
                outcome,
                LikeOutcome { likes, is_liked, message },
                "{} {}",
                device.fingerprint,
                action.as_str()
            );
            assert_eq!(active_likes(conn, blog.id).await, i64::from(likes));
        }

        crate::services::blog_service::delete(conn, blog.id).await.unwrap();
    }

    #[tokio::test]
    async fn unlike_never_drives_counter_negative() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;
        let blog = test_db::published_blog(conn, "Like Floor").await;
        let device = test_device(&test_db::fingerprint());

        toggle_like(conn, blog.id, &device, LikeAction::Like).await.unwrap();
        // Counter edited out from under the like record.
        diesel::update(blogs::table.find(blog.id))
            .set(blogs::likes.eq(0))
            .execute(conn)
            .await
            .unwrap();

        let outcome = toggle_like(conn, blog.id, &device, LikeAction::Unlike)
            .await
            .unwrap();
        assert_eq!(outcome.likes, 0);
        assert!(!outcome.is_liked);

        crate::services::blog_service::delete(conn, blog.id).await.unwrap();
    }

    #[tokio::test]
    async fn duration_needs_an_existing_view() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;
        let blog = test_db::published_blog(conn, "Reading Time").await;
        let fingerprint = test_db::fingerprint();

        assert_eq!(add_duration(conn, blog.id, &fingerprint, 30).await.unwrap(), None);

        record_view(conn, blog.id, &test_device(&fingerprint)).await.unwrap();
        assert_eq!(add_duration(conn, blog.id, &fingerprint, 30).await.unwrap(), Some(30));
        assert_eq!(add_duration(conn, blog.id, &fingerprint, 45).await.unwrap(), Some(75));

        crate::services::blog_service::delete(conn, blog.id).await.unwrap();
    }

    #[tokio::test]
    async fn long_session_id_is_stored_truncated() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;
        let blog = test_db::published_blog(conn, "Long Session").await;
        let device = Device::new(test_db::fingerprint(), &"s".repeat(400), None, String::new());

        let outcome = record_view(conn, blog.id, &device).await.unwrap();
        assert!(outcome.is_new_view);

        crate::services::blog_service::delete(conn, blog.id).await.unwrap();
    }
}

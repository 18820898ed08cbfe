//! Engagement statistics for the admin dashboard.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Integer, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

/// Site-wide totals.
#[derive(Debug, Serialize, QueryableByName)]
pub struct EngagementTotals {
    #[diesel(sql_type = BigInt)]
    pub total_blogs: i64,
    #[diesel(sql_type = BigInt)]
    pub published_blogs: i64,
    #[diesel(sql_type = BigInt)]
    pub total_views: i64,
    #[diesel(sql_type = BigInt)]
    pub total_likes: i64,
    #[diesel(sql_type = BigInt)]
    pub total_comments: i64,
    #[diesel(sql_type = BigInt)]
    pub pending_comments: i64,
    #[diesel(sql_type = BigInt)]
    pub unique_viewers: i64,
    #[diesel(sql_type = BigInt)]
    pub active_likes: i64,
    #[diesel(sql_type = BigInt)]
    pub newsletter_subscribers: i64,
}

pub async fn query_totals(conn: &mut AsyncPgConnection) -> anyhow::Result<EngagementTotals> {
    let result = diesel::sql_query(
        "SELECT \
            (SELECT COUNT(*) FROM blogs) AS total_blogs, \
            (SELECT COUNT(*) FROM blogs WHERE is_published) AS published_blogs, \
            (SELECT COALESCE(SUM(views), 0)::bigint FROM blogs) AS total_views, \
            (SELECT COALESCE(SUM(likes), 0)::bigint FROM blogs) AS total_likes, \
            (SELECT COUNT(*) FROM blog_comments) AS total_comments, \
            (SELECT COUNT(*) FROM blog_comments WHERE NOT is_approved) AS pending_comments, \
            (SELECT COUNT(DISTINCT fingerprint) FROM blog_views) AS unique_viewers, \
            (SELECT COUNT(*) FROM blog_likes WHERE is_active) AS active_likes, \
            (SELECT COUNT(*) FROM newsletter_subscribers WHERE is_active) AS newsletter_subscribers",
    )
    .get_result(conn)
    .await?;
    Ok(result)
}

/// A post ranked by views.
#[derive(Debug, Serialize, QueryableByName)]
pub struct TopBlog {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub slug: String,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Integer)]
    pub views: i32,
    #[diesel(sql_type = Integer)]
    pub likes: i32,
    #[diesel(sql_type = Integer)]
    pub comments_count: i32,
    #[diesel(sql_type = BigInt)]
    pub total_reading_seconds: i64,
}

pub async fn query_top_blogs(
    conn: &mut AsyncPgConnection,
    limit: i64,
) -> anyhow::Result<Vec<TopBlog>> {
    let results = diesel::sql_query(
        "SELECT b.id, b.slug, b.title, b.views, b.likes, b.comments_count, \
            COALESCE((SELECT SUM(v.duration_seconds) FROM blog_views v WHERE v.blog_id = b.id), 0)::bigint \
                AS total_reading_seconds \
         FROM blogs b \
         ORDER BY b.views DESC, b.id ASC \
         LIMIT $1",
    )
    .bind::<BigInt, _>(limit)
    .load(conn)
    .await?;
    Ok(results)
}

/// New device views per day.
#[derive(Debug, Serialize, QueryableByName)]
pub struct DailyViews {
    #[diesel(sql_type = Date)]
    pub day: chrono::NaiveDate,
    #[diesel(sql_type = BigInt)]
    pub views: i64,
}

pub async fn query_daily_views(
    conn: &mut AsyncPgConnection,
    days: i32,
) -> anyhow::Result<Vec<DailyViews>> {
    let results = diesel::sql_query(format!(
        "SELECT viewed_date AS day, COUNT(*) AS views \
         FROM blog_views \
         WHERE viewed_date >= CURRENT_DATE - INTERVAL '{days} days' \
         GROUP BY viewed_date \
         ORDER BY viewed_date ASC"
    ))
    .load(conn)
    .await?;
    Ok(results)
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub totals: EngagementTotals,
    pub top_blogs: Vec<TopBlog>,
    pub daily_views: Vec<DailyViews>,
}

pub async fn query_dashboard(
    conn: &mut AsyncPgConnection,
    top: i64,
    days: i32,
) -> anyhow::Result<DashboardStats> {
    Ok(DashboardStats {
        totals: query_totals(conn).await?,
        top_blogs: query_top_blogs(conn, top.clamp(1, 100)).await?,
        daily_views: query_daily_views(conn, days.clamp(1, 365)).await?,
    })
}

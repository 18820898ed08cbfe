//! Blog posts: public listings, admin editing and bulk actions.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;

use crate::models::blog::{Blog, BlogInput};
use crate::schema::blogs;

/// Published posts, newest first.
pub async fn list_published(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Blog>> {
    let results = blogs::table
        .filter(blogs::is_published.eq(true))
        .order((
            blogs::published_date.desc().nulls_last(),
            blogs::display_order.asc(),
        ))
        .select(Blog::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

/// Published trending posts, most viewed first.
pub async fn list_trending(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Blog>> {
    let results = blogs::table
        .filter(blogs::is_published.eq(true))
        .filter(blogs::is_trending.eq(true))
        .order((
            blogs::views.desc(),
            blogs::published_date.desc().nulls_last(),
        ))
        .select(Blog::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_featured(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Blog>> {
    let results = blogs::table
        .filter(blogs::is_published.eq(true))
        .filter(blogs::is_featured.eq(true))
        .order(blogs::published_date.desc().nulls_last())
        .select(Blog::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_by_category(
    conn: &mut AsyncPgConnection,
    category: &str,
) -> anyhow::Result<Vec<Blog>> {
    let results = blogs::table
        .filter(blogs::is_published.eq(true))
        .filter(blogs::category.eq(category))
        .order(blogs::published_date.desc().nulls_last())
        .select(Blog::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

/// A published post by slug. Drafts are invisible to the public API.
pub async fn find_published(
    conn: &mut AsyncPgConnection,
    slug: &str,
) -> anyhow::Result<Option<Blog>> {
    let result = blogs::table
        .filter(blogs::slug.eq(slug))
        .filter(blogs::is_published.eq(true))
        .select(Blog::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<Blog>> {
    let result = blogs::table
        .find(id)
        .select(Blog::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Admin list filters (`?search=&published=&category=`).
#[derive(Debug, Default, Deserialize)]
pub struct BlogFilter {
    pub search: Option<String>,
    pub published: Option<bool>,
    pub category: Option<String>,
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub async fn list_admin(
    conn: &mut AsyncPgConnection,
    filter: &BlogFilter,
) -> anyhow::Result<Vec<Blog>> {
    let mut query = blogs::table.into_boxed();

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            blogs::title
                .ilike(pattern.clone())
                .or(blogs::subtitle.ilike(pattern.clone()))
                .or(blogs::excerpt.ilike(pattern.clone()))
                .or(blogs::content_markdown.ilike(pattern.clone()))
                .or(blogs::author.ilike(pattern.clone()))
                .or(blogs::category.ilike(pattern)),
        );
    }
    if let Some(published) = filter.published {
        query = query.filter(blogs::is_published.eq(published));
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.filter(blogs::category.eq(category.to_string()));
    }

    let results = query
        .order((
            blogs::published_date.desc().nulls_last(),
            blogs::display_order.asc(),
        ))
        .select(Blog::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

/// Fill derived fields before saving: slug from the title, read time from
/// the body. Returns false when no usable slug can be derived.
pub fn prepare_input(input: &mut BlogInput) -> bool {
    if input.read_time <= 0 {
        input.read_time = crate::markdown::estimate_read_time(&input.content_markdown);
    }
    crate::format::fill_slug(&mut input.slug, &input.title)
}

pub async fn create(conn: &mut AsyncPgConnection, input: &BlogInput) -> anyhow::Result<Blog> {
    let result = diesel::insert_into(blogs::table)
        .values(input)
        .returning(Blog::as_returning())
        .get_result(conn)
        .await?;
    tracing::info!(blog_id = result.id, slug = %result.slug, "Blog created");
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &BlogInput,
) -> anyhow::Result<Option<Blog>> {
    let result = diesel::update(blogs::table.find(id))
        .set((input, blogs::updated_at.eq(chrono::Utc::now())))
        .returning(Blog::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Comments, views and likes go with the post (ON DELETE CASCADE).
pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(blogs::table.find(id)).execute(conn).await?;
    Ok(deleted > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlogAction {
    Publish,
    Unpublish,
    MarkTrending,
    UnmarkTrending,
}

/// Apply a bulk action; returns the number of rows updated.
pub async fn apply_action(
    conn: &mut AsyncPgConnection,
    action: BlogAction,
    ids: &[i64],
) -> anyhow::Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let now = chrono::Utc::now();
    let target = blogs::table.filter(blogs::id.eq_any(ids));
    let updated = match action {
        BlogAction::Publish | BlogAction::Unpublish => {
            diesel::update(target)
                .set((
                    blogs::is_published.eq(action == BlogAction::Publish),
                    blogs::updated_at.eq(now),
                ))
                .execute(conn)
                .await?
        }
        BlogAction::MarkTrending | BlogAction::UnmarkTrending => {
            diesel::update(target)
                .set((
                    blogs::is_trending.eq(action == BlogAction::MarkTrending),
                    blogs::updated_at.eq(now),
                ))
                .execute(conn)
                .await?
        }
    };
    tracing::info!(?action, updated, "Blog bulk action applied");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, body: &str) -> BlogInput {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "content_markdown": body,
        }))
        .unwrap()
    }

    #[test]
    fn prepare_fills_slug_and_read_time() {
        let mut blog = input("Getting Started with Rust", &"word ".repeat(450));
        assert!(prepare_input(&mut blog));
        assert_eq!(blog.slug, "getting-started-with-rust");
        assert_eq!(blog.read_time, 3);
        assert_eq!(blog.author, "Admin");
        assert!(blog.allow_comments);
    }

    #[test]
    fn prepare_keeps_explicit_values() {
        let mut blog = input("Title", "short");
        blog.slug = "custom".into();
        blog.read_time = 12;
        assert!(prepare_input(&mut blog));
        assert_eq!(blog.slug, "custom");
        assert_eq!(blog.read_time, 12);
    }

    #[test]
    fn prepare_rejects_unsluggable_title() {
        let mut blog = input("???", "");
        assert!(!prepare_input(&mut blog));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn actions_parse_snake_case() {
        let action: BlogAction = serde_json::from_str("\"mark_trending\"").unwrap();
        assert_eq!(action, BlogAction::MarkTrending);
        assert!(serde_json::from_str::<BlogAction>("\"delete\"").is_err());
    }
}

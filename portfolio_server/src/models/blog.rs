//! Blog posts.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{default_true, empty_list};
use crate::schema::blogs;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blogs)]
pub struct Blog {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub excerpt: String,
    pub content_markdown: String,
    pub cover_image: String,
    pub featured_image: String,
    pub category: String,
    pub tags: serde_json::Value,
    pub author: String,
    pub published_date: Option<DateTime<Utc>>,
    pub views: i32,
    pub likes: i32,
    pub comments_count: i32,
    pub shares: i32,
    pub is_published: bool,
    pub is_featured: bool,
    pub is_trending: bool,
    pub is_editor_choice: bool,
    pub allow_comments: bool,
    pub display_order: i32,
    pub read_time: i32,
    pub meta_description: String,
    pub meta_keywords: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_author() -> String {
    "Admin".to_string()
}

/// Admin body for creating or replacing a blog post.
///
/// Engagement counters are not part of the body; they only move through
/// the engagement endpoints.
#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = blogs, treat_none_as_null = true)]
pub struct BlogInput {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content_markdown: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "empty_list")]
    pub tags: serde_json::Value,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_editor_choice: bool,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    #[serde(default)]
    pub display_order: i32,
    /// Minutes; zero means "estimate from the content".
    #[serde(default)]
    pub read_time: i32,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub meta_keywords: String,
}

/// Lightweight listing shape without the post body.
#[derive(Debug, Serialize)]
pub struct BlogListItem {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    pub excerpt: String,
    pub cover_image: String,
    pub category: String,
    pub tags: serde_json::Value,
    pub author: String,
    pub published_date: Option<DateTime<Utc>>,
    pub views: i32,
    pub likes: i32,
    pub comments_count: i32,
    pub is_trending: bool,
    pub is_featured: bool,
    pub read_time: i32,
}

impl From<Blog> for BlogListItem {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            slug: blog.slug,
            title: blog.title,
            subtitle: blog.subtitle,
            excerpt: blog.excerpt,
            cover_image: blog.cover_image,
            category: blog.category,
            tags: blog.tags,
            author: blog.author,
            published_date: blog.published_date,
            views: blog.views,
            likes: blog.likes,
            comments_count: blog.comments_count,
            is_trending: blog.is_trending,
            is_featured: blog.is_featured,
            read_time: blog.read_time,
        }
    }
}

/// Full post with rendered HTML.
#[derive(Debug, Serialize)]
pub struct BlogDetail {
    #[serde(flatten)]
    pub blog: Blog,
    pub content_html: String,
}

impl From<Blog> for BlogDetail {
    fn from(blog: Blog) -> Self {
        let content_html = crate::markdown::render(&blog.content_markdown);
        Self { blog, content_html }
    }
}

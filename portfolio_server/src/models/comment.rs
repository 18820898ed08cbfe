//! Reader comments on blog posts.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::blog_comments;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blog_comments)]
pub struct BlogComment {
    pub id: i64,
    #[serde(rename = "blog")]
    pub blog_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub comment_text: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blog_comments)]
pub struct NewBlogComment {
    pub blog_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub comment_text: String,
}

/// Public comment submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub comment_text: String,
}

/// Moderation edit from the admin API.
#[derive(Debug, Clone, AsChangeset, Deserialize)]
#[diesel(table_name = blog_comments)]
pub struct CommentUpdate {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub comment_text: Option<String>,
    pub is_approved: Option<bool>,
}

/// Echo of a freshly created comment; the email is write-only.
#[derive(Debug, Serialize)]
pub struct CommentEcho {
    pub id: i64,
    pub blog: i64,
    pub author_name: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<BlogComment> for CommentEcho {
    fn from(comment: BlogComment) -> Self {
        Self {
            id: comment.id,
            blog: comment.blog_id,
            author_name: comment.author_name,
            comment_text: comment.comment_text,
            created_at: comment.created_at,
        }
    }
}

//! Reader comments and moderation.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;

use crate::models::comment::{BlogComment, CommentRequest, CommentUpdate, NewBlogComment};
use crate::schema::{blog_comments, blogs};

const MAX_AUTHOR_NAME_LEN: usize = 255;

/// Check a public submission and build the row to insert.
pub fn validate(blog_id: i64, req: &CommentRequest) -> Result<NewBlogComment, String> {
    let author_name = req.author_name.trim();
    let author_email = req.author_email.trim();
    let comment_text = req.comment_text.trim();

    if author_name.is_empty() {
        return Err("Name is required".into());
    }
    if author_name.chars().count() > MAX_AUTHOR_NAME_LEN {
        return Err(format!("Name must be at most {MAX_AUTHOR_NAME_LEN} characters"));
    }
    if !crate::format::is_valid_email(author_email) {
        return Err("Enter a valid email address".into());
    }
    if comment_text.is_empty() {
        return Err("Comment text is required".into());
    }

    Ok(NewBlogComment {
        blog_id,
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        comment_text: comment_text.to_string(),
    })
}

/// Insert the comment and bump the post's counter together.
pub async fn create_comment(
    conn: &mut AsyncPgConnection,
    new_comment: NewBlogComment,
) -> anyhow::Result<BlogComment> {
    let comment = conn
        .transaction::<_, anyhow::Error, _>(|conn| {
            async move {
                let comment = diesel::insert_into(blog_comments::table)
                    .values(&new_comment)
                    .returning(BlogComment::as_returning())
                    .get_result(conn)
                    .await?;
                diesel::update(blogs::table.find(new_comment.blog_id))
                    .set(blogs::comments_count.eq(blogs::comments_count + 1))
                    .execute(conn)
                    .await?;
                Ok(comment)
            }
            .scope_boxed()
        })
        .await?;

    crate::metrics::comment_created();
    tracing::info!(
        blog_id = comment.blog_id,
        comment_id = comment.id,
        "Comment added"
    );
    Ok(comment)
}

/// Approved comments on a post, newest first.
pub async fn list_approved(
    conn: &mut AsyncPgConnection,
    blog_id: i64,
) -> anyhow::Result<Vec<BlogComment>> {
    let results = blog_comments::table
        .filter(blog_comments::blog_id.eq(blog_id))
        .filter(blog_comments::is_approved.eq(true))
        .order(blog_comments::created_at.desc())
        .select(BlogComment::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentFilter {
    pub blog_id: Option<i64>,
    pub approved: Option<bool>,
}

pub async fn list_admin(
    conn: &mut AsyncPgConnection,
    filter: &CommentFilter,
) -> anyhow::Result<Vec<BlogComment>> {
    let mut query = blog_comments::table.into_boxed();
    if let Some(blog_id) = filter.blog_id {
        query = query.filter(blog_comments::blog_id.eq(blog_id));
    }
    if let Some(approved) = filter.approved {
        query = query.filter(blog_comments::is_approved.eq(approved));
    }
    let results = query
        .order(blog_comments::created_at.desc())
        .select(BlogComment::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<BlogComment>> {
    let result = blog_comments::table
        .find(id)
        .select(BlogComment::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    changes: &CommentUpdate,
) -> anyhow::Result<Option<BlogComment>> {
    let result = diesel::update(blog_comments::table.find(id))
        .set((changes, blog_comments::updated_at.eq(chrono::Utc::now())))
        .returning(BlogComment::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Delete a comment and keep the post's counter in step.
pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        async move {
            let blog_id: Option<i64> = diesel::delete(blog_comments::table.find(id))
                .returning(blog_comments::blog_id)
                .get_result(conn)
                .await
                .optional()?;
            let Some(blog_id) = blog_id else {
                return Ok(false);
            };
            diesel::update(blogs::table.find(blog_id))
                .set(blogs::comments_count.eq(diesel::dsl::sql::<diesel::sql_types::Integer>(
                    "GREATEST(comments_count - 1, 0)",
                )))
                .execute(conn)
                .await?;
            Ok(true)
        }
        .scope_boxed()
    })
    .await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Approve,
    Unapprove,
}

pub async fn apply_action(
    conn: &mut AsyncPgConnection,
    action: CommentAction,
    ids: &[i64],
) -> anyhow::Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let updated = diesel::update(blog_comments::table.filter(blog_comments::id.eq_any(ids)))
        .set((
            blog_comments::is_approved.eq(action == CommentAction::Approve),
            blog_comments::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(conn)
        .await?;
    tracing::info!(?action, updated, "Comment moderation applied");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, text: &str) -> CommentRequest {
        CommentRequest {
            author_name: name.into(),
            author_email: email.into(),
            comment_text: text.into(),
        }
    }

    #[test]
    fn valid_comment_is_trimmed() {
        let row = validate(3, &request(" Jane ", "jane@example.com ", " Great post! ")).unwrap();
        assert_eq!(row.blog_id, 3);
        assert_eq!(row.author_name, "Jane");
        assert_eq!(row.author_email, "jane@example.com");
        assert_eq!(row.comment_text, "Great post!");
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert!(validate(1, &request("", "a@b.co", "hi")).is_err());
        assert!(validate(1, &request("A", "not-an-email", "hi")).is_err());
        assert!(validate(1, &request("A", "a@b.co", "   ")).is_err());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "n".repeat(256);
        let err = validate(1, &request(&name, "a@b.co", "hi")).unwrap_err();
        assert!(err.contains("255"));
    }
}

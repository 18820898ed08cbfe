//! Markdown copies of blog posts with a `---` frontmatter header.

use std::fmt::Write;

use crate::models::blog::Blog;

/// `published_date` is RFC 3339 (empty when unset), `tags` is JSON.
pub fn render(blog: &Blog) -> String {
    let published = blog
        .published_date
        .map(|d| d.to_rfc3339())
        .unwrap_or_default();
    let tags = serde_json::to_string(&blog.tags).unwrap_or_else(|_| "[]".to_string());

    let mut out = String::with_capacity(blog.content_markdown.len() + 512);
    out.push_str("---\n");
    let _ = writeln!(out, "title: {}", one_line(&blog.title));
    let _ = writeln!(out, "subtitle: {}", one_line(&blog.subtitle));
    let _ = writeln!(out, "slug: {}", blog.slug);
    let _ = writeln!(out, "author: {}", one_line(&blog.author));
    let _ = writeln!(out, "published_date: {published}");
    let _ = writeln!(out, "category: {}", one_line(&blog.category));
    let _ = writeln!(out, "tags: {tags}");
    let _ = writeln!(out, "is_published: {}", blog.is_published);
    let _ = writeln!(out, "is_featured: {}", blog.is_featured);
    let _ = writeln!(out, "is_trending: {}", blog.is_trending);
    let _ = writeln!(out, "views: {}", blog.views);
    let _ = writeln!(out, "likes: {}", blog.likes);
    let _ = writeln!(out, "read_time: {}", blog.read_time);
    let _ = writeln!(out, "cover_image: {}", one_line(&blog.cover_image));
    out.push_str("---\n\n");
    out.push_str(&blog.content_markdown);
    out.push('\n');
    out
}

/// Header values must stay on one line.
fn one_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// File name for a post; slugs are already path-safe, the fallback covers
/// rows imported with an empty slug.
pub fn file_name(blog: &Blog) -> String {
    let stem = crate::format::slugify(&blog.slug);
    if stem.is_empty() {
        format!("blog-{}.md", blog.id)
    } else {
        format!("{stem}.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn blog() -> Blog {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap();
        Blog {
            id: 1,
            slug: "hello-rust".into(),
            title: "Hello\nRust".into(),
            subtitle: String::new(),
            excerpt: String::new(),
            content_markdown: "# Hi\n\nBody".into(),
            cover_image: String::new(),
            featured_image: String::new(),
            category: "Engineering".into(),
            tags: json!(["rust", "web"]),
            author: "Admin".into(),
            published_date: Some(now),
            views: 12,
            likes: 3,
            comments_count: 0,
            shares: 0,
            is_published: true,
            is_featured: false,
            is_trending: true,
            is_editor_choice: false,
            allow_comments: true,
            display_order: 0,
            read_time: 4,
            meta_description: String::new(),
            meta_keywords: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn frontmatter_precedes_body() {
        let md = render(&blog());
        assert!(md.starts_with("---\ntitle: Hello Rust\n"));
        assert!(md.contains("published_date: 2026-05-01T09:30:00+00:00\n"));
        assert!(md.contains("tags: [\"rust\",\"web\"]\n"));
        assert!(md.contains("is_published: true\nis_featured: false\nis_trending: true\n"));
        assert!(md.ends_with("---\n\n# Hi\n\nBody\n"));
    }

    #[test]
    fn unpublished_date_is_empty() {
        let mut b = blog();
        b.published_date = None;
        assert!(render(&b).contains("published_date: \n"));
    }

    #[test]
    fn file_names_fall_back_to_id() {
        let mut b = blog();
        assert_eq!(file_name(&b), "hello-rust.md");
        b.slug = "../../etc".into();
        assert_eq!(file_name(&b), "etc.md");
        b.slug = String::new();
        assert_eq!(file_name(&b), "blog-1.md");
    }
}

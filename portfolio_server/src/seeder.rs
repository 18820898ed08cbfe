//! Startup seeding: singleton rows and optional demo blog posts.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde_json::json;

use crate::models::blog::BlogInput;
use crate::models::home::{HomeInput, HOME_ID};
use crate::models::settings::{BlogsDataInput, TrackingSettings, BLOGS_DATA_ID, SETTINGS_ID};
use crate::schema::{blog_settings, blogs, blogs_data, home_data};
use crate::services::blog_service;

/// Ensure the singleton rows exist. Existing rows are left untouched.
pub async fn seed_singletons(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    let settings = diesel::insert_into(blog_settings::table)
        .values((
            blog_settings::id.eq(SETTINGS_ID),
            &TrackingSettings::default(),
        ))
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;

    let mut home: HomeInput = serde_json::from_value(json!({}))?;
    home.id = HOME_ID;
    let home = diesel::insert_into(home_data::table)
        .values(&home)
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;

    let data: BlogsDataInput = serde_json::from_value(json!({}))?;
    let data = diesel::insert_into(blogs_data::table)
        .values((blogs_data::id.eq(BLOGS_DATA_ID), &data))
        .on_conflict_do_nothing()
        .execute(conn)
        .await?;

    tracing::info!(
        blog_settings = settings,
        home_data = home,
        blogs_data = data,
        "Singleton rows seeded"
    );
    Ok(())
}

// (slug, title, category, tags, featured, trending, days ago, body)
type DemoPost = (&'static str, &'static str, &'static str, &'static [&'static str], bool, bool, i64, &'static str);

const DEMO_POSTS: &[DemoPost] = &[
    (
        "building-apis-in-rust",
        "Building Web APIs in Rust",
        "Engineering",
        &["rust", "axum", "api"],
        true,
        true,
        2,
        "# Building Web APIs in Rust\n\n\
         A small service needs three things: a router, a database pool and an \
         error type that turns into a response.\n\n\
         ## Routing\n\n\
         Handlers are plain async functions. Extractors pull the path, the \
         query string and the JSON body out of the request.\n\n\
         ```rust\nasync fn hello() -> &'static str {\n    \"hello\"\n}\n```\n\n\
         ## Errors\n\n\
         Return `Result` everywhere and map failures to status codes in one place.\n",
    ),
    (
        "notes-on-reading-time",
        "Notes on Measuring Reading Time",
        "Research",
        &["analytics", "ux"],
        false,
        true,
        9,
        "# Notes on Measuring Reading Time\n\n\
         Page views say little about whether anyone read the post. Counting \
         active seconds per device is a better signal.\n\n\
         | Signal | Meaning |\n|---|---|\n| views | unique devices |\n| duration | active reading |\n\n\
         - [x] count each device once\n- [ ] weight by scroll depth\n",
    ),
    (
        "markdown-everywhere",
        "Markdown Everywhere",
        "Writing",
        &["markdown", "writing"],
        true,
        false,
        21,
        "# Markdown Everywhere\n\n\
         Posts are written in Markdown and rendered to HTML on request.\n\
         Single line breaks are kept, ~~nothing is lost~~ and footnotes work.[^1]\n\n\
         [^1]: Like this one.\n",
    ),
];

fn demo_input(post: &DemoPost) -> anyhow::Result<BlogInput> {
    let (slug, title, category, tags, featured, trending, days_ago, body) = *post;
    let mut input: BlogInput = serde_json::from_value(json!({
        "slug": slug,
        "title": title,
        "subtitle": "",
        "excerpt": crate::format::preview(body.trim_start_matches('#').trim(), 160),
        "content_markdown": body,
        "category": category,
        "tags": tags,
        "is_published": true,
        "is_featured": featured,
        "is_trending": trending,
    }))?;
    input.published_date = Some(Utc::now() - Duration::days(days_ago));
    blog_service::prepare_input(&mut input);
    Ok(input)
}

/// Replace every blog post with the demo set.
pub async fn seed_sample_blogs(conn: &mut AsyncPgConnection) -> anyhow::Result<usize> {
    let inputs = DEMO_POSTS
        .iter()
        .map(demo_input)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (removed, created) = conn
        .transaction::<_, anyhow::Error, _>(|conn| {
            async move {
                let removed = diesel::delete(blogs::table).execute(conn).await?;
                let created = diesel::insert_into(blogs::table)
                    .values(&inputs)
                    .execute(conn)
                    .await?;
                Ok((removed, created))
            }
            .scope_boxed()
        })
        .await?;

    tracing::warn!(removed, "Cleared existing blogs");
    tracing::info!(created, "Demo blog posts created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_posts_are_complete() {
        for post in DEMO_POSTS {
            let input = demo_input(post).unwrap();
            assert!(input.is_published);
            assert!(input.read_time >= 1);
            assert!(input.published_date.is_some());
            assert_eq!(input.slug, crate::format::slugify(&input.slug));
            assert!(!input.excerpt.is_empty());
        }
    }

    #[test]
    fn demo_slugs_are_unique() {
        let mut slugs: Vec<_> = DEMO_POSTS.iter().map(|p| p.0).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), DEMO_POSTS.len());
    }

    #[test]
    fn singleton_defaults_deserialize_from_empty_objects() {
        let home: HomeInput = serde_json::from_value(json!({})).unwrap();
        assert!(home.about_paragraphs.is_array());
        let data: BlogsDataInput = serde_json::from_value(json!({})).unwrap();
        assert!(data.metadata.is_object());
        assert!(data.blogs.is_array());
    }
}

//! Research publications and the icon catalogue they reference.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::research::{ResearchIcon, ResearchIconInput, ResearchInput, ResearchPublication};
use crate::schema::{research_icons, research_publications};

pub async fn list_visible(
    conn: &mut AsyncPgConnection,
) -> anyhow::Result<Vec<ResearchPublication>> {
    let results = research_publications::table
        .filter(research_publications::is_visible.eq(true))
        .order((
            research_publications::display_order.asc(),
            research_publications::publication_date.desc(),
        ))
        .select(ResearchPublication::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ResearchPublication>> {
    let results = research_publications::table
        .order((
            research_publications::display_order.asc(),
            research_publications::publication_date.desc(),
        ))
        .select(ResearchPublication::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find_by_slug(
    conn: &mut AsyncPgConnection,
    slug: &str,
) -> anyhow::Result<Option<ResearchPublication>> {
    let result = research_publications::table
        .filter(research_publications::slug.eq(slug))
        .filter(research_publications::is_visible.eq(true))
        .select(ResearchPublication::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn find(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> anyhow::Result<Option<ResearchPublication>> {
    let result = research_publications::table
        .find(id)
        .select(ResearchPublication::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create(
    conn: &mut AsyncPgConnection,
    input: &ResearchInput,
) -> anyhow::Result<ResearchPublication> {
    let result = diesel::insert_into(research_publications::table)
        .values(input)
        .returning(ResearchPublication::as_returning())
        .get_result(conn)
        .await?;
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &ResearchInput,
) -> anyhow::Result<Option<ResearchPublication>> {
    let result = diesel::update(research_publications::table.find(id))
        .set((input, research_publications::updated_at.eq(chrono::Utc::now())))
        .returning(ResearchPublication::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(research_publications::table.find(id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

// ── Icons ──

pub async fn list_icons(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ResearchIcon>> {
    let results = research_icons::table
        .order(research_icons::key.asc())
        .select(ResearchIcon::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find_icon(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> anyhow::Result<Option<ResearchIcon>> {
    let result = research_icons::table
        .find(id)
        .select(ResearchIcon::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create_icon(
    conn: &mut AsyncPgConnection,
    input: &ResearchIconInput,
) -> anyhow::Result<ResearchIcon> {
    let result = diesel::insert_into(research_icons::table)
        .values(input)
        .returning(ResearchIcon::as_returning())
        .get_result(conn)
        .await?;
    Ok(result)
}

pub async fn update_icon(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &ResearchIconInput,
) -> anyhow::Result<Option<ResearchIcon>> {
    let result = diesel::update(research_icons::table.find(id))
        .set(input)
        .returning(ResearchIcon::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn delete_icon(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(research_icons::table.find(id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

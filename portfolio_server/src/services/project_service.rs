//! Project CRUD and slug lookup.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::project::{Project, ProjectInput};
use crate::schema::projects;

/// List visible projects in display order.
pub async fn list_visible(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Project>> {
    let results = projects::table
        .filter(projects::is_visible.eq(true))
        .order((projects::display_order.asc(), projects::id.asc()))
        .select(Project::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Project>> {
    let results = projects::table
        .order((projects::display_order.asc(), projects::id.asc()))
        .select(Project::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

/// Find a visible project by slug (e.g., "realtime-analytics-platform").
pub async fn find_by_slug(
    conn: &mut AsyncPgConnection,
    slug: &str,
) -> anyhow::Result<Option<Project>> {
    let result = projects::table
        .filter(projects::slug.eq(slug))
        .filter(projects::is_visible.eq(true))
        .select(Project::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<Project>> {
    let result = projects::table
        .find(id)
        .select(Project::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Create a new project. The caller fills the slug beforehand.
pub async fn create_project(
    conn: &mut AsyncPgConnection,
    new_project: &ProjectInput,
) -> anyhow::Result<Project> {
    let result = diesel::insert_into(projects::table)
        .values(new_project)
        .returning(Project::as_returning())
        .get_result(conn)
        .await?;
    tracing::info!(project_id = result.id, slug = %result.slug, "Project created");
    Ok(result)
}

pub async fn update_project(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &ProjectInput,
) -> anyhow::Result<Option<Project>> {
    let result = diesel::update(projects::table.find(id))
        .set((input, projects::updated_at.eq(chrono::Utc::now())))
        .returning(Project::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn delete_project(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(projects::table.find(id)).execute(conn).await?;
    Ok(deleted > 0)
}

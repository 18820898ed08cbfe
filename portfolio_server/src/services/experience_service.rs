//! Work experience entries.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::experience::{ExperienceEntry, ExperienceInput};
use crate::schema::experience_entries;

/// Visible entries in display order, most recent first within a rank.
pub async fn list_visible(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ExperienceEntry>> {
    let results = experience_entries::table
        .filter(experience_entries::is_visible.eq(true))
        .order((
            experience_entries::display_order.asc(),
            experience_entries::start_date.desc(),
        ))
        .select(ExperienceEntry::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<ExperienceEntry>> {
    let results = experience_entries::table
        .order((
            experience_entries::display_order.asc(),
            experience_entries::start_date.desc(),
        ))
        .select(ExperienceEntry::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<ExperienceEntry>> {
    let result = experience_entries::table
        .find(id)
        .select(ExperienceEntry::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Public detail lookup; hidden entries read as missing.
pub async fn find_visible(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> anyhow::Result<Option<ExperienceEntry>> {
    let result = experience_entries::table
        .find(id)
        .filter(experience_entries::is_visible.eq(true))
        .select(ExperienceEntry::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create(
    conn: &mut AsyncPgConnection,
    input: &ExperienceInput,
) -> anyhow::Result<ExperienceEntry> {
    let result = diesel::insert_into(experience_entries::table)
        .values(input)
        .returning(ExperienceEntry::as_returning())
        .get_result(conn)
        .await?;
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &ExperienceInput,
) -> anyhow::Result<Option<ExperienceEntry>> {
    let result = diesel::update(experience_entries::table.find(id))
        .set((input, experience_entries::updated_at.eq(chrono::Utc::now())))
        .returning(ExperienceEntry::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Returns whether a row was removed.
pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(experience_entries::table.find(id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

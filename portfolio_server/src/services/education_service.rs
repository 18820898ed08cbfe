//! Education entries.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::education::{EducationEntry, EducationInput};
use crate::schema::education_entries;

/// Visible entries in display order, most recent first within a rank.
pub async fn list_visible(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<EducationEntry>> {
    let results = education_entries::table
        .filter(education_entries::is_visible.eq(true))
        .order((
            education_entries::display_order.asc(),
            education_entries::start_date.desc(),
        ))
        .select(EducationEntry::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<EducationEntry>> {
    let results = education_entries::table
        .order((
            education_entries::display_order.asc(),
            education_entries::start_date.desc(),
        ))
        .select(EducationEntry::as_select())
        .load(conn)
        .await?;
    Ok(results)
}

pub async fn find(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<Option<EducationEntry>> {
    let result = education_entries::table
        .find(id)
        .select(EducationEntry::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Public detail lookup; hidden entries read as missing.
pub async fn find_visible(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> anyhow::Result<Option<EducationEntry>> {
    let result = education_entries::table
        .find(id)
        .filter(education_entries::is_visible.eq(true))
        .select(EducationEntry::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(result)
}

pub async fn create(
    conn: &mut AsyncPgConnection,
    input: &EducationInput,
) -> anyhow::Result<EducationEntry> {
    let result = diesel::insert_into(education_entries::table)
        .values(input)
        .returning(EducationEntry::as_returning())
        .get_result(conn)
        .await?;
    Ok(result)
}

pub async fn update(
    conn: &mut AsyncPgConnection,
    id: i64,
    input: &EducationInput,
) -> anyhow::Result<Option<EducationEntry>> {
    let result = diesel::update(education_entries::table.find(id))
        .set((input, education_entries::updated_at.eq(chrono::Utc::now())))
        .returning(EducationEntry::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    Ok(result)
}

/// Returns whether a row was removed.
pub async fn delete(conn: &mut AsyncPgConnection, id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(education_entries::table.find(id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use serde_json::json;

    #[tokio::test]
    async fn hidden_entries_stay_out_of_public_reads() {
        let Some(mut db) = test_db::connect().await else {
            return;
        };
        let conn = &mut db.conn;

        let input: EducationInput =
            serde_json::from_value(json!({"institution": "Hidden U", "is_visible": false})).unwrap();
        let hidden = create(conn, &input).await.unwrap();
        let input: EducationInput = serde_json::from_value(json!({"institution": "Shown"})).unwrap();
        let shown = create(conn, &input).await.unwrap();

        assert!(find(conn, hidden.id).await.unwrap().is_some());
        assert!(find_visible(conn, hidden.id).await.unwrap().is_none());
        assert_eq!(find_visible(conn, shown.id).await.unwrap().map(|e| e.id), Some(shown.id));
        let listed: Vec<i64> = list_visible(conn).await.unwrap().iter().map(|e| e.id).collect();
        assert!(listed.contains(&shown.id));
        assert!(!listed.contains(&hidden.id));

        assert!(delete(conn, hidden.id).await.unwrap());
        assert!(delete(conn, shown.id).await.unwrap());
    }
}

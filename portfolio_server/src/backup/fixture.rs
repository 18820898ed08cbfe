//! Fixture files: `[{"model": "portfolio.<label>", "pk": 1, "fields": {...}}]`.
//!
//! Rows come out of PostgreSQL as `row_to_json` objects and go back in
//! through `json_populate_recordset`, so both sides are plain JSON rows
//! keyed by column name.

use anyhow::{bail, Context};
use serde_json::{Map, Value};

use super::tables::TableSpec;

/// Turn database rows into fixture entries.
pub fn rows_to_fixture(table: &TableSpec, rows: Vec<Value>) -> anyhow::Result<Vec<Value>> {
    let label = table.model_label();
    rows.into_iter()
        .map(|row| -> anyhow::Result<Value> {
            let Value::Object(mut fields) = row else {
                bail!("{}: row is not an object", table.table);
            };
            let pk = fields
                .remove("id")
                .with_context(|| format!("{}: row without id", table.table))?;

            let mut entry = Map::new();
            entry.insert("model".into(), Value::String(label.clone()));
            entry.insert("pk".into(), pk);
            entry.insert("fields".into(), Value::Object(fields));
            Ok(Value::Object(entry))
        })
        .collect()
}

/// Turn fixture entries back into rows with an `id` key. Unknown fields
/// are dropped and legacy field names are mapped to their columns.
pub fn fixture_to_rows(table: &TableSpec, fixture: &Value) -> anyhow::Result<Vec<Value>> {
    let entries = fixture
        .as_array()
        .context("fixture is not a JSON array")?;
    let label = table.model_label();

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| -> anyhow::Result<Value> {
            if let Some(model) = entry.get("model").and_then(Value::as_str) {
                if model != label && !model.ends_with(&format!(".{}", table.label)) {
                    bail!("entry {index}: model {model} does not belong in {}", table.file_name());
                }
            }
            let pk = entry
                .get("pk")
                .and_then(Value::as_i64)
                .with_context(|| format!("entry {index}: missing integer pk"))?;
            let fields = entry
                .get("fields")
                .and_then(Value::as_object)
                .with_context(|| format!("entry {index}: missing fields object"))?;

            let mut row = Map::new();
            row.insert("id".into(), Value::from(pk));
            for (field, value) in fields {
                if let Some(column) = table.column(field) {
                    row.insert(column.to_string(), value.clone());
                }
            }
            Ok(Value::Object(row))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::tables::{BLOG_COMMENTS, PROJECTS, RESEARCH_ICONS};
    use serde_json::json;

    #[test]
    fn rows_become_fixture_entries() {
        let rows = vec![json!({"id": 4, "key": "nlp", "path": "M0 0", "title": "NLP"})];
        let fixture = rows_to_fixture(&RESEARCH_ICONS, rows).unwrap();
        assert_eq!(
            fixture[0],
            json!({
                "model": "portfolio.researchicon",
                "pk": 4,
                "fields": {"key": "nlp", "path": "M0 0", "title": "NLP"}
            })
        );
    }

    #[test]
    fn rows_without_id_are_rejected() {
        let err = rows_to_fixture(&RESEARCH_ICONS, vec![json!({"key": "x"})]).unwrap_err();
        assert!(err.to_string().contains("without id"));
    }

    #[test]
    fn fixture_entries_become_rows() {
        let fixture = json!([{
            "model": "portfolio.blogcomment",
            "pk": 9,
            "fields": {"blog_id": 2, "author_name": "Ann", "bogus": true}
        }]);
        let rows = fixture_to_rows(&BLOG_COMMENTS, &fixture).unwrap();
        assert_eq!(rows, vec![json!({"id": 9, "blog_id": 2, "author_name": "Ann"})]);
    }

    #[test]
    fn legacy_field_names_are_mapped() {
        let fixture = json!([{"model": "api.blogcomment", "pk": 1, "fields": {"blog": 3}}]);
        let rows = fixture_to_rows(&BLOG_COMMENTS, &fixture).unwrap();
        assert_eq!(rows[0]["blog_id"], 3);

        let fixture = json!([{"model": "portfolio.project", "pk": 2, "fields": {"type": "Research"}}]);
        let rows = fixture_to_rows(&PROJECTS, &fixture).unwrap();
        assert_eq!(rows[0]["project_type"], "Research");
    }

    #[test]
    fn wrong_model_is_rejected() {
        let fixture = json!([{"model": "portfolio.blog", "pk": 1, "fields": {}}]);
        assert!(fixture_to_rows(&BLOG_COMMENTS, &fixture).is_err());
    }

    #[test]
    fn malformed_fixtures_are_rejected() {
        assert!(fixture_to_rows(&PROJECTS, &json!({"pk": 1})).is_err());
        assert!(fixture_to_rows(&PROJECTS, &json!([{"fields": {}}])).is_err());
        assert!(fixture_to_rows(&PROJECTS, &json!([{"pk": 1}])).is_err());
    }
}

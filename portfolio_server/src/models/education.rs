//! Education history entries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{default_true, empty_list};
use crate::schema::education_entries;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = education_entries)]
pub struct EducationEntry {
    pub id: i64,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub education_type: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub grade: String,
    pub grade_scale: String,
    pub location: String,
    pub is_current: bool,
    pub institution_logo_url: String,
    pub description: String,
    pub achievements: serde_json::Value,
    pub certificate_url: String,
    pub is_visible: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = education_entries, treat_none_as_null = true)]
pub struct EducationInput {
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field_of_study: String,
    #[serde(default)]
    pub education_type: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub grade_scale: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub institution_logo_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_list")]
    pub achievements: serde_json::Value,
    #[serde(default)]
    pub certificate_url: String,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub display_order: i32,
}

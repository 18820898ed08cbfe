//! Work experience entries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{default_true, empty_list};
use crate::schema::experience_entries;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = experience_entries)]
pub struct ExperienceEntry {
    pub id: i64,
    pub company_name: String,
    pub company_logo_url: String,
    pub role: String,
    pub employment_type: String,
    pub location: String,
    pub work_mode: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub description: String,
    pub achievements: serde_json::Value,
    pub skills: serde_json::Value,
    pub tech_stack: serde_json::Value,
    pub is_visible: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = experience_entries, treat_none_as_null = true)]
pub struct ExperienceInput {
    pub company_name: String,
    #[serde(default)]
    pub company_logo_url: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub work_mode: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_list")]
    pub achievements: serde_json::Value,
    #[serde(default = "empty_list")]
    pub skills: serde_json::Value,
    #[serde(default = "empty_list")]
    pub tech_stack: serde_json::Value,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub display_order: i32,
}

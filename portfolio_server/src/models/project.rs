//! Portfolio projects, addressed by slug.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{default_true, empty_list, empty_object};
use crate::schema::projects;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = projects)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub organization: String,
    pub role: String,
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub short_description: String,
    pub responsibilities: serde_json::Value,
    pub achievements: serde_json::Value,
    pub skills: serde_json::Value,
    pub tech_stack: serde_json::Value,
    pub project_url: String,
    pub github_url: String,
    pub contributor_count: i32,
    pub collaboration: String,
    pub tags: serde_json::Value,
    pub is_visible: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = projects, treat_none_as_null = true)]
pub struct ProjectInput {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default = "empty_list")]
    pub responsibilities: serde_json::Value,
    #[serde(default = "empty_list")]
    pub achievements: serde_json::Value,
    #[serde(default = "empty_list")]
    pub skills: serde_json::Value,
    #[serde(default = "empty_object")]
    pub tech_stack: serde_json::Value,
    #[serde(default)]
    pub project_url: String,
    #[serde(default)]
    pub github_url: String,
    #[serde(default)]
    pub contributor_count: i32,
    #[serde(default)]
    pub collaboration: String,
    #[serde(default = "empty_list")]
    pub tags: serde_json::Value,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub display_order: i32,
}

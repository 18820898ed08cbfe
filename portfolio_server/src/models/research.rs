//! Research publications and the icon set used by the research page.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{default_true, empty_list};
use crate::schema::{research_icons, research_publications};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = research_publications)]
pub struct ResearchPublication {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub authors: serde_json::Value,
    pub publication_date: String,
    pub institution: String,
    pub publication_type: String,
    pub description: String,
    pub objectives: serde_json::Value,
    pub dataset: String,
    pub metrics: serde_json::Value,
    pub comparison_models: serde_json::Value,
    pub results_summary: String,
    pub highlights: serde_json::Value,
    pub tags: serde_json::Value,
    pub url: String,
    pub is_visible: bool,
    pub display_order: i32,
    pub cover_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = research_publications)]
pub struct ResearchInput {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default = "empty_list")]
    pub authors: serde_json::Value,
    #[serde(default)]
    pub publication_date: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub publication_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_list")]
    pub objectives: serde_json::Value,
    #[serde(default)]
    pub dataset: String,
    #[serde(default = "empty_list")]
    pub metrics: serde_json::Value,
    #[serde(default = "empty_list")]
    pub comparison_models: serde_json::Value,
    #[serde(default)]
    pub results_summary: String,
    #[serde(default = "empty_list")]
    pub highlights: serde_json::Value,
    #[serde(default = "empty_list")]
    pub tags: serde_json::Value,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub cover_image: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = research_icons)]
pub struct ResearchIcon {
    pub id: i64,
    pub key: String,
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = research_icons)]
pub struct ResearchIconInput {
    pub key: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub title: String,
}

//! Singleton configuration rows: reading-time tracking settings and the
//! blog landing page document.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{empty_list, empty_object};
use crate::schema::{blog_settings, blogs_data};

pub const SETTINGS_ID: i64 = 1;
pub const BLOGS_DATA_ID: i64 = 1;

pub const DEFAULT_DURATION_UPDATE_INTERVAL: i32 = 300;
pub const DEFAULT_INACTIVITY_THRESHOLD: i32 = 120;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blog_settings)]
pub struct BlogSettings {
    pub id: i64,
    pub duration_update_interval: i32,
    pub inactivity_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Settings as exposed to the reading-time tracker (seconds).
#[derive(Debug, Clone, Serialize, Deserialize, Insertable, AsChangeset)]
#[diesel(table_name = blog_settings)]
pub struct TrackingSettings {
    pub duration_update_interval: i32,
    pub inactivity_threshold: i32,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            duration_update_interval: DEFAULT_DURATION_UPDATE_INTERVAL,
            inactivity_threshold: DEFAULT_INACTIVITY_THRESHOLD,
        }
    }
}

impl From<BlogSettings> for TrackingSettings {
    fn from(settings: BlogSettings) -> Self {
        Self {
            duration_update_interval: settings.duration_update_interval,
            inactivity_threshold: settings.inactivity_threshold,
        }
    }
}

impl TrackingSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_update_interval <= 0 {
            return Err("duration_update_interval must be positive".into());
        }
        if self.inactivity_threshold <= 0 {
            return Err("inactivity_threshold must be positive".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = blogs_data)]
pub struct BlogsData {
    pub id: i64,
    pub metadata: serde_json::Value,
    pub blogs: serde_json::Value,
    pub future_topics: serde_json::Value,
}

#[derive(Debug, Clone, Insertable, AsChangeset, Deserialize)]
#[diesel(table_name = blogs_data)]
pub struct BlogsDataInput {
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    #[serde(default = "empty_list")]
    pub blogs: serde_json::Value,
    #[serde(default = "empty_list")]
    pub future_topics: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tracker_expectations() {
        let settings = TrackingSettings::default();
        assert_eq!(settings.duration_update_interval, 300);
        assert_eq!(settings.inactivity_threshold, 120);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn non_positive_intervals_are_rejected() {
        let settings = TrackingSettings {
            duration_update_interval: 0,
            inactivity_threshold: 60,
        };
        assert!(settings.validate().is_err());
    }
}

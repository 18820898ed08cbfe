//! Portfolio data models.
//!
//! Each table has a `Queryable` row type and an input type that is both
//! `Insertable` and `AsChangeset`, so admin create and update share a body.

pub mod blog;
pub mod comment;
pub mod education;
pub mod engagement;
pub mod experience;
pub mod home;
pub mod media;
pub mod newsletter;
pub mod project;
pub mod research;
pub mod settings;

use serde_json::Value;

pub(crate) fn empty_list() -> Value {
    Value::Array(Vec::new())
}

pub(crate) fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

pub(crate) fn default_true() -> bool {
    true
}

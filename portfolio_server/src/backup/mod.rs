//! Backup and restore of all portfolio content.
//!
//! An export is a zip archive holding JSON fixtures per table, markdown
//! copies of every blog post, a mirror of the media directory, a manifest
//! with SHA-256 checksums and a README. Import reads the same layout back.

pub mod archive;
pub mod export;
pub mod fixture;
pub mod frontmatter;
pub mod import;
pub mod tables;

pub use export::export_portfolio_data;
pub use import::{import_portfolio_data, ImportReport};

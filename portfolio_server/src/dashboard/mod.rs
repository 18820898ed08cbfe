//! Admin dashboard queries.

pub mod stats;

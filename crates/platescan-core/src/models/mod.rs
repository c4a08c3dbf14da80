//! Data models: configuration and report submissions.

pub mod config;
pub mod report;

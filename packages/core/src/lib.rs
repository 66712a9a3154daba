// ABOUTME: Core constants and shared utilities for Opsdesk
// ABOUTME: Foundational package providing paths used across all Opsdesk packages

pub mod constants;

pub use constants::{database_file, opsdesk_dir};

//! CLI command implementations

pub mod classify;
pub mod discover;
pub mod fingerprint;
pub mod parse_manifest;

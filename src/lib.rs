//! portal-info - update metadata service for the desktop portal
//!
//! Serves a single authenticated endpoint describing the current portal
//! release (version, changelog, installer URL, checksum) plus a health check.
//! All release data comes from configuration loaded once at startup.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod resolver;
pub mod types;

pub use error::{Error, Result};

//! Command implementations for the fsnd CLI

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use anyhow::{Context, Result};

pub(crate) const NO_DATABASE: &str =
    "DATABASE_URL not set. Set via --database-url, the DATABASE_URL env var, or .env";

pub(crate) fn require_database_url(url: Option<String>) -> Result<String> {
    url.filter(|u| !u.trim().is_empty()).context(NO_DATABASE)
}

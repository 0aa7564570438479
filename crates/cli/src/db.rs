//! Database connection helper

use anyhow::{Context, Result};
use bom_persistence::Database;
use std::path::Path;

/// Open (creating if missing) the SQLite database at `path`.
pub async fn connect(path: &Path) -> Result<Database> {
    let url = format!("sqlite://{}", path.display());
    Database::connect(&url)
        .await
        .with_context(|| format!("failed to open database at {path:?}"))
}

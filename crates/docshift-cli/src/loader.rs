//! Loading schema and choice files.

use crate::error::CliError;
use docshift_core::{ChoiceSet, Table};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Load a JSON array of tables.
pub fn load_tables(path: &Path) -> Result<Vec<Table>, CliError> {
    let tables: Vec<Table> = load_json(path)?;
    debug!(path = %path.display(), tables = tables.len(), "schema loaded");
    Ok(tables)
}

/// Load a JSON array of relationship choices.
pub fn load_choices(path: &Path) -> Result<ChoiceSet, CliError> {
    let choices: ChoiceSet = load_json(path)?;
    debug!(path = %path.display(), choices = choices.len(), "choices loaded");
    Ok(choices)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

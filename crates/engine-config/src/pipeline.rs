//! Custom pipeline files: the same document a `plan` command prints, read
//! back so the statement text can be edited without rebuilding.

use crate::{
    env::EnvVars,
    settings::{ConfigFormat, error::SettingsError, read_document},
};
use model::execution::pipeline::Pipeline;
use std::path::Path;
use tracing::info;

pub fn load(path: impl AsRef<Path>, env: &EnvVars) -> Result<Pipeline, SettingsError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let pipeline = parse(&content, format, env)?;
    info!(
        "Loaded pipeline '{}' from {} ({} phase(s), {} statement(s))",
        pipeline.name(),
        path.display(),
        pipeline.phases().len(),
        pipeline.statement_count()
    );
    Ok(pipeline)
}

pub fn parse(content: &str, format: ConfigFormat, env: &EnvVars) -> Result<Pipeline, SettingsError> {
    let doc = read_document(content, format, env)?;
    let pipeline: Pipeline = serde_json::from_value(doc)?;

    pipeline
        .validate()
        .map_err(|err| SettingsError::InvalidValue {
            field: "pipeline",
            reason: err.to_string(),
        })?;

    Ok(pipeline)
}

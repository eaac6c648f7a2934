use connectors::{error::ConfigError, sql::base::error::ConnectorError};
use engine_config::settings::error::SettingsError;
use engine_runtime::error::PipelineError;
use planner::error::PlanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load the configuration: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid connection settings: {0}")]
    Connection(#[from] ConfigError),

    #[error("Failed to reach the warehouse: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Failed to build the pipeline: {0}")]
    Plan(#[from] PlanError),

    #[error("Failed to run the pipeline: {0}")]
    Runner(#[from] PipelineError),

    #[error("Failed to write the report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

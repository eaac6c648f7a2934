use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "us-west-2";

/// Object storage locations the staging tables are bulk-loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSources {
    /// Prefix holding the event log JSON files.
    pub log_data: String,
    /// JSONPaths file mapping event JSON onto staging columns.
    pub log_jsonpath: String,
    /// Prefix holding the song catalog JSON files.
    pub song_data: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

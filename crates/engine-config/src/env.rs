use crate::settings::error::SettingsError;
use std::{collections::HashMap, fs, path::Path};

/// Variables available to `${NAME}` references in the configuration:
/// the process environment, optionally overlaid with a `.env` file.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Snapshot of the process environment.
    pub fn from_system() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load variables from a .env file. File values win over the system ones.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.parse_env_content(&content)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), SettingsError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(SettingsError::EnvFile(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(SettingsError::EnvFile(format!(
                    "empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars
                .insert(key.to_string(), Self::unquote_value(value.trim()));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_env() {
        let mut env = EnvVars::empty();
        let content = r#"
# Comment
DWH_USER=loader
export DWH_HOST=warehouse.local
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("DWH_USER"), Some("loader"));
        assert_eq!(env.get("DWH_HOST"), Some("warehouse.local"));
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvVars::empty();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
WITH_EQUALS=a=b
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("single quoted"));
        assert_eq!(env.get("UNQUOTED"), Some("no_spaces"));
        assert_eq!(env.get("WITH_EQUALS"), Some("a=b"));
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvVars::empty();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
        assert!(env.parse_env_content("=value").is_err());
    }

    #[test]
    fn test_file_values_override_existing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "DWH_PASSWORD=from-file").unwrap();

        let mut env = EnvVars::empty();
        env.set("DWH_PASSWORD", "from-system");
        env.load_from_file(file.path()).unwrap();

        assert_eq!(env.get("DWH_PASSWORD"), Some("from-file"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let mut env = EnvVars::empty();
        let err = env.load_from_file("/definitely/not/here/.env").unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}

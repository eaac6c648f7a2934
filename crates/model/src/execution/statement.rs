use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    hash::{Hash, Hasher},
};

const DISPLAY_NAME_MAX_CHARS: usize = 60;

/// A single SQL statement as handed to the orchestrator.
///
/// The text is opaque: it is sent to the warehouse verbatim and never parsed.
/// Two specs with the same text are the same statement, regardless of label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementSpec {
    sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl StatementSpec {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            label: None,
        }
    }

    pub fn labeled(label: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            label: Some(label.into()),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Name used in log lines: the label when present, otherwise the
    /// statement text squashed onto one line and truncated.
    pub fn display_name(&self) -> Cow<'_, str> {
        if let Some(label) = &self.label {
            return Cow::Borrowed(label);
        }

        let squashed = self.sql.split_whitespace().collect::<Vec<_>>().join(" ");
        if squashed.chars().count() <= DISPLAY_NAME_MAX_CHARS {
            return Cow::Owned(squashed);
        }

        let mut truncated: String = squashed.chars().take(DISPLAY_NAME_MAX_CHARS).collect();
        truncated.push_str("...");
        Cow::Owned(truncated)
    }
}

impl PartialEq for StatementSpec {
    fn eq(&self, other: &Self) -> bool {
        self.sql == other.sql
    }
}

impl Eq for StatementSpec {}

impl Hash for StatementSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sql.hash(state);
    }
}

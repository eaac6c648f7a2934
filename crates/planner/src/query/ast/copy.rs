//! Defines the AST for bulk-load COPY statements.

use crate::query::ast::common::TableRef;

#[derive(Debug, Clone)]
pub struct Copy {
    pub table: TableRef,
    /// An object storage location such as `s3://bucket/prefix`.
    pub source: String,
    pub authorization: Option<CopyAuthorization>,
    pub format: Option<CopyFormat>,
    pub options: Vec<CopyOption>,
}

#[derive(Debug, Clone)]
pub enum CopyAuthorization {
    IamRole(String),
}

#[derive(Debug, Clone)]
pub enum CopyFormat {
    /// JSON input; columns are matched by key name.
    JsonAuto,
    /// JSON input mapped onto columns by a JSONPaths file.
    JsonPaths(String),
}

/// A trailing `KEY 'value'` option, e.g. `REGION 'us-west-2'`.
#[derive(Debug, Clone)]
pub struct CopyOption {
    pub key: String,
    pub value: Option<String>,
}

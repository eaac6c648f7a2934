use crate::query::ast::{
    common::TableRef,
    copy::{Copy, CopyAuthorization, CopyFormat, CopyOption},
};

#[derive(Debug, Clone)]
pub struct CopyBuilder {
    ast: Copy,
}

impl CopyBuilder {
    pub fn new(table: TableRef, source: &str) -> Self {
        Self {
            ast: Copy {
                table,
                source: source.to_string(),
                authorization: None,
                format: None,
                options: Vec::new(),
            },
        }
    }

    pub fn iam_role(mut self, role: &str) -> Self {
        self.ast.authorization = Some(CopyAuthorization::IamRole(role.to_string()));
        self
    }

    pub fn format(mut self, format: CopyFormat) -> Self {
        self.ast.format = Some(format);
        self
    }

    pub fn region(self, region: &str) -> Self {
        self.option("REGION", Some(region))
    }

    pub fn option(mut self, key: &str, value: Option<&str>) -> Self {
        self.ast.options.push(CopyOption {
            key: key.to_string(),
            value: value.map(|v| v.to_string()),
        });
        self
    }

    pub fn build(self) -> Copy {
        self.ast
    }
}

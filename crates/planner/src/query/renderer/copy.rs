use crate::query::ast::copy::{Copy, CopyAuthorization, CopyFormat};
use crate::query::renderer::{Render, Renderer};

impl Render for Copy {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("COPY ");
        r.render_table_ref(&self.table);

        r.sql.push_str(" FROM ");
        r.push_literal(&self.source);

        if let Some(CopyAuthorization::IamRole(role)) = &self.authorization {
            r.sql.push_str(" IAM_ROLE ");
            r.push_literal(role);
        }

        match &self.format {
            Some(CopyFormat::JsonAuto) => r.sql.push_str(" JSON 'auto'"),
            Some(CopyFormat::JsonPaths(path)) => {
                r.sql.push_str(" JSON ");
                r.push_literal(path);
            }
            None => {}
        }

        for option in &self.options {
            r.sql.push(' ');
            r.sql.push_str(&option.key);
            if let Some(value) = &option.value {
                r.sql.push(' ');
                r.push_literal(value);
            }
        }

        r.sql.push(';');
    }
}

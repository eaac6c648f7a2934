use crate::{env::EnvVars, settings::error::SettingsError};
use serde_json::Value;

/// Keys whose string values are SQL. Dollar-quoted bodies in them reach the
/// warehouse untouched, so `$$` is kept as written.
const SQL_KEYS: &[&str] = &["sql"];

/// Replaces `${NAME}` references in every string of the document.
/// `$$` escapes a literal dollar sign, except under a `sql` key.
pub fn interpolate(value: &mut Value, env: &EnvVars) -> Result<(), SettingsError> {
    walk(value, env, Dollars::Collapse)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dollars {
    Collapse,
    Keep,
}

fn walk(value: &mut Value, env: &EnvVars, dollars: Dollars) -> Result<(), SettingsError> {
    match value {
        Value::String(s) => {
            if s.contains('$') {
                *s = expand(s, env, dollars)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, env, dollars)?;
            }
        }
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                let dollars = if SQL_KEYS.contains(&key.as_str()) {
                    Dollars::Keep
                } else {
                    dollars
                };
                walk(item, env, dollars)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn expand(input: &str, env: &EnvVars, dollars: Dollars) -> Result<String, SettingsError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];

        if let Some(after) = tail.strip_prefix('$') {
            out.push('$');
            if dollars == Dollars::Keep {
                out.push('$');
            }
            rest = after;
        } else if let Some(body) = tail.strip_prefix('{') {
            let end = body
                .find('}')
                .ok_or_else(|| SettingsError::UnterminatedVariable(input.to_string()))?;
            let name = &body[..end];
            let resolved = env
                .get(name)
                .ok_or_else(|| SettingsError::UnsetVariable(name.to_string()))?;
            out.push_str(resolved);
            rest = &body[end + 1..];
        } else {
            out.push('$');
            rest = tail;
        }
    }

    out.push_str(rest);
    Ok(out)
}

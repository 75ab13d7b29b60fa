//! `{field}` substitution for endpoint templates.
//!
//! ```text
//! https://{bucket}.s3.{region}.amazonaws.com  ->  https://site.s3.eu-west-1.amazonaws.com
//! ```
//!
//! Only single-brace placeholders are recognised; there is no escaping.

use crate::error::ConfigError;

/// Configuration fields that may appear as placeholders.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFields<'a> {
    pub bucket: &'a str,
    pub region: &'a str,
    pub prefix: &'a str,
}

impl<'a> TemplateFields<'a> {
    /// Value for a placeholder name, `None` when the name is not a known field.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        match name {
            "bucket" => Some(self.bucket),
            "region" => Some(self.region),
            "prefix" => Some(self.prefix),
            _ => None,
        }
    }
}

/// Replace every `{name}` in `template` with its value from `fields`.
///
/// Fails on an unclosed `{`, a stray `}`, an empty `{}`, or a placeholder
/// that is unknown or resolves to an empty string.
pub fn render(template: &str, fields: &TemplateFields<'_>) -> Result<String, ConfigError> {
    let malformed = |reason| ConfigError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        let (literal, tail) = rest.split_at(pos);
        out.push_str(literal);
        if tail.starts_with('}') {
            return Err(malformed("unmatched '}'"));
        }

        let body = &tail[1..];
        let close = body.find('}').ok_or_else(|| malformed("unclosed '{'"))?;
        let name = &body[..close];
        if name.contains('{') {
            return Err(malformed("nested '{'"));
        }
        if name.trim().is_empty() {
            return Err(malformed("empty placeholder"));
        }

        match fields.get(name.trim()) {
            Some(value) if !value.is_empty() => out.push_str(value),
            _ => {
                return Err(ConfigError::UnresolvedPlaceholder {
                    placeholder: name.to_string(),
                })
            }
        }
        rest = &body[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

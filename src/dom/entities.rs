//! Internal DTD subset entities
//!
//! Only general entities with a quoted literal value are recorded; external
//! and parameter entities are skipped. The first declaration of a name wins.
//! Replacement text is expanded once, when the DOCTYPE is read, so lookups
//! during parsing are plain map reads.

use crate::error::ParseError;
use quick_xml::escape::resolve_predefined_entity;
use std::collections::HashMap;

/// Upper bound on the replacement text of a single entity
const MAX_REPLACEMENT: usize = 1 << 20;

#[derive(Debug, Default)]
pub(crate) struct EntityTable {
    expanded: HashMap<String, String>,
}

impl EntityTable {
    /// Collect and expand the entity declarations of a DOCTYPE body
    pub(crate) fn from_doctype(doctype: &str) -> Result<Self, ParseError> {
        let declared = declarations(doctype);
        let mut table = EntityTable::default();
        let mut in_progress = Vec::new();
        for name in declared.keys() {
            table.expand(name, &declared, &mut in_progress)?;
        }
        Ok(table)
    }

    /// Replacement text for `name`: declared entities first, then the predefined five
    pub(crate) fn lookup(&self, name: &str) -> Option<&str> {
        self.expanded
            .get(name)
            .map(String::as_str)
            .or_else(|| resolve_predefined_entity(name))
    }

    /// Append the replacement text of `&name;` to `out`
    pub(crate) fn resolve(&self, name: &str, out: &mut String) -> Result<(), ParseError> {
        if let Some(code) = name.strip_prefix('#') {
            out.push(char_reference(code)?);
            return Ok(());
        }
        let replacement = self
            .lookup(name)
            .ok_or_else(|| ParseError::structure(format!("undefined entity &{name};")))?;
        out.push_str(replacement);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.expanded.len()
    }

    fn expand(
        &mut self,
        name: &str,
        declared: &HashMap<String, String>,
        in_progress: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        if self.expanded.contains_key(name) {
            return Ok(());
        }
        if in_progress.iter().any(|n| n == name) {
            return Err(ParseError::structure(format!(
                "entity &{name}; references itself"
            )));
        }
        let Some(raw) = declared.get(name) else {
            return Ok(());
        };

        in_progress.push(name.to_string());
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw.as_str();
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let end = after.find(';').ok_or_else(|| {
                ParseError::structure(format!("unterminated reference in entity &{name};"))
            })?;
            let reference = &after[..end];
            if declared.contains_key(reference) {
                self.expand(reference, declared, in_progress)?;
                if let Some(text) = self.expanded.get(reference) {
                    out.push_str(text);
                }
            } else {
                self.resolve(reference, &mut out)?;
            }
            if out.len() > MAX_REPLACEMENT {
                return Err(ParseError::structure(format!(
                    "entity &{name}; expands beyond {MAX_REPLACEMENT} bytes"
                )));
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        in_progress.pop();

        self.expanded.insert(name.to_string(), out);
        Ok(())
    }
}

fn char_reference(code: &str) -> Result<char, ParseError> {
    let parsed = match code.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => code.parse::<u32>(),
    };
    parsed
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| ParseError::structure(format!("invalid character reference &#{code};")))
}

/// Raw literal values of `<!ENTITY name "value">` declarations
fn declarations(doctype: &str) -> HashMap<String, String> {
    const KEYWORD: &str = "<!ENTITY";

    let mut found = HashMap::new();
    let mut rest = doctype;
    while let Some(start) = rest.find(KEYWORD) {
        rest = &rest[start + KEYWORD.len()..];
        let body = rest.trim_start_matches(is_space);
        if body.starts_with('%') {
            continue;
        }
        let name_end = body.find(is_space).unwrap_or(body.len());
        let name = &body[..name_end];
        let after = body[name_end..].trim_start_matches(is_space);
        let Some(quote) = after.chars().next().filter(|&c| c == '"' || c == '\'') else {
            continue;
        };
        let literal = &after[1..];
        let Some(close) = literal.find(quote) else {
            break;
        };
        if !name.is_empty() && resolve_predefined_entity(name).is_none() {
            found
                .entry(name.to_string())
                .or_insert_with(|| literal[..close].to_string());
        }
        rest = &literal[close + 1..];
    }
    found
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

//! Struct-tag grammar.
//!
//! Tags use the conventional `key:"value" key:"value"` layout. The values of a
//! few keys carry their own small languages:
//!
//! - `gork:"name"` / `json:"name,options"` give the external field name
//! - `openapi:"name,in=query"` marks a route parameter
//! - `openapi:"discriminator=value"` marks a union variant's discriminator
//! - `validate:"rule,rule=value"` lists validation rules
//! - `rule:"name(args), ..."` is the rule DSL, parsed in [`crate::rules`]

use crate::reflect::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Borrowed view over a raw struct tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Value stored under `key`, unquoted. A malformed tail ends the scan.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            let name_end = rest
                .char_indices()
                .find(|&(_, c)| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            if name_end == 0 || !rest[name_end..].starts_with(":\"") {
                return None;
            }
            let name = &rest[..name_end];
            rest = &rest[name_end + 1..];

            // `rest` starts at the opening quote
            let mut chars = rest.char_indices().skip(1);
            let mut close = None;
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '"' => {
                        close = Some(i);
                        break;
                    }
                    _ => {}
                }
            }
            let close = close?;
            let quoted = &rest[1..close];
            rest = &rest[close + 1..];

            if name == key {
                return Some(unquote(quoted));
            }
        }
    }

    /// Whether the tag carries `key` at all
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn unquote(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// External name of a field: `gork` tag, then the first `json` segment, then the field name.
/// `None` when the field is excluded with `json:"-"`.
pub fn wire_name(field: &Field) -> Option<String> {
    let tag = field.tag();
    if let Some(name) = tag.get("gork").filter(|name| !name.is_empty()) {
        return Some(name);
    }
    if let Some(json) = tag.get("json") {
        if json == "-" {
            return None;
        }
        let name = json.split(',').next().unwrap_or_default();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    Some(field.name().to_string())
}

/// Name a section field is bound under: the `openapi` parameter name when the
/// field carries one, otherwise its wire name
pub fn param_name(field: &Field) -> Option<String> {
    match field.tag().get("openapi").and_then(|value| parse_param_tag(&value)) {
        Some(param) => Some(param.name),
        None => wire_name(field),
    }
}

/// Whether the field names itself through a `gork` or `json` tag
pub fn has_explicit_name(field: &Field) -> bool {
    let tag = field.tag();
    tag.get("gork").map(|name| !name.is_empty()).unwrap_or(false)
        || tag
            .get("json")
            .map(|json| !json.split(',').next().unwrap_or_default().is_empty())
            .unwrap_or(false)
}

/// Where a route parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `openapi:"name,in=location"` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTag {
    pub name: String,
    pub location: ParamLocation,
}

/// Parse the value of an `openapi` tag as a parameter marker.
/// A missing or empty `in=` part, or an unknown location, means "not a parameter".
pub fn parse_param_tag(value: &str) -> Option<ParamTag> {
    let mut parts = value.split(',').map(str::trim);
    let name = parts.next().filter(|name| !name.is_empty() && !name.contains('='))?;
    let location = parts
        .find_map(|part| part.strip_prefix("in="))
        .filter(|location| !location.is_empty())
        .and_then(ParamLocation::parse)?;
    Some(ParamTag {
        name: name.to_string(),
        location,
    })
}

/// Value of `discriminator=<value>` inside an `openapi` tag
pub fn discriminator_value(value: &str) -> Option<String> {
    value
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("discriminator="))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// One `key` or `key=value` entry of a `validate` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateRule<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// Split a `validate` tag into its rules, dropping blank entries
pub fn parse_validate_rules(tag: &str) -> Vec<ValidateRule<'_>> {
    tag.split(',')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .map(|rule| match rule.split_once('=') {
            Some((key, value)) => ValidateRule {
                key: key.trim(),
                value: Some(value.trim()),
            },
            None => ValidateRule {
                key: rule,
                value: None,
            },
        })
        .collect()
}

//! The rule-invocation DSL: `rule:"name(arg, 'quoted, arg'), other(1, nested(2))"`.
//!
//! Splitting is a small state machine over the characters of the input that
//! tracks the open quote (if any) and parenthesis depth. Separators only count
//! at depth zero outside quotes. Arguments are kept as opaque text: a nested
//! invocation inside an argument list is not parsed further.

use crate::error::TagParseError;
use serde::Serialize;

/// One `name(args...)` entry of a rule tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInvocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Split `input` on `separator` wherever the separator sits at nesting depth zero
/// and outside quotes. Segments are returned untrimmed.
pub fn split_top_level(input: &str, separator: char) -> Result<Vec<String>, TagParseError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (position, c) in input.char_indices() {
        if let Some(open) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                if depth == 0 {
                    return Err(TagParseError::UnbalancedParens { position });
                }
                depth -= 1;
                current.push(c);
            }
            c if c == separator && depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }

    if let Some(open) = quote {
        return Err(TagParseError::UnterminatedQuote { quote: open });
    }
    segments.push(current);
    Ok(segments)
}

/// Parse a rule tag into its invocations. Blank segments are dropped.
pub fn parse_rule_invocations(input: &str) -> Result<Vec<RuleInvocation>, TagParseError> {
    split_top_level(input, ',')?
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .map(parse_invocation)
        .collect()
}

fn parse_invocation(segment: &str) -> Result<RuleInvocation, TagParseError> {
    let Some(open) = segment.find('(') else {
        return Ok(RuleInvocation {
            name: check_name(segment, segment)?.to_string(),
            args: Vec::new(),
        });
    };

    let name = check_name(segment[..open].trim(), segment)?;
    let inner = segment[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| TagParseError::MalformedInvocation(segment.to_string()))?;

    let args = split_top_level(inner, ',')?
        .into_iter()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect();

    Ok(RuleInvocation {
        name: name.to_string(),
        args,
    })
}

fn check_name<'a>(name: &'a str, segment: &str) -> Result<&'a str, TagParseError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    if valid {
        Ok(name)
    } else {
        Err(TagParseError::MalformedInvocation(segment.to_string()))
    }
}

impl RuleInvocation {
    /// Arguments with one layer of surrounding quotes removed
    pub fn unquoted_args(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(|arg| {
                let arg = arg.as_str();
                for quote in ['\'', '"'] {
                    if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
                        return &arg[1..arg.len() - 1];
                    }
                }
                arg
            })
            .collect()
    }
}

//! `${name}`, `${name/pattern/replacement}` and `${name//pattern/replacement}`
//! resolution against a variable map.

use super::error::SubstitutionError;
use crate::shared::ids::is_identifier_char;
use regex::Regex;
use std::collections::BTreeMap;

pub type SubstitutionMap = BTreeMap<String, String>;

struct Token {
    name: String,
    modifier: Option<Modifier>,
}

struct Modifier {
    pattern: String,
    replacement: String,
    replace_all: bool,
}

/// Resolves every token in `text`. Each token sees the variable's value as
/// stored in the map; resolved output is never rescanned.
pub fn resolve(text: &str, variables: &SubstitutionMap) -> Result<String, SubstitutionError> {
    let mut rendered = String::with_capacity(text.len());
    let mut cursor = text;

    while let Some(start) = cursor.find("${") {
        rendered.push_str(&cursor[..start]);
        let (token, consumed) = parse_token(&cursor[start + 2..], text)?;
        let value = variables
            .get(&token.name)
            .ok_or_else(|| SubstitutionError::MissingSubstitution {
                name: token.name.clone(),
            })?;
        match token.modifier {
            Some(modifier) => rendered.push_str(&apply_modifier(value, &modifier)?),
            None => rendered.push_str(value),
        }
        cursor = &cursor[start + 2 + consumed..];
    }

    rendered.push_str(cursor);
    Ok(rendered)
}

pub fn resolve_all(
    tokens: &[String],
    variables: &SubstitutionMap,
) -> Result<Vec<String>, SubstitutionError> {
    tokens.iter().map(|token| resolve(token, variables)).collect()
}

/// Parses the token body after `${`. Returns the token and the number of
/// bytes consumed, closing brace included.
fn parse_token(body: &str, text: &str) -> Result<(Token, usize), SubstitutionError> {
    let malformed = |reason: &str| SubstitutionError::Malformed {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let name_end = body
        .find(|ch: char| !is_identifier_char(ch))
        .ok_or_else(|| malformed("missing closing `}`"))?;
    let name = &body[..name_end];
    if name.is_empty() {
        return Err(malformed("empty variable name"));
    }

    let rest = &body[name_end..];
    if rest.starts_with('}') {
        return Ok((
            Token {
                name: name.to_string(),
                modifier: None,
            },
            name_end + 1,
        ));
    }
    let Some(after_slash) = rest.strip_prefix('/') else {
        return Err(malformed("expected `}` or `/` after variable name"));
    };
    let (replace_all, pattern_start) = match after_slash.strip_prefix('/') {
        Some(after) => (true, after),
        None => (false, after_slash),
    };

    let (pattern, pattern_len) =
        take_until(pattern_start, '/').ok_or_else(|| malformed("missing replacement"))?;
    let replacement_start = &pattern_start[pattern_len + 1..];
    let (replacement, replacement_len) =
        take_until(replacement_start, '}').ok_or_else(|| malformed("missing closing `}`"))?;

    let consumed = body.len() - replacement_start.len() + replacement_len + 1;
    Ok((
        Token {
            name: name.to_string(),
            modifier: Some(Modifier {
                pattern: unescape(pattern),
                replacement: unescape(replacement),
                replace_all,
            }),
        },
        consumed,
    ))
}

/// Raw text up to the first unescaped `delimiter`, and its byte length.
fn take_until(text: &str, delimiter: char) -> Option<(&str, usize)> {
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == delimiter {
            return Some((&text[..index], index));
        }
    }
    None
}

/// One pass: `\x` becomes `x`.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn apply_modifier(value: &str, modifier: &Modifier) -> Result<String, SubstitutionError> {
    let regex =
        Regex::new(&modifier.pattern).map_err(|source| SubstitutionError::InvalidPattern {
            pattern: modifier.pattern.clone(),
            source,
        })?;
    let replaced = if modifier.replace_all {
        regex.replace_all(value, modifier.replacement.as_str())
    } else {
        regex.replacen(value, 1, modifier.replacement.as_str())
    };
    Ok(replaced.into_owned())
}

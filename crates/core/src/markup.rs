//! Parser for the restricted indentation-based ghost document format.
//!
//! The format is a small subset of the familiar indented markup style:
//! mappings (`key: value`), sequences (`- item`), nested blocks at
//! indent+2, comments (`#`), and a handful of scalar forms. Parsing is
//! recursive descent driven purely by measured leading-space width; each
//! block parse takes an explicit `(lines, start, indent)` cursor and returns
//! the next unconsumed line index, so no mutable cursor is shared across
//! nested calls.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::value::Value;

/// Parses a document into a [`Value`] tree.
///
/// An empty (or all-comment) document parses to an empty mapping.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let (doc, _) = parse_block(&lines, 0, 0)?;
    Ok(doc)
}

#[derive(Clone, Copy, PartialEq)]
enum BlockKind {
    Sequence,
    Mapping,
}

fn parse_block(
    lines: &[&str],
    start: usize,
    indent: usize,
) -> Result<(Value, usize), ParseError> {
    let mut items: Vec<Value> = Vec::new();
    let mut entries: BTreeMap<String, Value> = BTreeMap::new();
    let mut kind: Option<BlockKind> = None;
    let mut index = start;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            index += 1;
            continue;
        }
        let width = line.len() - line.trim_start_matches(' ').len();
        if width < indent {
            // Dedent: this line belongs to an ancestor block. If no ancestor
            // opened this level, the ancestor's own width check rejects it.
            break;
        }
        if width > indent {
            return Err(ParseError::Indentation { line: index + 1 });
        }

        // A lone `-` is an item whose trailing content was only whitespace.
        let item_rest = if trimmed == "-" {
            Some("")
        } else {
            trimmed.strip_prefix("- ")
        };
        if let Some(rest) = item_rest {
            match kind {
                None => kind = Some(BlockKind::Sequence),
                Some(BlockKind::Mapping) => {
                    return Err(ParseError::MixedBlock { line: index + 1 })
                }
                Some(BlockKind::Sequence) => {}
            }
            let content = rest.trim();
            if content.is_empty() {
                let (child, next) = parse_block(lines, index + 1, indent + 2)?;
                items.push(child);
                index = next;
                continue;
            }
            if content.contains(':') {
                let (key, inline) = split_entry(content, index + 1)?;
                let mut entry = BTreeMap::new();
                match inline {
                    Some(raw) => {
                        entry.insert(key, decode_scalar(raw));
                        index += 1;
                    }
                    None => {
                        let (child, next) = parse_block(lines, index + 1, indent + 2)?;
                        entry.insert(key, child);
                        index = next;
                    }
                }
                items.push(Value::Map(entry));
                continue;
            }
            items.push(decode_scalar(content));
            index += 1;
            continue;
        }

        match kind {
            None => kind = Some(BlockKind::Mapping),
            Some(BlockKind::Sequence) => {
                return Err(ParseError::MixedBlock { line: index + 1 })
            }
            Some(BlockKind::Mapping) => {}
        }
        let (key, inline) = split_entry(trimmed, index + 1)?;
        match inline {
            Some(raw) => {
                entries.insert(key, decode_scalar(raw));
                index += 1;
            }
            None => {
                let (child, next) = parse_block(lines, index + 1, indent + 2)?;
                entries.insert(key, child);
                index = next;
            }
        }
    }

    let block = match kind {
        Some(BlockKind::Sequence) => Value::List(items),
        _ => Value::Map(entries),
    };
    Ok((block, index))
}

/// Splits `key: value` at the first colon. `Ok((key, None))` means the value
/// is empty, i.e. a nested block follows.
fn split_entry(text: &str, line: usize) -> Result<(String, Option<&str>), ParseError> {
    let Some((key, remainder)) = text.split_once(':') else {
        return Err(ParseError::MissingColon {
            line,
            text: text.to_string(),
        });
    };
    let value = remainder.trim();
    if value.is_empty() {
        Ok((key.trim().to_string(), None))
    } else {
        Ok((key.trim().to_string(), Some(value)))
    }
}

/// Decodes one scalar token.
///
/// Quoted text strips its quotes verbatim, `true`/`false` are
/// case-insensitive booleans, an optionally-signed all-digit token is an
/// integer, `[...]` is an inline list, and everything else is raw text.
fn decode_scalar(raw: &str) -> Value {
    if raw.starts_with('[') && raw.ends_with(']') && raw.len() >= 2 {
        return decode_inline_list(&raw[1..raw.len() - 1]);
    }
    if raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')))
    {
        return Value::Text(raw[1..raw.len() - 1].to_string());
    }
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
    }
    Value::Text(raw.to_string())
}

/// Splits an inline `[...]` body on commas, honoring quote state so commas
/// inside quoted pieces do not split.
fn decode_inline_list(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::List(Vec::new());
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in raw.chars() {
        match c {
            '\'' | '"' => {
                match quote {
                    None => quote = Some(c),
                    Some(q) if q == c => quote = None,
                    Some(_) => {}
                }
                current.push(c);
            }
            ',' if quote.is_none() => {
                items.push(decode_scalar(current.trim()));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        items.push(decode_scalar(current.trim()));
    }
    Value::List(items)
}

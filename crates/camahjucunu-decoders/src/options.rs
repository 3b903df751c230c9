//! Option-string and column helpers shared by the table consumers.
//!
//! Option cells hold `key=value` lists: `sim_coeff=25,std_coeff=25` or
//! `tag="a,b",mode='x'`. Quotes protect commas; the last occurrence of a key
//! wins. `-` marks an intentionally empty value.

use indexmap::IndexMap;

use crate::error::DecodeError;
use crate::tables::{Row, ROW_ID_COLUMN};

fn trimmed(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

fn strip_matching_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Parse a `key=value, key2="v,w"` option list. Quote-aware; last key wins.
pub fn parse_kv(s: &str) -> Result<IndexMap<String, String>, DecodeError> {
    let mut kv = IndexMap::new();
    if s.is_empty() || s == "-" {
        return Ok(kv);
    }

    let mut items: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in s.chars() {
        match quote {
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                current.push(c);
            }
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            None if c == ',' => {
                items.push(trimmed(&current).to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        items.push(trimmed(&current).to_string());
    }

    for item in items {
        if item.is_empty() {
            continue;
        }
        let Some(eq) = item.find('=') else {
            return Err(DecodeError::structure(format!(
                "invalid option entry (missing '='): {item}"
            )));
        };
        let key = trimmed(&item[..eq]).to_string();
        let value = strip_matching_quotes(trimmed(&item[eq + 1..])).to_string();
        if key.is_empty() {
            return Err(DecodeError::structure(format!(
                "invalid option key (empty) in: {item}"
            )));
        }
        kv.insert(key, value);
    }
    Ok(kv)
}

/// A column that must be present with a non-empty, non-`-` value.
pub fn require_column<'r>(row: &'r Row, key: &str) -> Result<&'r str, DecodeError> {
    let value = row
        .get(key)
        .ok_or_else(|| DecodeError::structure(format!("missing required column: {key}")))?;
    if value.is_empty() || value.as_str() == "-" {
        return Err(DecodeError::structure(format!(
            "empty/invalid value for column: {key}"
        )));
    }
    Ok(value)
}

/// A specific option inside the row's `options` column.
pub fn require_option(row: &Row, key: &str) -> Result<String, DecodeError> {
    let kv = parse_kv(require_column(row, "options")?)?;
    match kv.get(key) {
        Some(value) if !value.is_empty() && value.as_str() != "-" => Ok(value.clone()),
        Some(_) => Err(DecodeError::structure(format!(
            "empty/invalid value for option: {key}"
        ))),
        None => Err(DecodeError::structure(format!(
            "missing required option: {key}"
        ))),
    }
}

/// First usable value among `aliases`. The error names the row for context.
pub fn require_any_option(row: &Row, aliases: &[&str]) -> Result<String, DecodeError> {
    let kv = parse_kv(require_column(row, "options")?)?;
    for alias in aliases {
        if let Some(value) = kv.get(*alias) {
            if !value.is_empty() && value.as_str() != "-" {
                return Ok(value.clone());
            }
        }
    }
    Err(DecodeError::structure(format!(
        "missing required option (any of): {}{}",
        aliases.join(", "),
        row_context(row)
    )))
}

/// Validate the option keys against `expected` exactly. Entries may be alias
/// groups (`"epsilon|eps"`): one alias of each group must be usable, and no
/// key outside the groups may appear.
pub fn validate_options_exact(row: &Row, expected: &[&str]) -> Result<(), DecodeError> {
    let kv = parse_kv(require_column(row, "options")?)?;

    let mut allowed: Vec<&str> = Vec::new();
    let mut missing: Vec<&str> = Vec::new();
    for group in expected {
        let aliases: Vec<&str> = group.split('|').map(str::trim).collect();
        allowed.extend(aliases.iter());
        let found = aliases
            .iter()
            .any(|a| matches!(kv.get(*a), Some(v) if !v.is_empty() && v.as_str() != "-"));
        if !found {
            missing.push(group);
        }
    }

    let extras: Vec<&str> = kv
        .keys()
        .map(String::as_str)
        .filter(|k| !allowed.contains(k))
        .collect();

    if missing.is_empty() && extras.is_empty() {
        return Ok(());
    }
    Err(DecodeError::structure(format!(
        "options mismatch{}. missing: [{}]. unexpected: [{}].",
        row_context(row),
        missing.join(", "),
        extras.join(", ")
    )))
}

/// The row's column names must equal `expected` exactly; every expected
/// column must also carry a usable value.
pub fn require_columns_exact(row: &Row, expected: &[&str]) -> Result<(), DecodeError> {
    let missing: Vec<&&str> = expected.iter().filter(|k| !row.contains_key(**k)).collect();
    let extras: Vec<&str> = row
        .keys()
        .map(String::as_str)
        .filter(|k| !expected.contains(k))
        .collect();
    if !missing.is_empty() || !extras.is_empty() {
        return Err(DecodeError::structure(format!(
            "column set mismatch{}. missing: [{}]. unexpected: [{}].",
            row_context(row),
            missing
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            extras.join(", ")
        )));
    }
    for key in expected {
        require_column(row, key)?;
    }
    Ok(())
}

fn row_context(row: &Row) -> String {
    match row.get(ROW_ID_COLUMN) {
        Some(id) => format!(" [{ROW_ID_COLUMN}={id}]"),
        None => String::new(),
    }
}

pub fn to_f64(s: &str) -> Result<f64, DecodeError> {
    s.trim()
        .parse()
        .map_err(|_| DecodeError::structure(format!("invalid float: {s}")))
}

pub fn to_i64(s: &str) -> Result<i64, DecodeError> {
    s.trim()
        .parse()
        .map_err(|_| DecodeError::structure(format!("invalid integer: {s}")))
}

pub fn to_bool(s: &str) -> Result<bool, DecodeError> {
    match s.trim() {
        "true" | "True" | "TRUE" | "1" => Ok(true),
        "false" | "False" | "FALSE" | "0" => Ok(false),
        other => Err(DecodeError::structure(format!("invalid bool: {other}"))),
    }
}

pub fn to_i64_list(s: &str) -> Result<Vec<i64>, DecodeError> {
    let out: Vec<i64> = s
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(to_i64)
        .collect::<Result<_, _>>()?;
    if out.is_empty() {
        return Err(DecodeError::structure(format!(
            "invalid integer list CSV: {s}"
        )));
    }
    Ok(out)
}

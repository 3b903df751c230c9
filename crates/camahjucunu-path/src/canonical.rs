//! Canonical-path decoder.
//!
//! `path := segments ( "(" args ")" )? ( "@" directive ":" kind )?`
//!
//! Legacy aliases are rejected with exact error strings; ok results carry the
//! canonicalized identity/endpoint and their hashimyei names.

use serde::{Deserialize, Serialize};

use crate::directive::{
    parse_directive_id, parse_tsi_type_id, payload_kind_from_token, type_accepts_endpoint,
};
use crate::identity::{canonical_identity_provider, is_hex_hash_name, split_model_hash_suffix};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    /// Plain dotted identity.
    #[default]
    Node,
    /// Identity with a call-argument list.
    Call,
    /// Identity addressed through an `@directive:kind` endpoint.
    Endpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPathArg {
    pub key: String,
    pub value: String,
}

/// Decoded canonical path. `ok == false` leaves `error` holding the first
/// violation; all other fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPath {
    pub ok: bool,
    pub raw: String,
    pub segments: Vec<String>,
    pub args: Vec<CanonicalPathArg>,
    pub directive: String,
    pub kind: String,
    pub hashimyei_id: String,
    pub path_kind: PathKind,
    pub canonical_identity: String,
    pub canonical_endpoint: String,
    pub canonical: String,
    pub identity_hash_name: String,
    pub endpoint_hash_name: String,
    pub error: String,
}

/// Canonical-path validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PathError(pub String);

fn is_atom_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_valid_atom(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_atom_char)
}

fn sanitize_atom(s: &str) -> String {
    let out: String = s
        .chars()
        .map(|c| if is_atom_char(c) { c } else { '_' })
        .collect();
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

fn sanitize_value(s: &str) -> String {
    let out: String = s
        .chars()
        .map(|c| {
            let keep = c.is_ascii_alphanumeric()
                || matches!(c, '_' | '.' | '-' | ':' | '/' | '@');
            if keep {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "empty".to_string()
    } else {
        out
    }
}

struct ParsedEndpoint {
    present: bool,
    directive: String,
    kind: String,
}

fn parse_endpoint_suffix(text: &str) -> Result<ParsedEndpoint, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(ParsedEndpoint {
            present: false,
            directive: String::new(),
            kind: String::new(),
        });
    }

    let Some(colon) = text.rfind(':') else {
        return Err("endpoint requires @directive:kind".to_string());
    };
    if colon == 0 || colon + 1 >= text.len() {
        return Err("endpoint requires @directive:kind".to_string());
    }

    let directive = parse_directive_id(&text[..colon])
        .ok_or_else(|| "invalid directive in endpoint suffix".to_string())?;
    let kind = payload_kind_from_token(&text[colon + 1..])
        .map(crate::directive::kind_token)
        .ok_or_else(|| "invalid kind in endpoint suffix".to_string())?;

    Ok(ParsedEndpoint {
        present: true,
        directive: directive.to_string(),
        kind: kind.to_string(),
    })
}

struct ParsedCore {
    path_text: String,
    args_text: String,
    endpoint_text: String,
    has_call: bool,
}

fn split_core(input: &str) -> Result<ParsedCore, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty path expression".to_string());
    }

    let chars: Vec<char> = input.chars().collect();
    let mut at: Option<usize> = None;
    let mut depth = 0i32;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err("unbalanced ')'".to_string());
                }
            }
            '@' if depth == 0 => at = Some(i),
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced parentheses".to_string());
    }

    let (core, endpoint_text) = match at {
        Some(i) => (
            chars[..i].iter().collect::<String>().trim().to_string(),
            chars[i + 1..].iter().collect::<String>().trim().to_string(),
        ),
        None => (input.to_string(), String::new()),
    };

    let Some(lp) = core.find('(') else {
        let path_text = core.trim().to_string();
        if path_text.is_empty() {
            return Err("missing base path".to_string());
        }
        return Ok(ParsedCore {
            path_text,
            args_text: String::new(),
            endpoint_text,
            has_call: false,
        });
    };

    let mut call_depth = 0i32;
    let mut rp: Option<usize> = None;
    for (i, c) in core.char_indices() {
        if i < lp {
            continue;
        }
        match c {
            '(' => call_depth += 1,
            ')' => {
                call_depth -= 1;
                if call_depth == 0 {
                    rp = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(rp) = rp else {
        return Err("missing ')' for call suffix".to_string());
    };

    if !core[rp + 1..].trim().is_empty() {
        return Err("unexpected trailing text after call".to_string());
    }

    let path_text = core[..lp].trim().to_string();
    if path_text.is_empty() {
        return Err("missing callable path".to_string());
    }
    Ok(ParsedCore {
        path_text,
        args_text: core[lp + 1..rp].trim().to_string(),
        endpoint_text,
        has_call: true,
    })
}

fn parse_args(text: &str) -> Result<Vec<CanonicalPathArg>, String> {
    let mut out = Vec::new();
    let text = text.trim();
    if text.is_empty() {
        return Ok(out);
    }
    for token in text.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let arg = match token.split_once('=') {
            Some((key, value)) => CanonicalPathArg {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => CanonicalPathArg {
                key: token.to_string(),
                value: String::new(),
            },
        };
        if !is_valid_atom(&arg.key) {
            return Err(format!("invalid argument key: {}", arg.key));
        }
        out.push(arg);
    }
    Ok(out)
}

fn canonical_args(args: &[CanonicalPathArg]) -> String {
    args.iter()
        .map(|arg| {
            if arg.value.is_empty() {
                arg.key.clone()
            } else {
                format!("{}={}", arg.key, arg.value)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn unpack_fused_wikimyei_model_hash(segments: &mut Vec<String>) -> bool {
    if segments.len() != 4 {
        return false;
    }
    let Some((model, hash)) = split_model_hash_suffix(&segments[3]) else {
        return false;
    };
    segments[3] = model;
    segments.push(hash);
    true
}

fn canonicalize_segments(segments: &mut Vec<String>, hashimyei: &mut String) -> Result<(), String> {
    if segments.is_empty() {
        return Err("missing path segments".to_string());
    }
    for segment in segments.iter() {
        if !is_valid_atom(segment) {
            return Err(format!("invalid path segment: {segment}"));
        }
    }

    if segments.len() >= 3
        && segments[0] == "tsi"
        && segments[1] == "wave"
        && segments[2] == "generator"
    {
        return Err("legacy alias 'tsi.wave.generator' is removed; use 'board.wave'".to_string());
    }
    if segments.len() >= 4
        && segments[0] == "tsi"
        && segments[1] == "wikimyei"
        && segments[2] == "wave"
        && segments[3] == "generator"
    {
        return Err(
            "legacy alias 'tsi.wikimyei.wave.generator' is removed; use 'board.wave'".to_string(),
        );
    }
    if segments.len() >= 3
        && segments[0] == "tsi"
        && segments[1] == "wikimyei"
        && segments[2] == "source"
    {
        return Err(
            "legacy namespace 'tsi.wikimyei.source.*' is removed; use 'tsi.source.*'".to_string(),
        );
    }

    let root_is_tsi = segments[0] == "tsi";
    let root_is_iinuji = segments[0] == "iinuji";
    let root_is_board = segments[0] == "board";
    if !root_is_tsi && !root_is_iinuji && !root_is_board {
        return Err("path root must be 'tsi', 'board', or 'iinuji'".to_string());
    }
    if segments.len() >= 2 && root_is_tsi && segments[1] == "iinuji" {
        return Err("tsi.iinuji.* is not supported; use iinuji.*".to_string());
    }
    if segments.len() >= 2 && root_is_tsi && segments[1] == "wave" {
        return Err(
            "tsi.wave is not a TSI component anymore; use board.wave and source roots".to_string(),
        );
    }
    if segments.last().map(String::as_str) == Some("jkimyei") {
        return Err("legacy '.jkimyei' facet is removed; use '@jkimyei:<kind>'".to_string());
    }

    if segments.len() == 1 {
        return Ok(());
    }

    if segments[1] == "wikimyei" {
        if !root_is_tsi {
            return Err("wikimyei paths must be rooted at tsi.wikimyei".to_string());
        }
        if segments.len() == 2 || segments.len() == 3 {
            return Ok(());
        }
        if segments.len() == 4 {
            if !unpack_fused_wikimyei_model_hash(segments) {
                return Err("tsi.wikimyei path requires explicit hashimyei suffix \
                            (expected tsi.wikimyei.<family>.<model>.<hashimyei>)"
                    .to_string());
            }
        } else if segments.len() != 5 {
            return Err("tsi.wikimyei path accepts family.model.hashimyei".to_string());
        }

        *hashimyei = segments[4].clone();
        if hashimyei.as_str() == "default" {
            return Err("legacy hashimyei alias 'default' is removed; \
                        use explicit hex hashimyei id (for example 0x0000)"
                .to_string());
        }
        if !is_hex_hash_name(hashimyei) {
            return Err("invalid hashimyei id; expected explicit hex form 0x<hex>".to_string());
        }
    }
    Ok(())
}

fn fail(mut out: CanonicalPath, error: String) -> CanonicalPath {
    out.ok = false;
    out.error = error;
    out
}

/// Decode and canonicalize a path expression.
pub fn decode_canonical_path(text: &str) -> CanonicalPath {
    let mut out = CanonicalPath {
        raw: text.to_string(),
        ..CanonicalPath::default()
    };

    let core = match split_core(&out.raw) {
        Ok(core) => core,
        Err(error) => return fail(out, error),
    };

    let mut segments: Vec<String> = core.path_text.split('.').map(str::to_string).collect();
    if let Err(error) = canonicalize_segments(&mut segments, &mut out.hashimyei_id) {
        return fail(out, error);
    }
    out.segments = segments;

    if core.has_call {
        out.args = match parse_args(&core.args_text) {
            Ok(args) => args,
            Err(error) => return fail(out, error),
        };
        out.path_kind = PathKind::Call;
    } else {
        out.path_kind = PathKind::Node;
    }

    let endpoint = match parse_endpoint_suffix(&core.endpoint_text) {
        Ok(endpoint) => endpoint,
        Err(error) => return fail(out, error),
    };
    if endpoint.present {
        out.directive = endpoint.directive;
        out.kind = endpoint.kind;
        if out.path_kind != PathKind::Call {
            out.path_kind = PathKind::Endpoint;
        }
    }

    out.canonical_identity = if core.has_call {
        format!("{}({})", out.segments.join("."), canonical_args(&out.args))
    } else {
        out.segments.join(".")
    };

    if endpoint.present {
        if out.segments.first().map(String::as_str) == Some("tsi") {
            let type_id = parse_tsi_type_id(&out.canonical_identity);
            let kind = payload_kind_from_token(&out.kind);
            let directive = parse_directive_id(&out.directive);
            if let (Some(type_id), Some(kind), Some(directive)) = (type_id, kind, directive) {
                if !type_accepts_endpoint(type_id, directive, kind) {
                    return fail(
                        out,
                        "endpoint directive/kind is not supported by tsi type".to_string(),
                    );
                }
            }
        }
        out.canonical_endpoint =
            format!("{}{}{}", out.canonical_identity, out.directive, out.kind);
        out.canonical = out.canonical_endpoint.clone();
    } else {
        out.canonical_endpoint.clear();
        out.canonical = out.canonical_identity.clone();
    }

    let provider = canonical_identity_provider();
    out.identity_hash_name = provider.assign(&format!("{}.self", out.canonical_identity));
    if !out.canonical_endpoint.is_empty() {
        out.endpoint_hash_name = provider.assign(&format!("{}.self", out.canonical_endpoint));
    }

    out.ok = true;
    out
}

pub fn validate_canonical_path(path: &CanonicalPath) -> Result<(), PathError> {
    if !path.ok {
        let error = if path.error.is_empty() {
            "invalid path".to_string()
        } else {
            path.error.clone()
        };
        return Err(PathError(error));
    }
    if path.canonical_identity.is_empty() {
        return Err(PathError("missing canonical identity".to_string()));
    }
    if path.identity_hash_name.is_empty() {
        return Err(PathError("missing identity hash".to_string()));
    }
    if !path.canonical_endpoint.is_empty() && path.endpoint_hash_name.is_empty() {
        return Err(PathError("missing endpoint hash".to_string()));
    }
    Ok(())
}

pub fn canonicalize_canonical_path(path: &CanonicalPath) -> String {
    if !path.ok {
        return String::new();
    }
    path.canonical.clone()
}

/// User-input shorthand for endpoint references: `iinuji.`/`tsi.` paths pass
/// through, anything else is namespaced under `iinuji.primitive.endpoint`.
pub fn decode_primitive_endpoint_text(text: &str) -> CanonicalPath {
    let t = text.trim();
    if t.starts_with("iinuji.") || t.starts_with("tsi.") {
        return decode_canonical_path(t);
    }

    match t.find('@') {
        None => {
            let alias = sanitize_atom(t);
            decode_canonical_path(&format!("iinuji.primitive.endpoint.{alias}"))
        }
        Some(at) => {
            let alias = sanitize_atom(t[..at].trim());
            let endpoint = t[at + 1..].trim();
            decode_canonical_path(&format!("iinuji.primitive.endpoint.{alias}@{endpoint}"))
        }
    }
}

/// User-input shorthand for commands: a handful of words expand to view
/// calls, everything else is wrapped as a raw primitive command.
pub fn decode_primitive_command_text(text: &str) -> CanonicalPath {
    let t = text.trim();
    if t.starts_with("iinuji.") || t.starts_with("tsi.") {
        return decode_canonical_path(t);
    }

    let mut words = t.split_ascii_whitespace();
    let a0 = words.next().unwrap_or("").to_ascii_lowercase();
    let a1 = words.next().unwrap_or("").to_ascii_lowercase();
    let a2 = words.next().unwrap_or("").to_ascii_lowercase();

    if a0.is_empty() {
        return decode_canonical_path(t);
    }
    if a0 == "reload" {
        return decode_canonical_path("iinuji.refresh()");
    }
    if a0 == "data" && a1 == "plot" {
        let mode = sanitize_value(if a2.is_empty() { "seq" } else { &a2 });
        return decode_canonical_path(&format!("iinuji.view.data.plot(mode={mode})"));
    }
    if a0 == "plot" {
        let view = sanitize_value(if a1.is_empty() { "toggle" } else { &a1 });
        return decode_canonical_path(&format!("iinuji.view.data.plot(view={view})"));
    }
    if a0 == "data" {
        return decode_canonical_path("iinuji.view.data()");
    }
    if a0 == "tsi" {
        return decode_canonical_path("iinuji.view.tsi()");
    }

    decode_canonical_path(&format!(
        "iinuji.primitive.command(raw={})",
        sanitize_value(t)
    ))
}

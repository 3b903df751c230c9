//! Directive and payload-kind registry for component endpoints.

use serde::{Deserialize, Serialize};

/// Payload families a directive can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    Tensor,
    String,
}

pub fn kind_token(kind: PayloadKind) -> &'static str {
    match kind {
        PayloadKind::Tensor => ":tensor",
        PayloadKind::String => ":str",
    }
}

/// Canonical directive ids.
pub const DIRECTIVES: &[&str] = &["@jkimyei", "@wave", "@meta", "@signal"];

/// Case-insensitive directive lookup; a missing `@` is prepended.
pub fn parse_directive_id(token: &str) -> Option<&'static str> {
    let token = token.trim().to_ascii_lowercase();
    if token.is_empty() {
        return None;
    }
    let token = if token.starts_with('@') {
        token
    } else {
        format!("@{token}")
    };
    DIRECTIVES.iter().copied().find(|d| *d == token)
}

/// `:str` / `:tensor` (bare or prefixed) to payload kind.
pub fn payload_kind_from_token(token: &str) -> Option<PayloadKind> {
    match token.trim().to_ascii_lowercase().as_str() {
        "tensor" | ":tensor" => Some(PayloadKind::Tensor),
        "str" | ":str" => Some(PayloadKind::String),
        _ => None,
    }
}

struct TsiType {
    canonical: &'static str,
    endpoints: &'static [(&'static str, PayloadKind)],
}

/// Endpoint compatibility for the component types the runtime registers.
/// Identities outside this table carry no endpoint restriction.
const TSI_TYPES: &[TsiType] = &[
    TsiType {
        canonical: "tsi.wikimyei",
        endpoints: &[
            ("@jkimyei", PayloadKind::Tensor),
            ("@jkimyei", PayloadKind::String),
            ("@wave", PayloadKind::Tensor),
            ("@meta", PayloadKind::String),
        ],
    },
    TsiType {
        canonical: "tsi.source",
        endpoints: &[
            ("@wave", PayloadKind::Tensor),
            ("@meta", PayloadKind::String),
        ],
    },
    TsiType {
        canonical: "board.wave",
        endpoints: &[
            ("@wave", PayloadKind::Tensor),
            ("@signal", PayloadKind::String),
        ],
    },
];

/// The registered type whose canonical prefix covers `canonical_identity`,
/// if any.
pub fn parse_tsi_type_id(canonical_identity: &str) -> Option<&'static str> {
    TSI_TYPES
        .iter()
        .find(|t| {
            canonical_identity
                .strip_prefix(t.canonical)
                .is_some_and(|rest| {
                    rest.is_empty() || rest.starts_with('.') || rest.starts_with('(')
                })
        })
        .map(|t| t.canonical)
}

pub fn type_accepts_endpoint(type_id: &str, directive: &str, kind: PayloadKind) -> bool {
    TSI_TYPES
        .iter()
        .find(|t| t.canonical == type_id)
        .map(|t| t.endpoints.iter().any(|(d, k)| *d == directive && *k == kind))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_parse_is_case_insensitive_and_prefixes_at() {
        assert_eq!(parse_directive_id("jkimyei"), Some("@jkimyei"));
        assert_eq!(parse_directive_id("@JKIMYEI"), Some("@jkimyei"));
        assert_eq!(parse_directive_id(" wave "), Some("@wave"));
        assert_eq!(parse_directive_id("unknown"), None);
        assert_eq!(parse_directive_id(""), None);
    }

    #[test]
    fn payload_kinds() {
        assert_eq!(payload_kind_from_token(":tensor"), Some(PayloadKind::Tensor));
        assert_eq!(payload_kind_from_token("str"), Some(PayloadKind::String));
        assert_eq!(payload_kind_from_token(":json"), None);
    }

    #[test]
    fn type_lookup_matches_dot_prefixes_only() {
        assert_eq!(
            parse_tsi_type_id("tsi.wikimyei.representation.vicreg.0x0001"),
            Some("tsi.wikimyei")
        );
        assert_eq!(parse_tsi_type_id("tsi.wikimyeix.thing"), None);
        assert_eq!(parse_tsi_type_id("board.wave"), Some("board.wave"));
    }

    #[test]
    fn endpoint_compatibility() {
        assert!(type_accepts_endpoint(
            "tsi.wikimyei",
            "@jkimyei",
            PayloadKind::Tensor
        ));
        assert!(!type_accepts_endpoint(
            "tsi.source",
            "@jkimyei",
            PayloadKind::Tensor
        ));
    }
}

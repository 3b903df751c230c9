#![doc = include_str!("../README.md")]

pub mod canonical;
pub mod directive;
pub mod identity;

pub use crate::canonical::{
    canonicalize_canonical_path, decode_canonical_path, decode_primitive_command_text,
    decode_primitive_endpoint_text, validate_canonical_path, CanonicalPath, CanonicalPathArg,
    PathError, PathKind,
};
pub use crate::directive::{
    kind_token, parse_directive_id, parse_tsi_type_id, payload_kind_from_token,
    type_accepts_endpoint, PayloadKind, DIRECTIVES,
};
pub use crate::identity::{
    canonical_identity_provider, fnv1a64, is_hex_hash_name, known_hashimyeis,
    make_hex_hash_name, split_model_hash_suffix, IdentityProvider, HEX_IDENTITY_CATALOG_SIZE,
};

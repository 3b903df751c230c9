//! hashimyei identity catalog: stable 4-hex names for arbitrary keys.
//!
//! Sixteen catalog slots (`0x0000`…`0x000f`) are handed out by FNV-seeded
//! probing; a key keeps its name for the life of the process. When all
//! sixteen slots are bound to other keys, a nonce walk produces a
//! deterministic non-catalog 4-hex name.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

pub const HEX_IDENTITY_CATALOG_SIZE: usize = 16;

const FNV64_OFFSET: u64 = 14695981039346656037;
const FNV64_PRIME: u64 = 1099511628211;

pub fn fnv1a64(s: &str) -> u64 {
    let mut h = FNV64_OFFSET;
    for byte in s.bytes() {
        h ^= u64::from(byte);
        h = h.wrapping_mul(FNV64_PRIME);
    }
    h
}

pub fn make_hex_hash_name(ordinal: u64) -> String {
    format!("0x{ordinal:04x}")
}

/// `0x` followed by at least one hex digit.
pub fn is_hex_hash_name(s: &str) -> bool {
    let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) else {
        return false;
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// The fixed catalog, `0x0000`…`0x000f`.
pub fn known_hashimyeis() -> &'static [String] {
    static NAMES: Lazy<Vec<String>> = Lazy::new(|| {
        (0..HEX_IDENTITY_CATALOG_SIZE as u64)
            .map(make_hex_hash_name)
            .collect()
    });
    &NAMES
}

#[derive(Default)]
struct Bindings {
    key_to_name: HashMap<String, String>,
    name_to_key: HashMap<String, String>,
}

/// Thread-safe key → 4-hex-name assignment.
#[derive(Default)]
pub struct IdentityProvider {
    bindings: Mutex<Bindings>,
}

impl IdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent per key: the first call picks a slot, later calls return
    /// the same name.
    pub fn assign(&self, key: &str) -> String {
        let mut bindings = self.bindings.lock().expect("identity catalog poisoned");
        if let Some(name) = bindings.key_to_name.get(key) {
            return name.clone();
        }

        let seed = fnv1a64(key);
        for i in 0..HEX_IDENTITY_CATALOG_SIZE as u64 {
            let candidate = make_hex_hash_name(seed.wrapping_add(i) & 0x0f);
            let taken = bindings
                .name_to_key
                .get(&candidate)
                .is_some_and(|bound| bound != key);
            if taken {
                continue;
            }
            bindings
                .name_to_key
                .insert(candidate.clone(), key.to_string());
            bindings
                .key_to_name
                .insert(key.to_string(), candidate.clone());
            return candidate;
        }

        // All sixteen slots are live; stay in 4-hex form, deterministic in
        // the key.
        let mut nonce = HEX_IDENTITY_CATALOG_SIZE as u64;
        loop {
            let candidate = make_hex_hash_name(seed.wrapping_add(nonce) & 0xffff);
            let taken = bindings
                .name_to_key
                .get(&candidate)
                .is_some_and(|bound| bound != key);
            if taken {
                nonce += 1;
                continue;
            }
            bindings
                .name_to_key
                .insert(candidate.clone(), key.to_string());
            bindings
                .key_to_name
                .insert(key.to_string(), candidate.clone());
            return candidate;
        }
    }
}

/// The process-wide provider used for canonical identities.
pub fn canonical_identity_provider() -> &'static IdentityProvider {
    static PROVIDER: Lazy<IdentityProvider> = Lazy::new(IdentityProvider::new);
    &PROVIDER
}

/// Split `model_0x1f` into (`model`, `0x1f`). The right side must already be
/// a hex hash name.
pub fn split_model_hash_suffix(fused: &str) -> Option<(String, String)> {
    let us = fused.rfind('_')?;
    let (model, hash) = (&fused[..us], &fused[us + 1..]);
    if model.is_empty() || !is_hex_hash_name(hash) {
        return None;
    }
    Some((model.to_string(), hash.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_is_idempotent() {
        let provider = IdentityProvider::new();
        let first = provider.assign("tsi.board.self");
        let second = provider.assign("tsi.board.self");
        assert_eq!(first, second);
        assert!(known_hashimyeis().contains(&first));
    }

    #[test]
    fn sixteen_keys_fill_the_catalog_without_collision() {
        let provider = IdentityProvider::new();
        let mut names: Vec<String> = (0..16).map(|i| provider.assign(&format!("key-{i}"))).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);
        for name in &names {
            assert!(known_hashimyeis().contains(name));
        }
    }

    #[test]
    fn seventeenth_key_overflows_deterministically() {
        let provider = IdentityProvider::new();
        for i in 0..16 {
            provider.assign(&format!("key-{i}"));
        }
        let overflow = provider.assign("key-16");
        assert!(is_hex_hash_name(&overflow));
        assert!(!known_hashimyeis().contains(&overflow));
        assert_eq!(provider.assign("key-16"), overflow);
    }

    #[test]
    fn hex_hash_name_recognition() {
        assert!(is_hex_hash_name("0x0001"));
        assert!(is_hex_hash_name("0xAbC"));
        assert!(!is_hex_hash_name("0x"));
        assert!(!is_hex_hash_name("1234"));
        assert!(!is_hex_hash_name("0xg1"));
    }

    #[test]
    fn split_model_hash_suffix_requires_hex_tail() {
        assert_eq!(
            split_model_hash_suffix("vicreg_0x0001"),
            Some(("vicreg".to_string(), "0x0001".to_string()))
        );
        assert_eq!(split_model_hash_suffix("vicreg"), None);
        assert_eq!(split_model_hash_suffix("vicreg_default"), None);
        assert_eq!(split_model_hash_suffix("_0x0001"), None);
    }
}

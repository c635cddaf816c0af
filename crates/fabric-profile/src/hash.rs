//! Content hashing for profiles

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// SHA-256 over a profile's identity, content and its parents' hashes.
///
/// Every field is length prefixed so that no two different inputs share an
/// encoding. Parent hashes are taken in declared order.
pub(crate) fn profile_hash<'a>(
    version: &str,
    id: &str,
    attributes: &BTreeMap<String, String>,
    files: &BTreeMap<String, Vec<u8>>,
    parent_hashes: impl Iterator<Item = &'a str>,
) -> String {
    let mut hasher = Sha256::new();

    update_field(&mut hasher, version.as_bytes());
    update_field(&mut hasher, id.as_bytes());

    hasher.update((attributes.len() as u64).to_le_bytes());
    for (key, value) in attributes {
        update_field(&mut hasher, key.as_bytes());
        update_field(&mut hasher, value.as_bytes());
    }

    hasher.update((files.len() as u64).to_le_bytes());
    for (name, content) in files {
        update_field(&mut hasher, name.as_bytes());
        update_field(&mut hasher, content);
    }

    for parent in parent_hashes {
        update_field(&mut hasher, parent.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(attrs: &[(&str, &str)], files: &[(&str, &[u8])], parents: &[&str]) -> String {
        let attributes = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let files = files
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_vec()))
            .collect();
        profile_hash("1.0", "p", &attributes, &files, parents.iter().copied())
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = hash_of(&[], &[], &[]);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = hash_of(&[("k", "v")], &[("f", b"x")], &["p1"]);
        let b = hash_of(&[("k", "v")], &[("f", b"x")], &["p1"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_boundaries_matter() {
        let a = hash_of(&[("ab", "c")], &[], &[]);
        let b = hash_of(&[("a", "bc")], &[], &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parent_order_matters() {
        let a = hash_of(&[], &[], &["x", "y"]);
        let b = hash_of(&[], &[], &["y", "x"]);
        assert_ne!(a, b);
    }
}

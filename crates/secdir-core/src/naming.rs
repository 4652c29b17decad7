//! Opaque ciphertext blob names

use uuid::Uuid;

/// Generate a fresh blob name: a random v4 UUID in canonical hyphenated form.
pub fn opaque_name() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Whether `name` is a well-formed blob name.
///
/// Names read back from the registry go through this before being joined
/// onto the ciphertext root.
pub fn is_opaque_name(name: &str) -> bool {
    name.len() == 36 && Uuid::parse_str(name).is_ok()
}

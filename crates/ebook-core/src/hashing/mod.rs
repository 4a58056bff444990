//! JSON canónico y utilidades de hashing.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{artifact_reference, hash_bytes, hash_str, hash_value};

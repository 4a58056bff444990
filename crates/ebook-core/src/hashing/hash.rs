//! Utilidades blake3. Todos los hashes del workspace pasan por aquí.

use blake3::Hasher;
use serde::Serialize;
use serde_json::Value;

use super::to_canonical_json;
use crate::constants::ENGINE_VERSION;

pub fn hash_str(input: &str) -> String {
    hash_bytes(input.as_bytes())
}

pub fn hash_bytes(input: &[u8]) -> String {
    let mut h = Hasher::new();
    h.update(input);
    h.finalize().to_hex().to_string()
}

/// Fingerprint de una salida serializable, salado con la versión del motor
/// para que un motor nuevo nunca dé por vigente un fingerprint antiguo.
pub fn hash_value<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_value(value).unwrap_or(Value::Null);
    let salted = serde_json::json!({ "engine_version": ENGINE_VERSION, "value": json });
    hash_str(&to_canonical_json(&salted))
}

/// Dirección de contenido de un flujo de bytes exportado.
pub fn artifact_reference(bytes: &[u8]) -> String {
    format!("blake3:{}", hash_bytes(bytes))
}

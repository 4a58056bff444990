//! Constantes del motor.
//!
//! `ENGINE_VERSION` sala cada fingerprint de salida (ver `hashing::hash_value`).
//! Cambiarla solo cuando cambia el significado de una salida almacenada.

pub const ENGINE_VERSION: &str = "E1.0";

/// Caracteres de cada capítulo previo que se citan en los prompts siguientes.
pub const CHAPTER_EXCERPT_CHARS: usize = 280;

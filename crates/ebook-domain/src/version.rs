// version.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artefacto exportado de un documento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Empieza en 1 y crece estrictamente por documento.
    pub version_number: u32,
    /// Dirección de contenido de los bytes exportados (`blake3:<hex>`).
    pub artifact_reference: String,
    pub created_at: DateTime<Utc>,
    pub media_type: String,
    pub page_count: usize,
    pub byte_len: usize,
    /// Fingerprint del documento ensamblado que se exportó.
    #[serde(default)]
    pub document_fingerprint: Option<String>,
}

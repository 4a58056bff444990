//! Punto de extensión de exportación. Los formatos concretos viven fuera del motor y se inyectan.

use ebook_domain::{DocumentModel, Version};

/// Bytes producidos por un exportador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

pub trait DocumentExporter: Send + Sync {
    fn media_type(&self) -> &str;
    fn file_extension(&self) -> &str;
    /// Debe ser determinista para un documento dado.
    fn export(&self, document: &DocumentModel) -> ExportOutput;
}

/// Resultado de una exportación correcta: la versión registrada y los bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedArtifact {
    pub version: Version,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedArtifact {
    /// Nombre de fichero sugerido, p. ej. `my-book-v2.pdf`.
    pub fn file_name(&self, title: &str, extension: &str) -> String {
        let slug: String = title.chars()
                                .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
                                .collect::<String>()
                                .split('-')
                                .filter(|s| !s.is_empty())
                                .collect::<Vec<_>>()
                                .join("-");
        let slug = if slug.is_empty() { "ebook".to_string() } else { slug };
        format!("{slug}-v{}.{extension}", self.version.version_number)
    }
}

/// Render UTF-8 plano, una sección por encabezado.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExporter;

impl DocumentExporter for PlainTextExporter {
    fn media_type(&self) -> &str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }

    fn export(&self, document: &DocumentModel) -> ExportOutput {
        let mut out = String::new();
        out.push_str(document.title());
        out.push_str("\n\nContents\n");
        out.push_str("  Introduction\n");
        for c in document.chapters() {
            out.push_str("  ");
            out.push_str(&c.display_title());
            out.push('\n');
        }
        out.push_str("  Conclusion\n\nIntroduction\n\n");
        out.push_str(document.introduction());
        for c in document.chapters() {
            out.push_str("\n\n");
            out.push_str(&c.display_title());
            out.push_str("\n\n");
            out.push_str(c.content.trim());
        }
        out.push_str("\n\nConclusion\n\n");
        out.push_str(document.conclusion());
        out.push('\n');
        ExportOutput { bytes: out.into_bytes(),
                       page_count: 1 }
    }
}

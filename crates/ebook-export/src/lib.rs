//! ebook-export: paginación y salida PDF de documentos ensamblados.
//!
//! `Paginator` convierte un `DocumentModel` en páginas de tamaño fijo y
//! `PdfExporter` las serializa, conectándose al motor como su
//! `DocumentExporter`.

pub mod layout;
pub mod paginator;
pub mod pdf;

pub use layout::{Block, BlockStyle, PageConfig};
pub use paginator::{Page, PaginatedDocument, Paginator, PlacedBlock};
pub use pdf::PdfExporter;

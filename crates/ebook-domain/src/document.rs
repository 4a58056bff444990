// document.rs
use serde::Serialize;

use crate::{Chapter, DomainError, TableOfContents};

/// Capítulo con contenido garantizado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChapter {
    pub index: usize,
    pub title: String,
    pub content: String,
}

impl DocumentChapter {
    pub fn display_title(&self) -> String {
        format!("Chapter {}: {}", self.index + 1, self.title)
    }
}

/// Documento completo y enumerable; es la entrada de la paginación.
///
/// Solo `try_new` lo construye: tener un `DocumentModel` implica que todos
/// los capítulos tienen contenido y que introducción y conclusión no están
/// vacías. No implementa `Deserialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    title: String,
    introduction: String,
    table_of_contents: TableOfContents,
    chapters: Vec<DocumentChapter>,
    conclusion: String,
}

impl DocumentModel {
    /// # Errores
    /// `DomainError::IncompleteDocument` con la lista de piezas que faltan.
    pub fn try_new(title: &str,
                   introduction: &str,
                   table_of_contents: &TableOfContents,
                   chapters: &[Chapter],
                   conclusion: &str)
                   -> Result<Self, DomainError> {
        let mut missing = Vec::new();
        if title.trim().is_empty() {
            missing.push("title".to_string());
        }
        if table_of_contents.is_empty() {
            missing.push("table of contents".to_string());
        }
        if chapters.is_empty() {
            missing.push("chapters".to_string());
        }
        for c in chapters {
            if !c.has_content() {
                missing.push(format!("chapter {} content", c.index + 1));
            }
        }
        if introduction.trim().is_empty() {
            missing.push("introduction".to_string());
        }
        if conclusion.trim().is_empty() {
            missing.push("conclusion".to_string());
        }
        if !missing.is_empty() {
            return Err(DomainError::IncompleteDocument(missing));
        }

        let chapters = chapters.iter()
                               .map(|c| DocumentChapter { index: c.index,
                                                          title: c.title.clone(),
                                                          content: c.content.clone().unwrap_or_default() })
                               .collect();
        Ok(Self { title: title.trim().to_string(),
                  introduction: introduction.trim().to_string(),
                  table_of_contents: table_of_contents.clone(),
                  chapters,
                  conclusion: conclusion.trim().to_string() })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn introduction(&self) -> &str {
        &self.introduction
    }

    pub fn table_of_contents(&self) -> &TableOfContents {
        &self.table_of_contents
    }

    pub fn chapters(&self) -> &[DocumentChapter] {
        &self.chapters
    }

    pub fn conclusion(&self) -> &str {
        &self.conclusion
    }

    pub fn word_count(&self) -> usize {
        let body: usize = self.chapters.iter().map(|c| c.content.split_whitespace().count()).sum();
        body + self.introduction.split_whitespace().count() + self.conclusion.split_whitespace().count()
    }
}

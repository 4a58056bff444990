// toc.rs
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Capítulo planificado: título visible y puntos que debe cubrir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub title: String,
    #[serde(default, alias = "dataPoints", alias = "points")]
    pub data_points: Vec<String>,
}

impl ChapterOutline {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(),
               data_points: Vec::new() }
    }

    pub fn with_points<I, S>(title: impl Into<String>, points: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { title: title.into(),
               data_points: points.into_iter().map(Into::into).collect() }
    }
}

/// Plan ordenado de capítulos de un documento.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableOfContents {
    pub chapters: Vec<ChapterOutline>,
}

impl TableOfContents {
    pub fn new(chapters: Vec<ChapterOutline>) -> Self {
        Self { chapters }
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChapterOutline> {
        self.chapters.iter()
    }

    /// Un índice utilizable tiene al menos un capítulo y ningún título vacío.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chapters.is_empty() {
            return Err(DomainError::ValidationError("table of contents has no chapters".to_string()));
        }
        if let Some(pos) = self.chapters.iter().position(|c| c.title.trim().is_empty()) {
            return Err(DomainError::ValidationError(format!("chapter {} has an empty title", pos + 1)));
        }
        Ok(())
    }
}

impl FromIterator<ChapterOutline> for TableOfContents {
    fn from_iter<T: IntoIterator<Item = ChapterOutline>>(iter: T) -> Self {
        Self { chapters: iter.into_iter().collect() }
    }
}

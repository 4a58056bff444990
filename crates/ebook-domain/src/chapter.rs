// chapter.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChapterOutline, TableOfContents};

/// Origen del contenido actual de un capítulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Generated,
    Edited,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterMetadata {
    pub source: Option<ContentSource>,
    /// Modelo que produjo el contenido; `None` para ediciones del usuario.
    pub model: Option<String>,
    pub word_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Hueco de capítulo. `content` queda en `None` hasta que se genera o edita.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub index: usize,
    #[serde(default)]
    pub metadata: ChapterMetadata,
}

impl Chapter {
    pub fn from_outline(index: usize, outline: &ChapterOutline) -> Self {
        Self { id: Uuid::new_v4(),
               title: outline.title.trim().to_string(),
               content: None,
               index,
               metadata: ChapterMetadata::default() }
    }

    /// Crea un hueco vacío por entrada del índice, con índices `0..N-1`.
    pub fn slots_for(toc: &TableOfContents) -> Vec<Chapter> {
        toc.iter().enumerate().map(|(i, o)| Chapter::from_outline(i, o)).collect()
    }

    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    pub fn set_content(&mut self, content: String, source: ContentSource, model: Option<String>) {
        self.metadata = ChapterMetadata { source: Some(source),
                                          model,
                                          word_count: content.split_whitespace().count(),
                                          updated_at: Some(Utc::now()) };
        self.content = Some(content);
    }

    pub fn clear_content(&mut self) {
        self.content = None;
        self.metadata = ChapterMetadata::default();
    }

    /// Encabezado usado en la página de contenidos y al abrir cada capítulo.
    pub fn display_title(&self) -> String {
        format!("Chapter {}: {}", self.index + 1, self.title)
    }
}

/// Cierto si `chapters` es una secuencia densa `0..N-1` cuyos títulos siguen a `toc`.
pub fn chapters_match_toc(chapters: &[Chapter], toc: &TableOfContents) -> bool {
    chapters.len() == toc.len()
    && chapters.iter()
               .zip(toc.iter())
               .enumerate()
               .all(|(i, (c, o))| c.index == i && c.title == o.title.trim())
}

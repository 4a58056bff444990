//! Ensamblado de contenido: salidas almacenadas -> `DocumentModel`.

use ebook_domain::{chapters_match_toc, DomainError, DocumentModel, TableOfContents, WorkflowInstance};
use thiserror::Error;

use crate::errors::WorkflowError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("document is incomplete, missing: {}", .0.join(", "))]
    IncompleteDocument(Vec<String>),
}

impl From<AssemblyError> for WorkflowError {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::IncompleteDocument(missing) => {
                WorkflowError::IncompleteDocument(DomainError::IncompleteDocument(missing))
            }
        }
    }
}

/// Construye el documento a partir de las salidas almacenadas.
///
/// Puro e idempotente. Al fallar nombra todas las piezas ausentes, no solo
/// la primera.
pub fn assemble(instance: &WorkflowInstance) -> Result<DocumentModel, AssemblyError> {
    let o = &instance.outputs;
    let empty = TableOfContents::default();
    let toc = o.table_of_contents.as_ref().unwrap_or(&empty);
    let mut extra = Vec::new();
    if !toc.is_empty() && !o.chapters.is_empty() && !chapters_match_toc(&o.chapters, toc) {
        extra.push("chapters matching the table of contents".to_string());
    }
    let built = DocumentModel::try_new(instance.effective_title(),
                                       o.introduction.as_deref().unwrap_or(""),
                                       toc,
                                       &o.chapters,
                                       o.conclusion.as_deref().unwrap_or(""));
    match built {
        Ok(doc) if extra.is_empty() => Ok(doc),
        Ok(_) => Err(AssemblyError::IncompleteDocument(extra)),
        Err(DomainError::IncompleteDocument(mut missing)) => {
            missing.extend(extra);
            Err(AssemblyError::IncompleteDocument(missing))
        }
        Err(DomainError::ValidationError(reason)) => Err(AssemblyError::IncompleteDocument(vec![reason])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebook_domain::{Chapter, ChapterOutline, ContentSource};

    fn instance(chapter_texts: &[Option<&str>]) -> WorkflowInstance {
        let mut wf = WorkflowInstance::new("o", "Working title");
        let toc: TableOfContents = (0..chapter_texts.len()).map(|i| ChapterOutline::new(format!("C{i}")))
                                                           .collect();
        let mut chapters = Chapter::slots_for(&toc);
        for (c, text) in chapters.iter_mut().zip(chapter_texts) {
            if let Some(t) = text {
                c.set_content(t.to_string(), ContentSource::Generated, None);
            }
        }
        wf.outputs.table_of_contents = Some(toc);
        wf.outputs.chapters = chapters;
        wf.outputs.introduction = Some("Intro".into());
        wf.outputs.conclusion = Some("End".into());
        wf
    }

    #[test]
    fn complete_instance_assembles_deterministically() {
        let wf = instance(&[Some("one"), Some("two")]);
        let a = assemble(&wf).unwrap();
        let b = assemble(&wf).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.title(), "Working title");
        assert_eq!(a.chapters().len(), 2);
    }

    #[test]
    fn missing_pieces_are_all_named() {
        let mut wf = instance(&[Some("one"), None]);
        wf.outputs.conclusion = Some("   ".into());
        let AssemblyError::IncompleteDocument(missing) = assemble(&wf).unwrap_err();
        assert_eq!(missing, vec!["chapter 2 content".to_string(), "conclusion".to_string()]);
    }

    #[test]
    fn stale_chapter_slots_are_incomplete() {
        let mut wf = instance(&[Some("one")]);
        wf.outputs.table_of_contents = Some(TableOfContents::new(vec![ChapterOutline::new("Renamed")]));
        assert!(assemble(&wf).is_err());
    }
}

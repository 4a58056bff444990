use ebook_domain::{StepId, TableOfContents};
use serde::{Deserialize, Serialize};

/// Salida de un step aportada por el llamador o producida por `StepDefinition::accept`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StepValue {
    Text(String),
    TableOfContents(TableOfContents),
    Chapter { index: usize, content: String },
}

impl StepValue {
    pub fn text(s: impl Into<String>) -> Self {
        StepValue::Text(s.into())
    }

    /// Indica si este valor puede guardarse como salida de `step`.
    pub fn fits(&self, step: StepId) -> bool {
        match self {
            StepValue::Text(_) => matches!(step,
                                           StepId::Input
                                           | StepId::Title
                                           | StepId::Introduction
                                           | StepId::Conclusion
                                           | StepId::Review),
            StepValue::TableOfContents(_) => step == StepId::Toc,
            StepValue::Chapter { .. } => step == StepId::Chapters,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            StepValue::Text(_) => "text",
            StepValue::TableOfContents(_) => "table of contents",
            StepValue::Chapter { .. } => "chapter",
        }
    }
}

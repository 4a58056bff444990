// step_id.rs
use serde::{Deserialize, Serialize};
use std::fmt;

static STEP_ORDER: [StepId; 9] = StepId::ORDER;

/// Conjunto fijo y ordenado de etapas por las que pasa un eBook.
///
/// El `Ord` derivado sigue el orden de declaración, que es el del flujo. La
/// lógica de transición solo recorre `StepId::ORDER`: añadir una etapa es
/// añadir una variante aquí y una definición en el registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepId {
    Input,
    Title,
    Toc,
    Chapters,
    Introduction,
    Conclusion,
    Assemble,
    Review,
    Export,
}

impl StepId {
    pub const ORDER: [StepId; 9] = [StepId::Input,
                                    StepId::Title,
                                    StepId::Toc,
                                    StepId::Chapters,
                                    StepId::Introduction,
                                    StepId::Conclusion,
                                    StepId::Assemble,
                                    StepId::Review,
                                    StepId::Export];

    pub const FIRST: StepId = StepId::Input;
    pub const LAST: StepId = StepId::Export;

    /// Posición (desde cero) en `ORDER`.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn from_position(position: usize) -> Option<StepId> {
        Self::ORDER.get(position).copied()
    }

    pub fn next(self) -> Option<StepId> {
        Self::from_position(self.position() + 1)
    }

    pub fn previous(self) -> Option<StepId> {
        self.position().checked_sub(1).and_then(Self::from_position)
    }

    /// Steps que deben estar completados antes de poder iniciar este.
    pub fn predecessors(self) -> &'static [StepId] {
        &STEP_ORDER[..self.position()]
    }

    /// Steps estrictamente posteriores a este.
    pub fn successors(self) -> &'static [StepId] {
        &STEP_ORDER[self.position() + 1..]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Input => "INPUT",
            StepId::Title => "TITLE",
            StepId::Toc => "TOC",
            StepId::Chapters => "CHAPTERS",
            StepId::Introduction => "INTRODUCTION",
            StepId::Conclusion => "CONCLUSION",
            StepId::Assemble => "ASSEMBLE",
            StepId::Review => "REVIEW",
            StepId::Export => "EXPORT",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_discriminants() {
        for (i, step) in StepId::ORDER.iter().enumerate() {
            assert_eq!(step.position(), i);
            assert_eq!(StepId::from_position(i), Some(*step));
        }
        assert_eq!(StepId::from_position(StepId::ORDER.len()), None);
    }

    #[test]
    fn neighbours_and_slices() {
        assert_eq!(StepId::Input.previous(), None);
        assert_eq!(StepId::Title.previous(), Some(StepId::Input));
        assert_eq!(StepId::Export.next(), None);
        assert_eq!(StepId::Toc.predecessors(), &[StepId::Input, StepId::Title]);
        assert_eq!(StepId::Review.successors(), &[StepId::Export]);
        assert!(StepId::Export.successors().is_empty());
    }

    #[test]
    fn serializes_upper_case() {
        let s = serde_json::to_string(&StepId::Chapters).unwrap();
        assert_eq!(s, "\"CHAPTERS\"");
        assert_eq!(StepId::Toc.to_string(), "TOC");
    }
}

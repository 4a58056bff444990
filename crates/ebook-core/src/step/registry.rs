use ebook_domain::StepId;
use indexmap::IndexMap;
use thiserror::Error;

use super::builtin::{AssembleStep, ChaptersStep, ExportStep, InputStep, TextStep, TocStep};
use super::definition::StepDefinition;
use crate::config::EngineConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no definition registered for step {0}")]
    Missing(StepId),
    #[error("step {0} is defined more than once")]
    Duplicate(StepId),
}

/// Tabla ordenada con exactamente una definición por `StepId`, recorrida en
/// el orden del flujo.
pub struct StepRegistry {
    steps: IndexMap<StepId, Box<dyn StepDefinition>>,
}

impl StepRegistry {
    /// # Errores
    /// `Duplicate` si dos definiciones comparten id, `Missing` si a un step
    /// le falta la suya.
    pub fn new(definitions: Vec<Box<dyn StepDefinition>>) -> Result<Self, RegistryError> {
        let mut by_id: IndexMap<StepId, Box<dyn StepDefinition>> = IndexMap::with_capacity(definitions.len());
        for def in definitions {
            let id = def.id();
            if by_id.insert(id, def).is_some() {
                return Err(RegistryError::Duplicate(id));
            }
        }
        if let Some(missing) = StepId::ORDER.iter().find(|s| !by_id.contains_key(*s)) {
            return Err(RegistryError::Missing(*missing));
        }
        by_id.sort_keys();
        Ok(Self { steps: by_id })
    }

    /// Los nueve steps integrados configurados desde `config`.
    pub fn standard(config: &EngineConfig) -> Self {
        let mut steps: IndexMap<StepId, Box<dyn StepDefinition>> = IndexMap::new();
        steps.insert(StepId::Input, Box::new(InputStep));
        steps.insert(StepId::Title, Box::new(TextStep::title(config)));
        steps.insert(StepId::Toc, Box::new(TocStep::new(config)));
        steps.insert(StepId::Chapters, Box::new(ChaptersStep::new(config)));
        steps.insert(StepId::Introduction, Box::new(TextStep::introduction(config)));
        steps.insert(StepId::Conclusion, Box::new(TextStep::conclusion(config)));
        steps.insert(StepId::Assemble, Box::new(AssembleStep));
        steps.insert(StepId::Review, Box::new(TextStep::review(config)));
        steps.insert(StepId::Export, Box::new(ExportStep));
        Self { steps }
    }

    /// Reemplaza la definición de `definition.id()`.
    pub fn replace(&mut self, definition: Box<dyn StepDefinition>) -> Box<dyn StepDefinition> {
        let id = definition.id();
        match self.steps.get_mut(&id) {
            Some(slot) => std::mem::replace(slot, definition),
            // inalcanzable: la tabla está completa
            None => definition,
        }
    }

    pub fn get(&self, step: StepId) -> &dyn StepDefinition {
        self.steps[&step].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn StepDefinition> {
        self.steps.values().map(|d| d.as_ref())
    }

    pub fn is_optional(&self, step: StepId) -> bool {
        self.get(step).optional()
    }
}

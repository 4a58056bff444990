//! `WorkflowInstance`: registro persistido de un documento en producción.
//!
//! El registro es autocontenido. Posición (`current_step`,
//! `steps_completed`), salidas, versiones exportadas e historial viven aquí,
//! así que un motor puede reinstanciarse en cualquier momento y recuperar la
//! posición exacta con un único `load`.
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Chapter, StepId, TableOfContents, Version, WorkflowEvent, WorkflowEventKind};

/// Se incrementa cuando la forma persistida cambia de manera incompatible.
pub const INSTANCE_SCHEMA_VERSION: u32 = 1;

/// Salidas almacenadas de cada step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutputs {
    pub input: Option<String>,
    pub title: Option<String>,
    pub table_of_contents: Option<TableOfContents>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    pub introduction: Option<String>,
    pub conclusion: Option<String>,
    /// Fingerprint del documento ensamblado (salida de ASSEMBLE).
    pub document_fingerprint: Option<String>,
    pub review: Option<String>,
}

impl StepOutputs {
    /// Descarta lo que produjo `step`. INPUT, EXPORT y CHAPTERS son casos
    /// especiales: la entrada original nunca se descarta aquí, el historial de
    /// exportación vive en `versions` y los huecos de capítulo conservan su
    /// estructura con el contenido vacío.
    pub fn clear(&mut self, step: StepId) {
        match step {
            StepId::Input | StepId::Export => {}
            StepId::Title => self.title = None,
            StepId::Toc => self.table_of_contents = None,
            StepId::Chapters => self.chapters.iter_mut().for_each(Chapter::clear_content),
            StepId::Introduction => self.introduction = None,
            StepId::Conclusion => self.conclusion = None,
            StepId::Assemble => self.document_fingerprint = None,
            StepId::Review => self.review = None,
        }
    }

    pub fn chapters_done(&self) -> usize {
        self.chapters.iter().filter(|c| c.has_content()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInstance {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub id: Uuid,
    pub document_title: String,
    pub owner_id: String,
    pub current_step: StepId,
    pub steps_completed: BTreeSet<StepId>,
    pub per_step_progress: f32,
    pub is_generating: bool,
    pub last_error: Option<String>,
    #[serde(default)]
    pub outputs: StepOutputs,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub history: Vec<WorkflowEvent>,
    /// Se incrementa en cada guardado; los stores rechazan escrituras fuera de orden.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    INSTANCE_SCHEMA_VERSION
}

impl WorkflowInstance {
    pub fn new(owner_id: impl Into<String>, document_title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { schema_version: INSTANCE_SCHEMA_VERSION,
               id: Uuid::new_v4(),
               document_title: document_title.into(),
               owner_id: owner_id.into(),
               current_step: StepId::FIRST,
               steps_completed: BTreeSet::new(),
               per_step_progress: 0.0,
               is_generating: false,
               last_error: None,
               outputs: StepOutputs::default(),
               versions: Vec::new(),
               history: Vec::new(),
               revision: 0,
               created_at: now,
               updated_at: now }
    }

    pub fn is_completed(&self, step: StepId) -> bool {
        self.steps_completed.contains(&step)
    }

    /// Todos los steps anteriores a `step` están completados.
    pub fn prerequisites_met(&self, step: StepId) -> bool {
        step.predecessors().iter().all(|s| self.is_completed(*s))
    }

    /// `steps_completed` coincide con las primeras `len` entradas de `StepId::ORDER`.
    pub fn is_prefix_closed(&self) -> bool {
        self.steps_completed
            .iter()
            .enumerate()
            .all(|(i, s)| s.position() == i)
    }

    /// Primer step sin completar; `EXPORT` cuando ya lo están todos.
    pub fn first_incomplete(&self) -> StepId {
        StepId::ORDER.iter()
                     .copied()
                     .find(|s| !self.is_completed(*s))
                     .unwrap_or(StepId::LAST)
    }

    /// Terminal en cuanto EXPORT se completó al menos una vez.
    pub fn is_terminal(&self) -> bool {
        self.is_completed(StepId::Export)
    }

    /// Marca `step` como completado. El llamador garantiza los prerrequisitos.
    pub fn mark_completed(&mut self, step: StepId) {
        debug_assert!(self.prerequisites_met(step));
        self.steps_completed.insert(step);
    }

    /// Quita `from` y todo lo posterior de `steps_completed`, devolviendo en
    /// orden los steps que realmente dejaron de estar completados.
    pub fn uncomplete_from(&mut self, from: StepId) -> Vec<StepId> {
        let removed: Vec<StepId> = self.steps_completed.range(from..).copied().collect();
        for s in &removed {
            self.steps_completed.remove(s);
        }
        removed
    }

    /// Añade una entrada al historial con el siguiente número de secuencia.
    pub fn record(&mut self, kind: WorkflowEventKind) -> &WorkflowEvent {
        let seq = self.history.len() as u64;
        let ts = Utc::now();
        self.updated_at = ts;
        self.history.push(WorkflowEvent { seq, ts, kind });
        &self.history[self.history.len() - 1]
    }

    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    pub fn version(&self, version_number: u32) -> Option<&Version> {
        self.versions.iter().find(|v| v.version_number == version_number)
    }

    pub fn next_version_number(&self) -> u32 {
        self.latest_version().map_or(1, |v| v.version_number + 1)
    }

    /// Título con el que se conoce el documento: la salida aceptada de TITLE si
    /// existe, si no el título de trabajo.
    pub fn effective_title(&self) -> &str {
        self.outputs
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.document_title)
    }
}

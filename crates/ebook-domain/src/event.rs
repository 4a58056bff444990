//! Historial del flujo.
//!
//! Cada transición confirmada de un `WorkflowInstance` añade un
//! `WorkflowEvent`. El historial viaja dentro del registro, de modo que un
//! flujo reanudado puede explicar cómo llegó a su posición actual. Es solo
//! auditoría: el motor nunca lo reproduce para reconstruir el estado.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StepId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEventKind {
    /// Se inició una generación (o ensamblado/exportación) de `step`.
    StepStarted { step: StepId },
    /// `step` produjo una salida. No implica que el step haya avanzado.
    StepGenerated { step: StepId, fingerprint: String },
    StepFailed { step: StepId, error: String },
    StepAdvanced { from: StepId, to: StepId },
    StepSkipped { step: StepId },
    ManualEdit { step: StepId, fingerprint: String },
    /// Se quitó la compleción de `steps` porque `cause` cambió aguas arriba.
    StepsInvalidated { cause: StepId, steps: Vec<StepId> },
    ChapterGenerated { index: usize, fingerprint: String },
    ChapterFailed { index: usize, error: String },
    /// Había una marca de generación en curso persistida sin generación viva.
    GenerationAbandoned { step: StepId },
    Exported { version_number: u32, artifact_reference: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub seq: u64, // denso desde 0 por instancia
    pub ts: DateTime<Utc>,
    pub kind: WorkflowEventKind,
}

impl WorkflowEventKind {
    /// Nombre corto y estable para logs.
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEventKind::StepStarted { .. } => "StepStarted",
            WorkflowEventKind::StepGenerated { .. } => "StepGenerated",
            WorkflowEventKind::StepFailed { .. } => "StepFailed",
            WorkflowEventKind::StepAdvanced { .. } => "StepAdvanced",
            WorkflowEventKind::StepSkipped { .. } => "StepSkipped",
            WorkflowEventKind::ManualEdit { .. } => "ManualEdit",
            WorkflowEventKind::StepsInvalidated { .. } => "StepsInvalidated",
            WorkflowEventKind::ChapterGenerated { .. } => "ChapterGenerated",
            WorkflowEventKind::ChapterFailed { .. } => "ChapterFailed",
            WorkflowEventKind::GenerationAbandoned { .. } => "GenerationAbandoned",
            WorkflowEventKind::Exported { .. } => "Exported",
        }
    }
}

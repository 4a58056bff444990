use ebook_domain::{StepId, WorkflowInstance};
use serde::Serialize;
use uuid::Uuid;

use crate::step::StepStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepState {
    pub step: StepId,
    pub status: StepStatus,
    pub optional: bool,
}

/// Instantánea de solo lectura para mostrar el progreso.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStatus {
    pub id: Uuid,
    pub title: String,
    pub current_step: StepId,
    pub steps: Vec<StepState>,
    pub per_step_progress: f32,
    /// Hay una generación en curso en este proceso.
    pub is_generating: bool,
    /// El registro indica una generación en curso pero nadie tiene la
    /// instancia: la llamada se abandonó y `resume` la limpiará.
    pub needs_resume: bool,
    pub last_error: Option<String>,
    pub chapters_done: usize,
    pub chapters_total: usize,
    pub latest_version: Option<u32>,
    pub revision: u64,
}

impl WorkflowStatus {
    pub(crate) fn from_instance(wf: &WorkflowInstance, held: bool, optional: impl Fn(StepId) -> bool) -> Self {
        let generating = wf.is_generating && held;
        let steps = StepId::ORDER.iter()
                                 .map(|&step| {
                                     let status = if wf.is_completed(step) {
                                         StepStatus::Completed
                                     } else if step != wf.current_step {
                                         StepStatus::Pending
                                     } else if generating {
                                         StepStatus::Running
                                     } else if wf.last_error.is_some() {
                                         StepStatus::Failed
                                     } else {
                                         StepStatus::Current
                                     };
                                     StepState { step,
                                                 status,
                                                 optional: optional(step) }
                                 })
                                 .collect();
        Self { id: wf.id,
               title: wf.effective_title().to_string(),
               current_step: wf.current_step,
               steps,
               per_step_progress: wf.per_step_progress,
               is_generating: generating,
               needs_resume: wf.is_generating && !held,
               last_error: wf.last_error.clone(),
               chapters_done: wf.outputs.chapters_done(),
               chapters_total: wf.outputs.chapters.len(),
               latest_version: wf.latest_version().map(|v| v.version_number),
               revision: wf.revision }
    }

    pub fn step(&self, step: StepId) -> StepStatus {
        self.steps[step.position()].status
    }

    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status == StepStatus::Completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_step_reflects_failure_and_generation() {
        let mut wf = WorkflowInstance::new("o", "t");
        wf.mark_completed(StepId::Input);
        wf.current_step = StepId::Title;
        wf.last_error = Some("timeout".into());
        let s = WorkflowStatus::from_instance(&wf, false, |_| false);
        assert_eq!(s.step(StepId::Input), StepStatus::Completed);
        assert_eq!(s.step(StepId::Title), StepStatus::Failed);
        assert_eq!(s.step(StepId::Toc), StepStatus::Pending);

        wf.is_generating = true;
        assert_eq!(WorkflowStatus::from_instance(&wf, true, |_| false).step(StepId::Title),
                   StepStatus::Running);
        let stale = WorkflowStatus::from_instance(&wf, false, |_| false);
        assert!(stale.needs_resume);
        assert!(!stale.is_generating);
    }
}

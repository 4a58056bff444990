//! Drivers de conveniencia sobre una única instancia de flujo.

use ebook_domain::{StepId, WorkflowInstance};
use log::debug;
use uuid::Uuid;

use super::core::WorkflowEngine;
use crate::errors::WorkflowError;
use crate::repo::WorkflowRepository;

/// Lleva una instancia usando las operaciones públicas del motor.
///
/// `step` ejecuta el step actual si aún no tiene salida válida y luego lo
/// avanza; `run_to_completion` lo repite hasta terminar EXPORT.
pub struct WorkflowCtx<'a, R: WorkflowRepository> {
    engine: &'a WorkflowEngine<R>,
    id: Uuid,
    input: Option<String>,
    guidance: Option<String>,
}

impl<'a, R: WorkflowRepository> WorkflowCtx<'a, R> {
    #[inline]
    pub fn new(engine: &'a WorkflowEngine<R>, id: Uuid) -> Self {
        Self { engine,
               id,
               input: None,
               guidance: None }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Texto que se guarda en INPUT si la instancia aún no tiene.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Instrucciones extra para todos los steps de generación.
    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }

    /// Ejecuta y avanza el step actual. `None` cuando el flujo ya está
    /// completo.
    pub async fn step(&mut self) -> Result<Option<StepId>, WorkflowError> {
        let wf = self.engine.resume(self.id)?;
        if wf.is_terminal() {
            return Ok(None);
        }
        let step = wf.current_step;
        let registry = self.engine.registry();
        if self.engine.config().skip_optional_steps && registry.is_optional(step) {
            self.engine.skip_step(self.id)?;
            debug!("ctx: skipped id={} step={}", self.id, step);
            return Ok(Some(step));
        }
        if registry.get(step).validate(&wf).is_err() {
            let guidance = if step == StepId::Input { self.input.as_deref() } else { self.guidance.as_deref() };
            self.engine.start_step(self.id, step, guidance).await?;
        }
        self.engine.advance(self.id)?;
        debug!("ctx: advanced id={} step={}", self.id, step);
        Ok(Some(step))
    }

    /// Repite `step` hasta completar todos los steps y devuelve el registro final.
    pub async fn run_to_completion(&mut self) -> Result<WorkflowInstance, WorkflowError> {
        while self.step().await?.is_some() {}
        self.engine.load(self.id)
    }
}

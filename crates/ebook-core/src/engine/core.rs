//! Core `WorkflowEngine` implementation.

use std::sync::Arc;

use chrono::Utc;
use ebook_domain::{chapters_match_toc, Chapter, ContentSource, DocumentModel, StepId, Version, WorkflowEventKind,
                   WorkflowInstance};
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::builder::EngineBuilder;
use super::latch::{GenerationLatch, LatchGuard};
use super::status::WorkflowStatus;
use super::workflow_ctx::WorkflowCtx;
use crate::assembly;
use crate::config::EngineConfig;
use crate::errors::WorkflowError;
use crate::export::{DocumentExporter, ExportedArtifact};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::hashing::{artifact_reference, hash_value};
use crate::repo::WorkflowRepository;
use crate::step::{PromptContext, StepKind, StepRegistry, StepValue};

/// Lleva cada `WorkflowInstance` por la secuencia de steps.
///
/// El motor no guarda estado por instancia salvo el mapa de latches: cada
/// operación carga el registro, aplica una transición y lo guarda antes de
/// volver, así que puede destruirse y reconstruirse en cualquier momento.
pub struct WorkflowEngine<R>
    where R: WorkflowRepository
{
    repository: R,
    client: Arc<dyn GenerationClient>,
    registry: StepRegistry,
    exporter: Option<Box<dyn DocumentExporter>>,
    config: EngineConfig,
    latch: GenerationLatch,
}

impl<R> WorkflowEngine<R> where R: WorkflowRepository
{
    #[inline]
    pub fn builder(repository: R, client: Arc<dyn GenerationClient>) -> EngineBuilder<R> {
        EngineBuilder::new(repository, client)
    }

    pub(crate) fn from_parts(repository: R,
                             client: Arc<dyn GenerationClient>,
                             registry: StepRegistry,
                             exporter: Option<Box<dyn DocumentExporter>>,
                             config: EngineConfig)
                             -> Self {
        Self { repository,
               client,
               registry,
               exporter,
               config,
               latch: GenerationLatch::new() }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn exporter(&self) -> Option<&dyn DocumentExporter> {
        self.exporter.as_deref()
    }

    /// Handle con los drivers paso a paso y hasta completar.
    pub fn workflow(&self, id: Uuid) -> WorkflowCtx<'_, R> {
        WorkflowCtx::new(self, id)
    }

    // ----- ciclo de vida -----

    pub fn create(&self, owner_id: &str, working_title: &str) -> Result<WorkflowInstance, WorkflowError> {
        let mut wf = WorkflowInstance::new(owner_id, working_title);
        self.persist(&mut wf)?;
        info!("create: id={} owner={}", wf.id, wf.owner_id);
        Ok(wf)
    }

    pub fn load(&self, id: Uuid) -> Result<WorkflowInstance, WorkflowError> {
        Ok(self.repository.load(id)?)
    }

    pub fn status(&self, id: Uuid) -> Result<WorkflowStatus, WorkflowError> {
        let wf = self.load(id)?;
        Ok(WorkflowStatus::from_instance(&wf, self.latch.is_held(id), |s| self.registry.is_optional(s)))
    }

    /// Reconstruye una posición consistente a partir del registro persistido.
    ///
    /// Limpia la marca de generación en curso que deja una llamada abandonada
    /// y realinea `current_step` con el primer step incompleto. Solo guarda si
    /// hubo algo que reparar.
    pub fn resume(&self, id: Uuid) -> Result<WorkflowInstance, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        if self.repair(&mut wf) {
            self.persist(&mut wf)?;
            info!("resume: repaired id={} step={}", id, wf.current_step);
        } else {
            debug!("resume: clean id={} step={}", id, wf.current_step);
        }
        Ok(wf)
    }

    // ----- ejecución de steps -----

    /// Ejecuta `step`: guarda la entrada del usuario, genera, ensambla o
    /// exporta según el tipo de step.
    ///
    /// `guidance` es el texto de entrada en INPUT y las instrucciones extra en
    /// los steps generados. Iniciar un step ya completado lo regenera.
    pub async fn start_step(&self,
                            id: Uuid,
                            step: StepId,
                            guidance: Option<&str>)
                            -> Result<WorkflowInstance, WorkflowError> {
        self.run_step(id, step, guidance, false).await
    }

    /// Como `start_step`, pero en CHAPTERS vuelve a generar todos los
    /// capítulos. Cada capítulo conserva su contenido anterior hasta que se
    /// acepta su reemplazo, y nada posterior se invalida antes de eso.
    pub async fn regenerate(&self,
                            id: Uuid,
                            step: StepId,
                            guidance: Option<&str>)
                            -> Result<WorkflowInstance, WorkflowError> {
        self.run_step(id, step, guidance, true).await
    }

    /// Genera en orden cada capítulo que aún no tiene contenido.
    pub async fn generate_chapters(&self, id: Uuid) -> Result<WorkflowInstance, WorkflowError> {
        self.run_step(id, StepId::Chapters, None, false).await
    }

    async fn run_step(&self,
                      id: Uuid,
                      step: StepId,
                      guidance: Option<&str>,
                      fresh: bool)
                      -> Result<WorkflowInstance, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        self.check_startable(&wf, step)?;
        let kind = self.registry.get(step).kind();
        let fresh = fresh || wf.is_completed(step);
        info!("start_step:start id={} step={} kind={:?} fresh={}", id, step, kind, fresh);

        match kind {
            StepKind::UserInput => self.run_user_input(&mut wf, step, guidance)?,
            StepKind::Generation => self.run_generation(&mut wf, step, guidance).await?,
            StepKind::MultiPart => self.run_chapters(&mut wf, guidance, fresh).await?,
            StepKind::Assembly => {
                self.run_assembly(&mut wf)?;
            }
            StepKind::Export => {
                self.run_export(&mut wf)?;
            }
        }
        info!("start_step:done id={} step={} revision={}", id, step, wf.revision);
        Ok(wf)
    }

    fn run_user_input(&self,
                      wf: &mut WorkflowInstance,
                      step: StepId,
                      input: Option<&str>)
                      -> Result<(), WorkflowError> {
        let text = input.map(str::trim)
                        .filter(|t| !t.is_empty())
                        .ok_or_else(|| WorkflowError::validation(step, "input text is required"))?;
        self.reopen(wf, step);
        let fingerprint = self.apply_value(wf, step, StepValue::text(text), ContentSource::Edited, None)?;
        wf.record(WorkflowEventKind::ManualEdit { step, fingerprint });
        self.finish_output(wf, step)
    }

    async fn run_generation(&self,
                            wf: &mut WorkflowInstance,
                            step: StepId,
                            guidance: Option<&str>)
                            -> Result<(), WorkflowError> {
        let def = self.registry.get(step);
        let prompt = def.prompt(&PromptContext::new(wf).with_guidance(guidance))
                        .ok_or_else(|| WorkflowError::validation(step, "step has no prompt"))?;
        let request = GenerationRequest { prompt,
                                          model: def.model().to_string(),
                                          params: def.params() };
        wf.record(WorkflowEventKind::StepStarted { step });
        let raw = self.generate(wf, step, &request).await?;
        let value = match def.accept(&raw) {
            Ok(v) => v,
            Err(reason) => return Err(self.fail(wf, step, reason)?),
        };
        self.reopen(wf, step);
        let fingerprint = self.apply_value(wf, step, value, ContentSource::Generated, Some(request.model))?;
        wf.record(WorkflowEventKind::StepGenerated { step, fingerprint });
        self.finish_output(wf, step)
    }

    /// CHAPTERS: una llamada por capítulo pendiente, persistiendo tras cada una.
    async fn run_chapters(&self,
                          wf: &mut WorkflowInstance,
                          guidance: Option<&str>,
                          fresh: bool)
                          -> Result<(), WorkflowError> {
        let step = StepId::Chapters;
        self.ensure_chapter_slots(wf, step)?;
        let def = self.registry.get(step);
        let total = wf.outputs.chapters.len();
        let pending: Vec<usize> = wf.outputs
                                    .chapters
                                    .iter()
                                    .filter(|c| fresh || !c.has_content())
                                    .map(|c| c.index)
                                    .collect();
        if !fresh {
            wf.per_step_progress = progress(wf.outputs.chapters_done(), total);
        }
        if !pending.is_empty() {
            wf.record(WorkflowEventKind::StepStarted { step });
        }
        debug!("generate_chapters: id={} pending={:?} total={} fresh={}", wf.id, pending, total, fresh);

        // el contenido anterior se mantiene hasta aceptar su reemplazo
        for (n, &index) in pending.iter().enumerate() {
            let prompt = def.prompt(&PromptContext::new(wf).with_guidance(guidance).for_chapter(index))
                            .ok_or_else(|| WorkflowError::validation(step, format!("no prompt for chapter {}", index + 1)))?;
            let request = GenerationRequest { prompt,
                                              model: def.model().to_string(),
                                              params: def.params() };
            wf.is_generating = true;
            self.persist(wf)?;
            let result = self.client.generate(&request).await;
            wf.is_generating = false;

            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("generate_chapters: chapter failed id={} index={}: {}", wf.id, index, e);
                    wf.last_error = Some(format!("chapter {}: {}", index + 1, e));
                    wf.record(WorkflowEventKind::ChapterFailed { index,
                                                                 error: e.to_string() });
                    self.persist(wf)?;
                    return Err(WorkflowError::GenerationUnavailable { step, source: e });
                }
            };
            let accepted = def.accept(&raw).and_then(|v| match v {
                                               StepValue::Chapter { content, .. } | StepValue::Text(content) => Ok(content),
                                               other => Err(format!("unexpected {} output", other.describe())),
                                           });
            let content = match accepted {
                Ok(content) => content,
                Err(reason) => {
                    wf.last_error = Some(format!("chapter {}: {}", index + 1, reason));
                    wf.record(WorkflowEventKind::ChapterFailed { index,
                                                                 error: reason.clone() });
                    self.persist(wf)?;
                    return Err(WorkflowError::validation(step, reason));
                }
            };
            self.reopen(wf, step);
            let fingerprint = self.apply_value(wf,
                                               step,
                                               StepValue::Chapter { index, content },
                                               ContentSource::Generated,
                                               Some(request.model))?;
            wf.record(WorkflowEventKind::ChapterGenerated { index, fingerprint });
            wf.per_step_progress = progress(total - pending.len() + n + 1, total);
            wf.last_error = None;
            self.persist(wf)?;
            info!("generate_chapters: chapter done id={} index={} progress={:.0}",
                  wf.id,
                  index,
                  wf.per_step_progress);
        }

        let fingerprint = output_fingerprint(wf, step);
        wf.record(WorkflowEventKind::StepGenerated { step, fingerprint });
        self.finish_output(wf, step)
    }

    /// ASSEMBLE. Repetirlo sobre salidas sin cambios no hace nada pero
    /// devuelve igualmente el documento.
    fn run_assembly(&self, wf: &mut WorkflowInstance) -> Result<DocumentModel, WorkflowError> {
        let step = StepId::Assemble;
        let document = match assembly::assemble(wf) {
            Ok(doc) => doc,
            Err(e) => {
                let err = WorkflowError::from(e);
                wf.last_error = Some(err.to_string());
                wf.record(WorkflowEventKind::StepFailed { step,
                                                          error: err.to_string() });
                self.persist(wf)?;
                return Err(err);
            }
        };
        let fingerprint = hash_value(&document);
        if wf.outputs.document_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            wf.outputs.document_fingerprint = Some(fingerprint.clone());
            wf.record(WorkflowEventKind::StepGenerated { step, fingerprint });
            self.finish_output(wf, step)?;
        }
        debug!("assemble: id={} words={}", wf.id, document.word_count());
        Ok(document)
    }

    fn run_export(&self, wf: &mut WorkflowInstance) -> Result<ExportedArtifact, WorkflowError> {
        let exporter = self.exporter.as_deref().ok_or(WorkflowError::ExporterMissing)?;
        let document = assembly::assemble(wf)?;
        let output = exporter.export(&document);
        let version = Version { version_number: wf.next_version_number(),
                                artifact_reference: artifact_reference(&output.bytes),
                                created_at: Utc::now(),
                                media_type: exporter.media_type().to_string(),
                                page_count: output.page_count,
                                byte_len: output.bytes.len(),
                                document_fingerprint: Some(hash_value(&document)) };
        wf.versions.push(version.clone());
        wf.record(WorkflowEventKind::Exported { version_number: version.version_number,
                                                artifact_reference: version.artifact_reference.clone() });
        wf.last_error = None;
        self.persist(wf)?;
        info!("export: id={} version={} pages={} bytes={}",
              wf.id,
              version.version_number,
              version.page_count,
              version.byte_len);
        Ok(ExportedArtifact { media_type: version.media_type.clone(),
                              version,
                              bytes: output.bytes })
    }

    /// Ensambla el documento (ASSEMBLE debe poder iniciarse) y lo devuelve.
    pub fn assemble(&self, id: Uuid) -> Result<DocumentModel, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        self.check_startable(&wf, StepId::Assemble)?;
        self.run_assembly(&mut wf)
    }

    /// Exporta una nueva `Version`. Se permite de nuevo con EXPORT completado.
    pub fn export(&self, id: Uuid) -> Result<ExportedArtifact, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        if self.exporter.is_none() {
            return Err(WorkflowError::ExporterMissing);
        }
        self.check_startable(&wf, StepId::Export)?;
        self.run_export(&mut wf)
    }

    // ----- transiciones -----

    /// Completa el step actual y pasa al siguiente.
    pub fn advance(&self, id: Uuid) -> Result<WorkflowInstance, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        let step = wf.current_step;
        if wf.is_completed(step) {
            return Err(WorkflowError::PrerequisiteNotMet(format!("{step} is already completed")));
        }
        self.check_startable(&wf, step)?;
        self.registry
            .get(step)
            .validate(&wf)
            .map_err(|reason| WorkflowError::validation(step, reason))?;
        self.complete_current(&mut wf, step);
        wf.record(WorkflowEventKind::StepAdvanced { from: step,
                                                    to: wf.current_step });
        self.persist(&mut wf)?;
        info!("advance: id={} from={} to={}", id, step, wf.current_step);
        Ok(wf)
    }

    /// Completa el step actual sin salida. Solo para steps opcionales.
    pub fn skip_step(&self, id: Uuid) -> Result<WorkflowInstance, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        let step = wf.current_step;
        if !self.registry.is_optional(step) {
            return Err(WorkflowError::validation(step, format!("{step} is not optional")));
        }
        if wf.is_completed(step) {
            return Err(WorkflowError::PrerequisiteNotMet(format!("{step} is already completed")));
        }
        self.check_startable(&wf, step)?;
        wf.outputs.clear(step);
        self.complete_current(&mut wf, step);
        wf.record(WorkflowEventKind::StepSkipped { step });
        self.persist(&mut wf)?;
        info!("skip_step: id={} step={}", id, step);
        Ok(wf)
    }

    /// Guarda una salida aportada por el usuario para `step`, sin generar.
    ///
    /// Editar un step completado lo descompleta junto con los posteriores y
    /// descarta las salidas de estos. El valor guardado debe pasar la
    /// validación antes de poder avanzar.
    pub fn save_manual_edit(&self, id: Uuid, step: StepId, value: StepValue) -> Result<WorkflowInstance, WorkflowError> {
        let (_guard, mut wf) = self.begin(id)?;
        self.repair(&mut wf);
        if matches!(self.registry.get(step).kind(), StepKind::Assembly | StepKind::Export) {
            return Err(WorkflowError::validation(step, format!("{step} is derived and cannot be edited")));
        }
        if !value.fits(step) {
            return Err(WorkflowError::validation(step, format!("{step} does not accept a {} value", value.describe())));
        }
        self.check_startable(&wf, step)?;
        self.reopen(&mut wf, step);
        let fingerprint = self.apply_value(&mut wf, step, value, ContentSource::Edited, None)?;
        wf.record(WorkflowEventKind::ManualEdit { step, fingerprint });
        if step == StepId::Chapters {
            wf.per_step_progress = progress(wf.outputs.chapters_done(), wf.outputs.chapters.len());
        }
        wf.last_error = None;
        self.persist(&mut wf)?;
        info!("save_manual_edit: id={} step={}", id, step);
        Ok(wf)
    }

    // ----- internos -----

    /// Toma el latch de `id` y carga el registro.
    fn begin(&self, id: Uuid) -> Result<(LatchGuard, WorkflowInstance), WorkflowError> {
        let guard = self.latch
                        .try_acquire(id)
                        .ok_or(WorkflowError::ConcurrentGenerationInProgress(id))?;
        let wf = self.repository.load(id)?;
        Ok((guard, wf))
    }

    /// Arregla lo que puede dejar una operación interrumpida. Devuelve si
    /// cambió algo. Debe ejecutarse con el latch tomado.
    fn repair(&self, wf: &mut WorkflowInstance) -> bool {
        let mut changed = false;
        if wf.is_generating {
            // tenemos el latch: nada en este proceso está generando
            warn!("resume: abandoned generation id={} step={}", wf.id, wf.current_step);
            wf.is_generating = false;
            let step = wf.current_step;
            wf.record(WorkflowEventKind::GenerationAbandoned { step });
            changed = true;
        }
        if !wf.is_prefix_closed() {
            let first = wf.first_incomplete();
            let removed = wf.uncomplete_from(first);
            warn!("resume: completion had holes id={} dropped={:?}", wf.id, removed);
            changed = true;
        }
        let expected = wf.first_incomplete();
        if wf.current_step != expected {
            warn!("resume: current step drifted id={} stored={} expected={}",
                  wf.id,
                  wf.current_step,
                  expected);
            wf.current_step = expected;
            changed = true;
        }
        if wf.current_step == StepId::Chapters {
            let p = progress(wf.outputs.chapters_done(), wf.outputs.chapters.len());
            if (wf.per_step_progress - p).abs() > f32::EPSILON {
                wf.per_step_progress = p;
                changed = true;
            }
        }
        changed
    }

    fn check_startable(&self, wf: &WorkflowInstance, step: StepId) -> Result<(), WorkflowError> {
        if let Some(missing) = step.predecessors().iter().find(|s| !wf.is_completed(**s)) {
            return Err(WorkflowError::PrerequisiteNotMet(format!("{step} requires {missing} to be completed first")));
        }
        if step != wf.current_step && !wf.is_completed(step) {
            return Err(WorkflowError::PrerequisiteNotMet(format!("{step} is not the current step ({})",
                                                                 wf.current_step)));
        }
        Ok(())
    }

    /// Invalidación retroactiva: si `step` estaba completado, él y los steps
    /// posteriores pierden la compleción y los posteriores sus salidas.
    /// Se llama solo cuando ya hay un valor nuevo aceptado para `step`.
    fn reopen(&self, wf: &mut WorkflowInstance, step: StepId) {
        if !wf.is_completed(step) {
            return;
        }
        let removed = wf.uncomplete_from(step);
        for later in step.successors() {
            wf.outputs.clear(*later);
        }
        wf.current_step = step;
        wf.per_step_progress = 0.0;
        info!("invalidate: id={} cause={} steps={:?}", wf.id, step, removed);
        wf.record(WorkflowEventKind::StepsInvalidated { cause: step,
                                                        steps: removed });
    }

    fn ensure_chapter_slots(&self, wf: &mut WorkflowInstance, step: StepId) -> Result<(), WorkflowError> {
        let toc = wf.outputs
                    .table_of_contents
                    .as_ref()
                    .ok_or_else(|| WorkflowError::PrerequisiteNotMet(format!("{step} requires a table of contents")))?;
        if !chapters_match_toc(&wf.outputs.chapters, toc) {
            debug!("chapters: rebuilding slots id={} count={}", wf.id, toc.len());
            wf.outputs.chapters = Chapter::slots_for(toc);
        }
        Ok(())
    }

    /// Guarda `value` como salida de `step` y devuelve su fingerprint.
    fn apply_value(&self,
                   wf: &mut WorkflowInstance,
                   step: StepId,
                   value: StepValue,
                   source: ContentSource,
                   model: Option<String>)
                   -> Result<String, WorkflowError> {
        if !value.fits(step) {
            return Err(WorkflowError::validation(step, format!("{step} does not accept a {} value", value.describe())));
        }
        let fingerprint = match value {
            StepValue::Text(text) => {
                let fp = hash_value(&text);
                let o = &mut wf.outputs;
                let slot = match step {
                    StepId::Input => &mut o.input,
                    StepId::Title => &mut o.title,
                    StepId::Introduction => &mut o.introduction,
                    StepId::Conclusion => &mut o.conclusion,
                    _ => &mut o.review,
                };
                *slot = Some(text);
                fp
            }
            StepValue::TableOfContents(toc) => {
                let fp = hash_value(&toc);
                wf.outputs.chapters = Chapter::slots_for(&toc);
                wf.outputs.table_of_contents = Some(toc);
                fp
            }
            StepValue::Chapter { index, content } => {
                self.ensure_chapter_slots(wf, step)?;
                let slot = wf.outputs
                             .chapters
                             .get_mut(index)
                             .ok_or_else(|| WorkflowError::validation(step, format!("chapter {} does not exist", index + 1)))?;
                let fp = hash_value(&content);
                slot.set_content(content, source, model);
                fp
            }
        };
        Ok(fingerprint)
    }

    /// Marca el step actual como completado y pasa al primero incompleto.
    fn complete_current(&self, wf: &mut WorkflowInstance, step: StepId) {
        wf.mark_completed(step);
        wf.current_step = wf.first_incomplete();
        wf.last_error = None;
        wf.per_step_progress = 0.0;
    }

    /// Valida una salida recién guardada y persiste el resultado.
    fn finish_output(&self, wf: &mut WorkflowInstance, step: StepId) -> Result<(), WorkflowError> {
        match self.registry.get(step).validate(wf) {
            Ok(()) => {
                wf.last_error = None;
                self.persist(wf)
            }
            Err(reason) => Err(self.fail(wf, step, reason)?),
        }
    }

    /// Registra un fallo de validación y devuelve el error a lanzar.
    fn fail(&self, wf: &mut WorkflowInstance, step: StepId, reason: String) -> Result<WorkflowError, WorkflowError> {
        warn!("validation failed id={} step={}: {}", wf.id, step, reason);
        wf.last_error = Some(reason.clone());
        wf.record(WorkflowEventKind::StepFailed { step,
                                                  error: reason.clone() });
        self.persist(wf)?;
        Ok(WorkflowError::validation(step, reason))
    }

    /// Una llamada de generación con la marca en curso persistida alrededor.
    async fn generate(&self,
                      wf: &mut WorkflowInstance,
                      step: StepId,
                      request: &GenerationRequest)
                      -> Result<String, WorkflowError> {
        wf.is_generating = true;
        self.persist(wf)?;
        debug!("generate: id={} step={} model={} prompt_chars={}",
               wf.id,
               step,
               request.model,
               request.prompt.len());
        let result = self.client.generate(request).await;
        wf.is_generating = false;
        match result {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("generate: failed id={} step={}: {}", wf.id, step, e);
                wf.last_error = Some(e.to_string());
                wf.record(WorkflowEventKind::StepFailed { step,
                                                          error: e.to_string() });
                self.persist(wf)?;
                Err(WorkflowError::GenerationUnavailable { step, source: e })
            }
        }
    }

    /// Guardado write-through; incrementa la revisión que comprueba el store.
    fn persist(&self, wf: &mut WorkflowInstance) -> Result<(), WorkflowError> {
        wf.revision += 1;
        wf.updated_at = Utc::now();
        if let Err(e) = self.repository.save(wf) {
            wf.revision -= 1;
            error!("persist: failed id={} revision={}: {}", wf.id, wf.revision + 1, e);
            return Err(e.into());
        }
        debug!("persist: id={} revision={} last_event={}",
               wf.id,
               wf.revision,
               wf.history.last().map_or("-", |e| e.kind.name()));
        Ok(())
    }
}

fn progress(done: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        done as f32 / total as f32 * 100.0
    }
}

fn output_fingerprint(wf: &WorkflowInstance, step: StepId) -> String {
    let o = &wf.outputs;
    match step {
        StepId::Input => hash_value(&o.input),
        StepId::Title => hash_value(&o.title),
        StepId::Toc => hash_value(&o.table_of_contents),
        StepId::Chapters => hash_value(&o.chapters.iter().map(|c| c.content.as_deref()).collect::<Vec<_>>()),
        StepId::Introduction => hash_value(&o.introduction),
        StepId::Conclusion => hash_value(&o.conclusion),
        StepId::Assemble => hash_value(&o.document_fingerprint),
        StepId::Review => hash_value(&o.review),
        StepId::Export => hash_value(&wf.versions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_a_percentage() {
        assert_eq!(progress(0, 0), 0.0);
        assert_eq!(progress(1, 4), 25.0);
        assert_eq!(progress(2, 2), 100.0);
    }

    #[test]
    fn fingerprints_follow_stored_output() {
        let mut wf = WorkflowInstance::new("o", "t");
        let empty = output_fingerprint(&wf, StepId::Title);
        wf.outputs.title = Some("A".into());
        assert_ne!(empty, output_fingerprint(&wf, StepId::Title));
        assert_eq!(output_fingerprint(&wf, StepId::Title), output_fingerprint(&wf.clone(), StepId::Title));
    }
}

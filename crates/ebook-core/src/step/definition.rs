use ebook_domain::{StepId, WorkflowInstance};

use super::value::StepValue;
use crate::generation::GenerationParams;

/// Cómo maneja el motor un step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// La salida la aporta el usuario, sin generación.
    UserInput,
    /// Una llamada de generación.
    Generation,
    /// Una llamada de generación por entrada del índice.
    MultiPart,
    /// Ensamblado determinista de salidas previas.
    Assembly,
    /// Produce un artefacto exportado y una `Version`.
    Export,
}

/// Forma del valor que guarda un step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Text,
    TableOfContents,
    Chapters,
    DocumentFingerprint,
    Versions,
}

/// Datos disponibles para construir un prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub instance: &'a WorkflowInstance,
    /// Instrucciones extra del usuario para esta ejecución.
    pub guidance: Option<&'a str>,
    /// Capítulo en generación, para steps de varias partes.
    pub chapter_index: Option<usize>,
}

impl<'a> PromptContext<'a> {
    pub fn new(instance: &'a WorkflowInstance) -> Self {
        Self { instance,
               guidance: None,
               chapter_index: None }
    }

    pub fn with_guidance(mut self, guidance: Option<&'a str>) -> Self {
        self.guidance = guidance.filter(|g| !g.trim().is_empty());
        self
    }

    pub fn for_chapter(mut self, index: usize) -> Self {
        self.chapter_index = Some(index);
        self
    }
}

/// Entrada de la tabla de steps.
///
/// Las implementaciones son puras: `prompt` y `validate` dependen solo de
/// sus argumentos. Todo el texto propio de cada step vive tras este trait y
/// el motor nunca decide según el contenido de un prompt.
pub trait StepDefinition: Send + Sync {
    fn id(&self) -> StepId;

    fn name(&self) -> &str {
        self.id().as_str()
    }

    fn kind(&self) -> StepKind;

    /// Steps previos cuyas salidas lee este step.
    fn requires(&self) -> &'static [StepId] {
        self.id().predecessors()
    }

    /// Identificador del modelo en steps de generación; vacío en el resto.
    fn model(&self) -> &str {
        ""
    }

    fn params(&self) -> GenerationParams {
        GenerationParams::default()
    }

    fn optional(&self) -> bool {
        false
    }

    fn output_shape(&self) -> OutputShape;

    /// Prompt de la llamada de generación; `None` en steps que no generan.
    fn prompt(&self, _ctx: &PromptContext<'_>) -> Option<String> {
        None
    }

    /// Convierte la salida cruda del modelo en el valor a guardar.
    ///
    /// # Errores
    /// Un motivo legible cuando la salida no se puede usar.
    fn accept(&self, raw: &str) -> Result<StepValue, String> {
        Ok(StepValue::Text(raw.trim().to_string()))
    }

    /// Predicado de avance sobre las salidas guardadas.
    ///
    /// # Errores
    /// Un motivo legible de por qué el step no puede avanzar.
    fn validate(&self, instance: &WorkflowInstance) -> Result<(), String>;
}

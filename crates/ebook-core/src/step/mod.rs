//! Definiciones de steps.
//!
//! Cada etapa del flujo se describe con un `StepDefinition`: su tipo, el
//! modelo y parámetros con que genera, un constructor de prompt puro y la
//! regla de validación que protege el avance. `StepRegistry` guarda la tabla
//! ordenada que consulta el motor; el motor no contiene texto propio de
//! ningún step.

pub mod builtin;
pub mod definition;
pub mod registry;
mod status;
pub mod toc_parser;
mod value;

pub use definition::{OutputShape, PromptContext, StepDefinition, StepKind};
pub use registry::{RegistryError, StepRegistry};
pub use status::StepStatus;
pub use toc_parser::parse_table_of_contents;
pub use value::StepValue;

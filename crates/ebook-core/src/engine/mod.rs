//! Motor de flujo: la máquina de estados, su builder y sus drivers.

pub mod builder;
pub mod core;
mod latch;
mod status;
pub mod workflow_ctx;

pub use builder::EngineBuilder;
pub use self::core::WorkflowEngine;
pub use latch::{GenerationLatch, LatchGuard};
pub use status::{StepState, WorkflowStatus};
pub use workflow_ctx::WorkflowCtx;

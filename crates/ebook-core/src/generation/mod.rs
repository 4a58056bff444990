//! Contrato con el backend de generación de texto.
//!
//! El motor solo conoce "enviar prompt + modelo, recibir texto o fallo".
//! Los clientes de cada proveedor implementan `GenerationClient`;
//! `RetryingClient` añade encima la política de timeout y reintentos.

mod mock;
mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use crate::errors::GenerationError;
pub use mock::{MockGenerationClient, MockReply};
pub use retry::RetryingClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: 0.7,
               max_tokens: 2048 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub params: GenerationParams,
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Devuelve el texto generado. Timeouts y reintentos son cosa de la
    /// implementación; el motor solo ve el resultado final.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: GenerationClient + ?Sized> GenerationClient for std::sync::Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}

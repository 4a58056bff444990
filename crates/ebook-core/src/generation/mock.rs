use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{GenerationClient, GenerationError, GenerationRequest};

/// Resultado guionizado, consumido en orden de inserción.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(GenerationError),
    /// Duerme (tiempo de tokio) antes de responder.
    Delayed(Duration, String),
    /// Espera hasta que salte el `Notify` y luego responde.
    Gated(Arc<Notify>, String),
}

type Responder = dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync;

/// `GenerationClient` en proceso para tests y demos.
///
/// Primero se sirven las respuestas del guion; vacío el guion responde el
/// responder opcional y, sin él, la llamada falla como `Unavailable`. Se
/// registran todas las peticiones, también las fallidas.
#[derive(Default)]
pub struct MockGenerationClient {
    script: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<GenerationRequest>>,
    responder: Option<Box<Responder>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responder<F>(responder: F) -> Self
        where F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static
    {
        Self { responder: Some(Box::new(responder)),
               ..Self::default() }
    }

    pub fn push(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(MockReply::Text(text.into()));
    }

    pub fn push_failure(&self, error: GenerationError) {
        self.push(MockReply::Fail(error));
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|r| r.prompt.clone()).collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        lock(&self.calls).push(request.clone());
        // el guard no puede vivir a través de un await
        let next = lock(&self.script).pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(e)) => Err(e),
            Some(MockReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(MockReply::Gated(gate, text)) => {
                gate.notified().await;
                Ok(text)
            }
            None => match &self.responder {
                Some(f) => f(request),
                None => Err(GenerationError::Unavailable("mock script exhausted".to_string())),
            },
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::{GenerationClient, GenerationError, GenerationRequest};
use crate::config::EngineConfig;

/// Envuelve un cliente con timeout por intento y reintentos acotados.
///
/// Política:
/// - cada intento se corta tras `timeout` y se informa como `Timeout`;
/// - `Timeout` y `Unavailable` se reintentan hasta `max_retries` veces con
///   backoff lineal (`backoff * attempt`);
/// - cualquier otro fallo se devuelve inmediatamente.
pub struct RetryingClient<C> {
    inner: C,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl<C: GenerationClient> RetryingClient<C> {
    pub fn new(inner: C, timeout: Duration, max_retries: u32, backoff: Duration) -> Self {
        Self { inner,
               timeout,
               max_retries,
               backoff }
    }

    pub fn from_config(inner: C, config: &EngineConfig) -> Self {
        Self::new(inner,
                  config.generation_timeout,
                  config.generation_max_retries,
                  config.generation_backoff)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[async_trait]
impl<C: GenerationClient> GenerationClient for RetryingClient<C> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mut attempts = 0u32;
        loop {
            match self.attempt(request).await {
                Err(e) if e.is_retryable() && attempts < self.max_retries => {
                    attempts += 1;
                    let delay = self.backoff * attempts;
                    warn!("generation retryable error (attempt {attempts}) model={}: {e} -> sleeping {}ms",
                          request.model,
                          delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
                r => {
                    debug!("generation done model={} attempts={} ok={}",
                           request.model,
                           attempts + 1,
                           r.is_ok());
                    return r;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationParams, MockGenerationClient, MockReply};

    fn request() -> GenerationRequest {
        GenerationRequest { prompt: "p".into(),
                            model: "m".into(),
                            params: GenerationParams::default() }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_then_succeeds() {
        let mock = MockGenerationClient::new();
        mock.push(MockReply::Fail(GenerationError::Unavailable("503".into())));
        mock.push(MockReply::Text("hello".into()));
        let client = RetryingClient::new(mock, Duration::from_secs(5), 2, Duration::from_millis(10));
        assert_eq!(client.generate(&request()).await.unwrap(), "hello");
        assert_eq!(client.inner().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let mock = MockGenerationClient::new();
        for _ in 0..3 {
            mock.push(MockReply::Fail(GenerationError::Unavailable("down".into())));
        }
        let client = RetryingClient::new(mock, Duration::from_secs(5), 1, Duration::from_millis(10));
        let err = client.generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::Unavailable("down".into()));
        assert_eq!(client.inner().call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let mock = MockGenerationClient::new();
        mock.push(MockReply::Delayed(Duration::from_secs(60), "late".into()));
        let client = RetryingClient::new(mock, Duration::from_secs(1), 0, Duration::ZERO);
        assert_eq!(client.generate(&request()).await.unwrap_err(), GenerationError::Timeout(1000));
    }

    #[tokio::test]
    async fn rejection_is_not_retried() {
        let mock = MockGenerationClient::new();
        mock.push(MockReply::Fail(GenerationError::Rejected("policy".into())));
        let client = RetryingClient::new(mock, Duration::from_secs(5), 3, Duration::ZERO);
        assert!(client.generate(&request()).await.is_err());
        assert_eq!(client.inner().call_count(), 1);
    }
}

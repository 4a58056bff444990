//! Configuración del motor cargada desde el entorno.
//!
//! Si existe un `.env` se carga una sola vez antes de la primera lectura.
//! Todas las variables son opcionales; un valor que no se puede parsear es
//! un error, nunca un retorno silencioso al valor por defecto.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use thiserror::Error;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // no tener .env es válido
});

/// Fuerza la carga temprana de `.env` para aplicaciones que leen otras variables.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Lee y parsea `key`; `Ok(None)` si no está definida o está vacía.
pub fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    init_dotenv();
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw.trim()
                      .parse()
                      .map(Some)
                      .map_err(|_| ConfigError::InvalidValue { key: key.to_string(),
                                                               value: raw }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Modelo de los steps de generación de una sola llamada.
    pub default_model: String,
    /// Modelo para el cuerpo de los capítulos.
    pub chapter_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Timeout por intento que aplica `RetryingClient`.
    pub generation_timeout: Duration,
    pub generation_max_retries: u32,
    pub generation_backoff: Duration,
    /// Permite a `WorkflowCtx::run_to_completion` saltar los steps opcionales.
    pub skip_optional_steps: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { default_model: "gpt-4o-mini".to_string(),
               chapter_model: "gpt-4o".to_string(),
               temperature: 0.7,
               max_tokens: 4096,
               generation_timeout: Duration::from_secs(120),
               generation_max_retries: 2,
               generation_backoff: Duration::from_millis(500),
               skip_optional_steps: false }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let chapter_model = env_parse::<String>("EBOOK_CHAPTER_MODEL")?;
        let default_model = env_parse::<String>("EBOOK_DEFAULT_MODEL")?.unwrap_or(d.default_model);
        Ok(Self { chapter_model: chapter_model.unwrap_or(d.chapter_model),
                  default_model,
                  temperature: env_parse("EBOOK_TEMPERATURE")?.unwrap_or(d.temperature),
                  max_tokens: env_parse("EBOOK_MAX_TOKENS")?.unwrap_or(d.max_tokens),
                  generation_timeout: env_parse("EBOOK_GENERATION_TIMEOUT_SECS")?.map(Duration::from_secs)
                                                                               .unwrap_or(d.generation_timeout),
                  generation_max_retries: env_parse("EBOOK_GENERATION_MAX_RETRIES")?.unwrap_or(d.generation_max_retries),
                  generation_backoff: env_parse("EBOOK_GENERATION_BACKOFF_MS")?.map(Duration::from_millis)
                                                                              .unwrap_or(d.generation_backoff),
                  skip_optional_steps: env_parse("EBOOK_SKIP_OPTIONAL_STEPS")?.unwrap_or(d.skip_optional_steps) })
    }
}

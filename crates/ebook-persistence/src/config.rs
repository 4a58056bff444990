//! Ubicación del store y reintentos, leídos del entorno:
//! `EBOOK_STORE_DIR` (por defecto `./ebook-data`) y `EBOOK_STORE_MAX_RETRIES`.

use std::path::PathBuf;

use ebook_core::config::env_parse;
use ebook_core::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: PathBuf,
    /// Intentos extra ante fallos de IO transitorios.
    pub max_retries: u32,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(),
               max_retries: 3 }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let dir = env_parse::<PathBuf>("EBOOK_STORE_DIR")?.unwrap_or_else(|| PathBuf::from("ebook-data"));
        let max_retries = env_parse("EBOOK_STORE_MAX_RETRIES")?.unwrap_or(3);
        Ok(Self { dir, max_retries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_overrides() {
        std::env::set_var("EBOOK_STORE_DIR", "/tmp/ebook-store-test");
        std::env::set_var("EBOOK_STORE_MAX_RETRIES", "5");
        let c = StoreConfig::from_env().unwrap();
        assert_eq!(c.dir, PathBuf::from("/tmp/ebook-store-test"));
        assert_eq!(c.max_retries, 5);
        std::env::set_var("EBOOK_STORE_MAX_RETRIES", "lots");
        assert!(StoreConfig::from_env().is_err());
    }
}

//! Un documento JSON por instancia de flujo.
//!
//! Las escrituras van a `<id>.json.tmp` y se renombran sobre `<id>.json`, así
//! un lector nunca ve un registro a medio escribir. La comprobación de
//! revisión y la escritura ocurren bajo un lock de proceso; dos procesos que
//! comparten directorio solo se detectan mediante la regla de revisión.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use ebook_core::repo::check_revision;
use ebook_core::{PersistenceError, WorkflowRepository};
use ebook_domain::{WorkflowInstance, INSTANCE_SCHEMA_VERSION};
use log::{debug, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::StoreError;

#[derive(Debug)]
pub struct JsonFileRepository {
    dir: PathBuf,
    max_retries: u32,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    /// Abre (creándolo si hace falta) el directorio del store.
    pub fn open(config: StoreConfig) -> Result<Self, PersistenceError> {
        fs::create_dir_all(&config.dir).map_err(|e| StoreError::io(&config.dir, e))?;
        debug!("file_store:open dir={}", config.dir.display());
        Ok(Self { dir: config.dir,
                  max_retries: config.max_retries,
                  write_lock: Mutex::new(()) })
    }

    pub fn from_env() -> Result<Self, PersistenceError> {
        let config = StoreConfig::from_env().map_err(|e| PersistenceError::Unknown(e.to_string()))?;
        Self::open(config)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: Uuid) -> Result<Option<WorkflowInstance>, StoreError> {
        let path = self.path_for(id);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        let instance: WorkflowInstance =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt { path: path.clone(),
                                                                                 source })?;
        if instance.schema_version > INSTANCE_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema { path,
                                                       found: instance.schema_version,
                                                       supported: INSTANCE_SCHEMA_VERSION });
        }
        Ok(Some(instance))
    }

    fn write(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let path = self.path_for(instance.id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(instance).map_err(|source| StoreError::Corrupt { path: path.clone(),
                                                                                             source })?;
        let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(&body).map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }

    fn with_retry<F, T>(&self, mut f: F) -> Result<T, StoreError>
        where F: FnMut() -> Result<T, StoreError>
    {
        let mut attempts = 0;
        loop {
            match f() {
                Err(e) if e.is_transient() && attempts < self.max_retries => {
                    let delay_ms = 15 * u64::from(attempts + 1);
                    warn!("file_store:retry attempt={} err={} sleep_ms={}", attempts + 1, e, delay_ms);
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    attempts += 1;
                }
                r => return r,
            }
        }
    }
}

impl WorkflowRepository for JsonFileRepository {
    fn load(&self, id: Uuid) -> Result<WorkflowInstance, PersistenceError> {
        self.with_retry(|| self.read(id))?
            .ok_or(PersistenceError::NotFound(id))
    }

    fn save(&self, instance: &WorkflowInstance) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = self.with_retry(|| self.read(instance.id))?.map(|w| w.revision);
        check_revision(instance.id, stored, instance.revision)?;
        self.with_retry(|| self.write(instance))?;
        debug!("file_store:save id={} revision={}", instance.id, instance.revision);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<Uuid>, PersistenceError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()).and_then(|s| Uuid::parse_str(s).ok()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

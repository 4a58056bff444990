//! Contrato de persistencia para instancias de flujo.
//!
//! Los repositorios son síncronos: la generación es el único punto de
//! suspensión del motor. Cada save lleva la `revision` de la instancia; un
//! store la acepta solo si es exactamente la almacenada más uno (un registro
//! nuevo llega con revisión 1). Cualquier otra cosa es un `Conflict`, que
//! detecta un segundo escritor sin intentar fusionar.

mod memory;

use ebook_domain::WorkflowInstance;
use uuid::Uuid;

use crate::errors::PersistenceError;

pub use memory::InMemoryWorkflowRepository;

pub trait WorkflowRepository: Send + Sync {
    /// # Errores
    /// `NotFound` si el id no existe, o el fallo propio del store.
    fn load(&self, id: Uuid) -> Result<WorkflowInstance, PersistenceError>;

    /// Guardado write-through con la comprobación de revisión descrita arriba.
    fn save(&self, instance: &WorkflowInstance) -> Result<(), PersistenceError>;

    /// Ids de todas las instancias almacenadas, sin orden particular.
    fn list_ids(&self) -> Result<Vec<Uuid>, PersistenceError>;
}

/// Regla de revisión común a todos los stores. `stored` es `None` para un registro nuevo.
pub fn check_revision(id: Uuid, stored: Option<u64>, incoming: u64) -> Result<(), PersistenceError> {
    let stored = stored.unwrap_or(0);
    if incoming == stored + 1 {
        Ok(())
    } else {
        Err(PersistenceError::Conflict { id,
                                         stored,
                                         attempted: incoming })
    }
}

impl<R: WorkflowRepository + ?Sized> WorkflowRepository for std::sync::Arc<R> {
    fn load(&self, id: Uuid) -> Result<WorkflowInstance, PersistenceError> {
        (**self).load(id)
    }
    fn save(&self, instance: &WorkflowInstance) -> Result<(), PersistenceError> {
        (**self).save(instance)
    }
    fn list_ids(&self) -> Result<Vec<Uuid>, PersistenceError> {
        (**self).list_ids()
    }
}

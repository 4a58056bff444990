use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// Exclusividad por instancia dentro de un proceso.
///
/// Como mucho una operación del motor maneja una instancia a la vez. El
/// guard libera el hueco al terminar, ante un error o si el future que lo
/// posee se descarta a mitad de un await.
#[derive(Debug, Clone, Default)]
pub struct GenerationLatch {
    held: Arc<DashMap<Uuid, ()>>,
}

impl GenerationLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` si otra operación ya tiene `id`.
    pub fn try_acquire(&self, id: Uuid) -> Option<LatchGuard> {
        match self.held.entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(LatchGuard { held: Arc::clone(&self.held),
                                  id })
            }
        }
    }

    pub fn is_held(&self, id: Uuid) -> bool {
        self.held.contains_key(&id)
    }
}

#[derive(Debug)]
pub struct LatchGuard {
    held: Arc<DashMap<Uuid, ()>>,
    id: Uuid,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.held.remove(&self.id);
    }
}

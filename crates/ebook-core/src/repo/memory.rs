use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ebook_domain::WorkflowInstance;
use uuid::Uuid;

use super::{check_revision, WorkflowRepository};
use crate::errors::PersistenceError;

/// Store local al proceso. Clona en cada load y save, igual que un store
/// real serializaría.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRepository {
    records: DashMap<Uuid, WorkflowInstance>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WorkflowRepository for InMemoryWorkflowRepository {
    fn load(&self, id: Uuid) -> Result<WorkflowInstance, PersistenceError> {
        self.records
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(PersistenceError::NotFound(id))
    }

    fn save(&self, instance: &WorkflowInstance) -> Result<(), PersistenceError> {
        // el lock de la entrada hace atómico el check-and-set por id
        match self.records.entry(instance.id) {
            Entry::Occupied(mut e) => {
                check_revision(instance.id, Some(e.get().revision), instance.revision)?;
                e.insert(instance.clone());
            }
            Entry::Vacant(e) => {
                check_revision(instance.id, None, instance.revision)?;
                e.insert(instance.clone());
            }
        }
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<Uuid>, PersistenceError> {
        Ok(self.records.iter().map(|r| *r.key()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_roundtrips() {
        let repo = InMemoryWorkflowRepository::new();
        let mut wf = WorkflowInstance::new("o", "t");
        wf.revision = 1;
        repo.save(&wf).unwrap();
        assert_eq!(repo.load(wf.id).unwrap(), wf);
        assert_eq!(repo.list_ids().unwrap(), vec![wf.id]);
    }

    #[test]
    fn stale_or_skipped_revisions_conflict() {
        let repo = InMemoryWorkflowRepository::new();
        let mut wf = WorkflowInstance::new("o", "t");
        wf.revision = 1;
        repo.save(&wf).unwrap();
        let stale = wf.clone();
        wf.revision = 2;
        repo.save(&wf).unwrap();

        let err = repo.save(&stale).unwrap_err();
        assert_eq!(err,
                   PersistenceError::Conflict { id: wf.id,
                                                stored: 2,
                                                attempted: 1 });
        wf.revision = 4;
        assert!(matches!(repo.save(&wf), Err(PersistenceError::Conflict { .. })));
        assert_eq!(repo.load(wf.id).unwrap().revision, 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let repo = InMemoryWorkflowRepository::new();
        let id = Uuid::new_v4();
        assert_eq!(repo.load(id).unwrap_err(), PersistenceError::NotFound(id));
    }
}

//! A sink that keeps everything in memory.
//!
//! Used for dry runs that have no database at hand and as the reference
//! behaviour in tests. Every id it hands out is [`EntityId::Unsaved`].

use std::collections::HashMap;

use sayit_core::EntityId;

use crate::error::{Result, StoreError};
use crate::sink::{ImportEntry, NewEntity, NewSpeech, Sink};

/// Lengths to roll back to when a document fails.
#[derive(Debug, Clone, Copy)]
struct Mark {
    entities: usize,
    speeches: usize,
    imports: usize,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    ids: HashMap<NewEntity, EntityId>,
    /// Entities in creation order.
    pub entities: Vec<(EntityId, NewEntity)>,
    pub speeches: Vec<NewSpeech>,
    pub imports: Vec<ImportEntry>,
    next_id: u64,
    mark: Option<Mark>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId::Unsaved(self.next_id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&NewEntity> {
        self.entities
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, entity)| entity)
    }
}

impl Sink for MemorySink {
    fn commits(&self) -> bool {
        false
    }

    fn get_or_create(&mut self, entity: &NewEntity) -> Result<(EntityId, bool)> {
        if let Some(id) = self.ids.get(entity) {
            return Ok((*id, false));
        }
        let id = self.allocate();
        self.ids.insert(entity.clone(), id);
        self.entities.push((id, entity.clone()));
        Ok((id, true))
    }

    fn add_speech(&mut self, speech: &NewSpeech) -> Result<EntityId> {
        let id = self.allocate();
        self.speeches.push(speech.clone());
        Ok(id)
    }

    fn begin_document(&mut self) -> Result<()> {
        self.mark = Some(Mark {
            entities: self.entities.len(),
            speeches: self.speeches.len(),
            imports: self.imports.len(),
        });
        Ok(())
    }

    fn finish_document(&mut self, ok: bool) -> Result<()> {
        let mark = self.mark.take().ok_or(StoreError::NoTransaction)?;
        if ok {
            return Ok(());
        }
        for (_, entity) in self.entities.drain(mark.entities..) {
            self.ids.remove(&entity);
        }
        self.speeches.truncate(mark.speeches);
        self.imports.truncate(mark.imports);
        Ok(())
    }

    fn already_imported(&mut self, instance: &str, digest: &str) -> Result<bool> {
        Ok(self
            .imports
            .iter()
            .any(|e| e.instance == instance && e.digest == digest))
    }

    fn record_import(&mut self, entry: &ImportEntry) -> Result<()> {
        self.imports.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(label: &str) -> NewEntity {
        NewEntity::Instance {
            label: label.to_string(),
        }
    }

    #[test]
    fn same_attributes_same_id() {
        let mut sink = MemorySink::new();
        let (a, created) = sink.get_or_create(&instance("leveson")).unwrap();
        assert!(created);
        let (b, created) = sink.get_or_create(&instance("leveson")).unwrap();
        assert!(!created);
        assert_eq!(a, b);
        let (c, _) = sink.get_or_create(&instance("philadelphia")).unwrap();
        assert_ne!(a, c);
        assert!(matches!(a, EntityId::Unsaved(_)));
    }

    #[test]
    fn failed_document_rolls_back() {
        let mut sink = MemorySink::new();
        sink.begin_document().unwrap();
        sink.get_or_create(&instance("leveson")).unwrap();
        sink.finish_document(true).unwrap();

        sink.begin_document().unwrap();
        let (id, _) = sink.get_or_create(&instance("fomc")).unwrap();
        sink.add_speech(&NewSpeech {
            instance: id,
            section: id,
            speaker: None,
            speaker_display: None,
            text: "<p>x</p>".into(),
            kind: "narrative",
            start_date: None,
            start_time: None,
            source_line: 1,
        })
        .unwrap();
        sink.finish_document(false).unwrap();

        assert_eq!(sink.entities.len(), 1);
        assert!(sink.speeches.is_empty());
        let (_, created) = sink.get_or_create(&instance("fomc")).unwrap();
        assert!(created);
    }

    #[test]
    fn finish_without_begin_is_an_error() {
        let mut sink = MemorySink::new();
        assert!(matches!(
            sink.finish_document(true),
            Err(StoreError::NoTransaction)
        ));
    }
}

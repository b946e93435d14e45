use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::entity::{validate_entity, Entity, EntityKind, ValidationError};

/// All entities valid as of one refresh generation.
///
/// Only [`SnapshotBuilder`] can create one, so every snapshot satisfies the
/// coordinate-range and per-kind uniqueness invariants. Shared behind an
/// `Arc` once published and never mutated.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    generation: u64,
    generated_at: DateTime<Utc>,
    entities: Vec<Entity>,
}

impl Snapshot {
    /// Generation 0: the state before the first refresh.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            generated_at: DateTime::<Utc>::default(),
            entities: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == kind)
    }

    pub fn find(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.kind() == kind && e.id == id)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Collects normalized entities for one generation, enforcing snapshot invariants.
pub struct SnapshotBuilder {
    generation: u64,
    generated_at: DateTime<Utc>,
    entities: Vec<Entity>,
    seen: HashSet<(EntityKind, String)>,
    dropped: usize,
}

impl SnapshotBuilder {
    pub fn new(generation: u64, generated_at: DateTime<Utc>) -> Self {
        Self {
            generation,
            generated_at,
            entities: Vec::new(),
            seen: HashSet::new(),
            dropped: 0,
        }
    }

    /// Adds an entity, or refuses it when it fails validation or repeats an
    /// id already present for its kind (first-seen record wins).
    pub fn push(&mut self, entity: Entity) -> Result<(), ValidationError> {
        let checked = validate_entity(&entity).and_then(|_| {
            let key = (entity.kind(), entity.id.clone());
            if self.seen.contains(&key) {
                Err(ValidationError::DuplicateId {
                    kind: key.0,
                    id: key.1,
                })
            } else {
                self.seen.insert(key);
                Ok(())
            }
        });

        match checked {
            Ok(()) => {
                self.entities.push(entity);
                Ok(())
            }
            Err(e) => {
                self.dropped += 1;
                Err(e)
            }
        }
    }

    /// Number of entities refused so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            generated_at: self.generated_at,
            entities: self.entities,
        }
    }
}

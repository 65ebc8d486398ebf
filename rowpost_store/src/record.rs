use serde::{Deserialize, Serialize};

/// The durable representation of an ingested record.
///
/// Only the generated identifier is stored. The raw fields of the source row are
/// not part of the persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: String,
}

impl PersistedRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

//! Collection membership representation

use serde::{Deserialize, Serialize};

/// One collection an item belongs to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionRef {
    pub name: String,
    pub key: String,
    /// `"personal"` for the personal library, else the owning group's name
    pub group: String,
    /// "0" for the personal library, else the group's library id
    pub library_id: String,
}

impl CollectionRef {
    pub fn personal(name: String, key: String) -> Self {
        Self {
            name,
            key,
            group: "personal".to_string(),
            library_id: "0".to_string(),
        }
    }

    pub fn group(name: String, key: String, group: String, library_id: String) -> Self {
        Self {
            name,
            key,
            group,
            library_id,
        }
    }
}

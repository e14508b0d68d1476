//! One flat record per source item

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Attachment, CollectionRef, Creator, TagRef};

/// The denormalized form of one source item: everything the launcher needs
/// to render, cite, or open the item, assembled from a dozen joined tables.
///
/// Rebuilt wholesale on every refresh; never patched in place.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggregateRecord {
    /// Stable alphanumeric identifier, unique across the document
    pub key: String,
    /// "0" for the personal library, else the owning group's library id
    pub library_id: String,
    /// Translated (standard-vocabulary) type name
    #[serde(rename = "type")]
    pub item_type: String,
    /// Display-ordered creator list
    pub creators: Vec<Creator>,
    /// Translated field name -> value; first-seen value wins per name
    pub data: BTreeMap<String, String>,
    pub collections: Vec<CollectionRef>,
    pub tags: Vec<TagRef>,
    pub attachments: Vec<Attachment>,
    /// Note bodies with their HTML wrapper stripped
    pub notes: Vec<String>,
}

impl AggregateRecord {
    pub fn new(key: String, library_id: String, item_type: String) -> Self {
        Self {
            key,
            library_id,
            item_type,
            ..Default::default()
        }
    }

    /// Title convenience accessor for result display
    pub fn title(&self) -> Option<&str> {
        self.data
            .get("title")
            .or_else(|| self.data.get("title-short"))
            .map(|s| s.as_str())
    }
}

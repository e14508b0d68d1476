//! Creator representation

use serde::{Deserialize, Serialize};

/// One creator of an item (author, editor, translator, ...)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Creator {
    pub family: String,
    pub given: String,
    /// Translated role name
    pub role: String,
    /// The source's own per-item sequence number; authoritative for
    /// display order
    pub order_index: i64,
}

impl Creator {
    /// "Family, Given" display form, degrading to whichever part exists
    pub fn display_name(&self) -> String {
        match (self.family.is_empty(), self.given.is_empty()) {
            (false, false) => format!("{}, {}", self.family, self.given),
            (false, true) => self.family.clone(),
            (true, false) => self.given.clone(),
            (true, true) => String::new(),
        }
    }
}

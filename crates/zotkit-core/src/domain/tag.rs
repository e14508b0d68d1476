//! Tag membership representation

use serde::{Deserialize, Serialize};

/// One tag attached to an item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub key: String,
}

//! Attachment representation

use serde::{Deserialize, Serialize};

/// One attachment that survived the extension allow-list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attachment {
    /// Resolved filename, for display
    pub name: String,
    /// The attachment item's own key; None for literal-path links
    pub key: Option<String>,
    /// Absolute filesystem path (or empty when resolution failed)
    pub path: String,
}

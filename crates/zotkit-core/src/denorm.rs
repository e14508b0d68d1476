//! Denormalization engine
//!
//! Walks the relational reader's output and assembles one aggregate record
//! per item: ordered creators, deduplicated metadata fields, collection and
//! tag memberships, allow-listed attachments, and stripped notes. Rows with
//! broken linkage are dropped with a warning; a partial record always beats
//! a failed refresh.

use std::path::{Path, PathBuf};

use crate::config::WorkflowConfig;
use crate::domain::{AggregateRecord, Attachment, CollectionRef, Creator, TagRef};
use crate::error::ReaderError;
use crate::notes::strip_note_html;
use crate::reader::{AttachmentRow, RelationalReader};
use crate::translate::{Direction, FieldTranslator, Kind};

/// Translated field names holding date values; only their year survives
const DATE_FIELDS: &[&str] = &["issued", "accessed"];

/// Internal storage prefix: the rest of the path is a filename under
/// `<storage>/<attachment key>/`
const STORAGE_PREFIX: &str = "storage:";
/// Linked-file prefix: the rest is relative to the configured attachments
/// root
const ATTACHMENTS_PREFIX: &str = "attachments:";

/// Assembles aggregate records from the relational source
pub struct DenormalizationEngine<'a> {
    reader: &'a RelationalReader,
    config: &'a WorkflowConfig,
    translator: &'static FieldTranslator,
}

impl<'a> DenormalizationEngine<'a> {
    pub fn new(reader: &'a RelationalReader, config: &'a WorkflowConfig) -> Self {
        Self {
            reader,
            config,
            translator: FieldTranslator::global(),
        }
    }

    /// Build one aggregate record per eligible item, in the reader's
    /// deterministic item order. Any failed query aborts the build; rows
    /// with unresolvable linkage are dropped from their record instead.
    pub fn build(&self) -> Result<Vec<AggregateRecord>, ReaderError> {
        let items = self.reader.items()?;
        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            let mut record = AggregateRecord::new(
                item.key.clone(),
                item.library_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "0".to_string()),
                self.translator
                    .translate(Kind::Type, &item.type_name, Direction::ToStandard),
            );
            self.assemble_creators(item.id, &mut record)?;
            self.assemble_data(item.id, &mut record)?;
            self.assemble_collections(item.id, &mut record)?;
            self.assemble_tags(item.id, &mut record)?;
            self.assemble_attachments(item.id, &mut record)?;
            self.assemble_notes(item.id, &mut record)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Creators arrive in arbitrary fetch order; the source's own order
    /// index is authoritative for display.
    fn assemble_creators(
        &self,
        item_id: i64,
        record: &mut AggregateRecord,
    ) -> Result<(), ReaderError> {
        let mut creators: Vec<Creator> = self
            .reader
            .creators(item_id)?
            .into_iter()
            .map(|row| Creator {
                family: row.last_name,
                given: row.first_name,
                role: self
                    .translator
                    .translate(Kind::CreatorRole, &row.role, Direction::ToStandard),
                order_index: row.order_index,
            })
            .collect();
        creators.sort_by_key(|c| c.order_index);
        record.creators = creators;
        Ok(())
    }

    /// Join fan-out can emit the same logical (item, field) pair more than
    /// once, and distinct source fields can collapse onto one translated
    /// name; the first-seen value wins either way.
    fn assemble_data(&self, item_id: i64, record: &mut AggregateRecord) -> Result<(), ReaderError> {
        for row in self.reader.fields(item_id)? {
            let name = self
                .translator
                .translate(Kind::Field, &row.field_name, Direction::ToStandard);
            if record.data.contains_key(&name) {
                continue;
            }
            let value = if DATE_FIELDS.contains(&name.as_str()) {
                year_token(&row.value)
            } else {
                row.value
            };
            record.data.insert(name, value);
        }
        Ok(())
    }

    /// Each membership is tried against the personal-collection lookup
    /// first, then the group lookup. A membership that resolves in neither
    /// category is dropped, not fatal.
    fn assemble_collections(
        &self,
        item_id: i64,
        record: &mut AggregateRecord,
    ) -> Result<(), ReaderError> {
        for collection_id in self.reader.collection_memberships(item_id)? {
            if let Some(personal) = self.reader.personal_collection(collection_id)? {
                record
                    .collections
                    .push(CollectionRef::personal(personal.name, personal.key));
            } else if let Some(group) = self.reader.group_collection(collection_id)? {
                record.collections.push(CollectionRef::group(
                    group.name,
                    group.key,
                    group.group_name,
                    group.library_id.to_string(),
                ));
            } else {
                tracing::warn!(
                    item = %record.key,
                    collection_id,
                    "collection membership resolves to neither a personal nor a group collection"
                );
            }
        }
        Ok(())
    }

    fn assemble_tags(&self, item_id: i64, record: &mut AggregateRecord) -> Result<(), ReaderError> {
        record.tags = self
            .reader
            .tags(item_id)?
            .into_iter()
            .map(|row| TagRef {
                name: row.name,
                key: row.id.to_string(),
            })
            .collect();
        Ok(())
    }

    fn assemble_attachments(
        &self,
        item_id: i64,
        record: &mut AggregateRecord,
    ) -> Result<(), ReaderError> {
        for row in self.reader.attachments(item_id)? {
            if let Some(attachment) = self.resolve_attachment(&row) {
                record.attachments.push(attachment);
            }
        }
        Ok(())
    }

    /// Classify an attachment by path prefix, resolve it to a filesystem
    /// path, and apply the extension allow-list.
    fn resolve_attachment(&self, row: &AttachmentRow) -> Option<Attachment> {
        let raw = row.path.as_deref()?;
        let (path, key) = if let Some(rest) = raw.strip_prefix(STORAGE_PREFIX) {
            let resolved = self.config.paths.storage_dir().join(&row.key).join(rest);
            (resolved, Some(row.key.clone()))
        } else if let Some(rest) = raw.strip_prefix(ATTACHMENTS_PREFIX) {
            let root = match &self.config.paths.attachments_dir {
                Some(root) => root.clone(),
                None => {
                    tracing::warn!(
                        key = %row.key,
                        "linked attachment found but no attachments root is configured"
                    );
                    return None;
                }
            };
            (root.join(rest), Some(row.key.clone()))
        } else {
            (PathBuf::from(raw), None)
        };

        if !self.extension_allowed(&path) {
            return None;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some(Attachment {
            name,
            key,
            path: path.to_string_lossy().into_owned(),
        })
    }

    fn extension_allowed(&self, path: &Path) -> bool {
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None => return false,
        };
        self.config
            .attachments
            .allowed_extensions
            .iter()
            .any(|allowed| allowed == &ext)
    }

    fn assemble_notes(&self, item_id: i64, record: &mut AggregateRecord) -> Result<(), ReaderError> {
        record.notes = self
            .reader
            .notes(item_id)?
            .iter()
            .map(|note| strip_note_html(note))
            .filter(|text| !text.is_empty())
            .collect();
        Ok(())
    }
}

/// First four characters of a date value; the source stores dates with a
/// leading year in every format it writes.
fn year_token(value: &str) -> String {
    value.chars().take(4).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_token() {
        assert_eq!(year_token("2019-05-01"), "2019");
        assert_eq!(year_token("2019"), "2019");
        assert_eq!(year_token("19"), "19");
    }
}

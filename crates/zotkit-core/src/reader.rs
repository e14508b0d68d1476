//! Read-only access to the source application's relational schema
//!
//! Every query here targets the cloned database, never the live one. The
//! join shapes are fixed to the source schema: items, itemTypes, itemData,
//! itemDataValues, fields, creators, itemCreators, creatorTypes,
//! collections, collectionItems, groups, tags, itemTags, itemAttachments,
//! itemNotes, deletedItems.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::error::ReaderError;

/// One library item eligible for denormalization
#[derive(Clone, Debug)]
pub struct ItemRow {
    pub id: i64,
    pub key: String,
    pub library_id: Option<i64>,
    pub type_name: String,
}

/// One creator row, in the source's own vocabulary
#[derive(Clone, Debug)]
pub struct CreatorRow {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub order_index: i64,
}

/// One (field, value) row
#[derive(Clone, Debug)]
pub struct FieldRow {
    pub field_name: String,
    pub value: String,
}

/// A collection in the personal library
#[derive(Clone, Debug)]
pub struct PersonalCollectionRow {
    pub name: String,
    pub key: String,
}

/// A collection owned by a group library
#[derive(Clone, Debug)]
pub struct GroupCollectionRow {
    pub name: String,
    pub key: String,
    pub group_name: String,
    pub library_id: i64,
}

/// One tag row
#[derive(Clone, Debug)]
pub struct TagRow {
    pub name: String,
    pub id: i64,
}

/// One attachment row, path still in source form
#[derive(Clone, Debug)]
pub struct AttachmentRow {
    pub key: String,
    pub path: Option<String>,
}

/// A collection or tag name matched by a listing query
#[derive(Clone, Debug)]
pub struct NameRow {
    pub name: String,
    pub key: String,
}

/// Issues typed read-only queries against the relational source
pub struct RelationalReader {
    conn: Connection,
}

impl RelationalReader {
    /// Open the database read-only. Failure here is fatal to the current
    /// refresh; previous artifacts stay untouched.
    pub fn open(path: &Path) -> Result<Self, ReaderError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| ReaderError::Open {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self { conn })
    }

    /// All non-deleted library items, newest first. Attachment and note
    /// items are children of the items returned here, not items themselves.
    pub fn items(&self) -> Result<Vec<ItemRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT items.itemID, items.key, items.libraryID, itemTypes.typeName
             FROM items
             JOIN itemTypes ON items.itemTypeID = itemTypes.itemTypeID
             LEFT JOIN deletedItems ON items.itemID = deletedItems.itemID
             WHERE itemTypes.typeName NOT IN ('attachment', 'note', 'annotation')
               AND deletedItems.itemID IS NULL
             ORDER BY items.dateAdded DESC, items.itemID DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ItemRow {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    library_id: row.get(2)?,
                    type_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Creator rows for one item. No ORDER BY: the order index travels
    /// with each row and the caller sorts.
    pub fn creators(&self, item_id: i64) -> Result<Vec<CreatorRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT creators.firstName, creators.lastName,
                    creatorTypes.creatorType, itemCreators.orderIndex
             FROM itemCreators
             JOIN creators ON itemCreators.creatorID = creators.creatorID
             JOIN creatorTypes ON itemCreators.creatorTypeID = creatorTypes.creatorTypeID
             WHERE itemCreators.itemID = ?1",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok(CreatorRow {
                    first_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    last_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    role: row.get(2)?,
                    order_index: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// (field, value) rows for one item, in stable field order so that
    /// first-wins deduplication is deterministic across refreshes.
    pub fn fields(&self, item_id: i64) -> Result<Vec<FieldRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT fields.fieldName, itemDataValues.value
             FROM itemData
             JOIN fields ON itemData.fieldID = fields.fieldID
             JOIN itemDataValues ON itemData.valueID = itemDataValues.valueID
             WHERE itemData.itemID = ?1
             ORDER BY itemData.fieldID",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok(FieldRow {
                    field_name: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Collection ids the item is a member of
    pub fn collection_memberships(&self, item_id: i64) -> Result<Vec<i64>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT collectionID FROM collectionItems WHERE itemID = ?1 ORDER BY collectionID",
        )?;
        let rows = stmt
            .query_map([item_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Detail lookup for a collection in the personal library. A given
    /// collection id is valid in at most one of the personal and group
    /// categories.
    pub fn personal_collection(
        &self,
        collection_id: i64,
    ) -> Result<Option<PersonalCollectionRow>, ReaderError> {
        let row = self
            .conn
            .query_row(
                "SELECT collectionName, key FROM collections
                 WHERE collectionID = ?1 AND libraryID IS NULL",
                [collection_id],
                |row| {
                    Ok(PersonalCollectionRow {
                        name: row.get(0)?,
                        key: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Detail lookup for a group-owned collection, including the owning
    /// group's name
    pub fn group_collection(
        &self,
        collection_id: i64,
    ) -> Result<Option<GroupCollectionRow>, ReaderError> {
        let row = self
            .conn
            .query_row(
                "SELECT collections.collectionName, collections.key,
                        groups.name, collections.libraryID
                 FROM collections
                 JOIN groups ON collections.libraryID = groups.libraryID
                 WHERE collections.collectionID = ?1",
                [collection_id],
                |row| {
                    Ok(GroupCollectionRow {
                        name: row.get(0)?,
                        key: row.get(1)?,
                        group_name: row.get(2)?,
                        library_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Tag rows for one item; flat name + id, no translation needed
    pub fn tags(&self, item_id: i64) -> Result<Vec<TagRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT tags.name, tags.tagID
             FROM tags
             JOIN itemTags ON tags.tagID = itemTags.tagID
             WHERE itemTags.itemID = ?1
             ORDER BY tags.tagID",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok(TagRow {
                    name: row.get(0)?,
                    id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Attachment rows for one parent item. Path is None for link-only
    /// attachments (e.g. URL links), which carry no file.
    pub fn attachments(&self, item_id: i64) -> Result<Vec<AttachmentRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT items.key, itemAttachments.path
             FROM itemAttachments
             JOIN items ON itemAttachments.itemID = items.itemID
             LEFT JOIN deletedItems ON items.itemID = deletedItems.itemID
             WHERE itemAttachments.parentItemID = ?1
               AND deletedItems.itemID IS NULL
             ORDER BY items.itemID",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok(AttachmentRow {
                    key: row.get(0)?,
                    path: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Note bodies for one parent item, raw HTML included
    pub fn notes(&self, item_id: i64) -> Result<Vec<String>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT itemNotes.note
             FROM itemNotes
             JOIN items ON itemNotes.itemID = items.itemID
             LEFT JOIN deletedItems ON items.itemID = deletedItems.itemID
             WHERE itemNotes.parentItemID = ?1
               AND deletedItems.itemID IS NULL
             ORDER BY items.itemID",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default())
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().filter(|n| !n.is_empty()).collect())
    }

    /// Substring listing of collection names, for group-listing searches.
    /// This hits the relational clone directly, not the full-text index.
    pub fn collections_matching(&self, term: &str) -> Result<Vec<NameRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT collectionName, key FROM collections
             WHERE collectionName LIKE ?1 ORDER BY collectionName",
        )?;
        let pattern = format!("%{}%", term);
        let rows = stmt
            .query_map([pattern], |row| {
                Ok(NameRow {
                    name: row.get(0)?,
                    key: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Substring listing of tag names
    pub fn tags_matching(&self, term: &str) -> Result<Vec<NameRow>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, tagID FROM tags WHERE name LIKE ?1 ORDER BY name",
        )?;
        let pattern = format!("%{}%", term);
        let rows = stmt
            .query_map([pattern], |row| {
                Ok(NameRow {
                    name: row.get(0)?,
                    key: row.get::<_, i64>(1)?.to_string(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

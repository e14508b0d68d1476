//! Vocabulary translation between the source application and CSL
//!
//! The source schema names item types, creator roles, and metadata fields in
//! its own vocabulary; downstream consumers (the JSON document, the citation
//! service) speak CSL. Translation is table-driven and best-effort: a name
//! with no mapping is echoed back unchanged, because an incomplete table
//! must never break the pipeline.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Which vocabulary a name belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Type,
    CreatorRole,
    Field,
}

/// Translation direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    ToStandard,
    ToSource,
}

/// Direct (source, standard) pairs per kind
static TYPES: &[(&str, &str)] = &[
    ("artwork", "graphic"),
    ("audioRecording", "song"),
    ("bill", "bill"),
    ("blogPost", "post-weblog"),
    ("book", "book"),
    ("bookSection", "chapter"),
    ("case", "legal_case"),
    ("computerProgram", "software"),
    ("conferencePaper", "paper-conference"),
    ("dictionaryEntry", "entry-dictionary"),
    ("document", "document"),
    ("email", "personal_communication"),
    ("encyclopediaArticle", "entry-encyclopedia"),
    ("film", "motion_picture"),
    ("forumPost", "post"),
    ("hearing", "bill"),
    ("instantMessage", "personal_communication"),
    ("interview", "interview"),
    ("journalArticle", "article-journal"),
    ("letter", "personal_communication"),
    ("magazineArticle", "article-magazine"),
    ("manuscript", "manuscript"),
    ("map", "map"),
    ("newspaperArticle", "article-newspaper"),
    ("patent", "patent"),
    ("podcast", "song"),
    ("presentation", "speech"),
    ("radioBroadcast", "broadcast"),
    ("report", "report"),
    ("statute", "legislation"),
    ("thesis", "thesis"),
    ("tvBroadcast", "broadcast"),
    ("videoRecording", "motion_picture"),
    ("webpage", "webpage"),
];

static CREATOR_ROLES: &[(&str, &str)] = &[
    ("artist", "author"),
    ("author", "author"),
    ("bookAuthor", "container-author"),
    ("composer", "composer"),
    ("director", "director"),
    ("editor", "editor"),
    ("interviewee", "author"),
    ("interviewer", "interviewer"),
    ("performer", "author"),
    ("podcaster", "author"),
    ("presenter", "author"),
    ("programmer", "author"),
    ("recipient", "recipient"),
    ("reviewedAuthor", "reviewed-author"),
    ("seriesEditor", "collection-editor"),
    ("translator", "translator"),
];

static FIELDS: &[(&str, &str)] = &[
    ("DOI", "DOI"),
    ("ISBN", "ISBN"),
    ("ISSN", "ISSN"),
    ("abstractNote", "abstract"),
    ("accessDate", "accessed"),
    ("archive", "archive"),
    ("archiveLocation", "archive_location"),
    ("callNumber", "call-number"),
    ("date", "issued"),
    ("edition", "edition"),
    ("extra", "note"),
    ("genre", "genre"),
    ("issue", "issue"),
    ("language", "language"),
    ("libraryCatalog", "source"),
    ("medium", "medium"),
    ("number", "number"),
    ("numPages", "number-of-pages"),
    ("numberOfVolumes", "number-of-volumes"),
    ("pages", "page"),
    ("place", "publisher-place"),
    ("publicationTitle", "container-title"),
    ("publisher", "publisher"),
    ("section", "section"),
    ("series", "collection-title"),
    ("seriesNumber", "collection-number"),
    ("shortTitle", "title-short"),
    ("title", "title"),
    ("type", "genre"),
    ("url", "URL"),
    ("version", "version"),
    ("volume", "volume"),
];

/// Field variants that collapse onto a base field. Looked up only when a
/// direct field mapping is missing; the base field is then retried against
/// the direct table.
static BASE_FIELDS: &[(&str, &str)] = &[
    ("billNumber", "number"),
    ("blogTitle", "publicationTitle"),
    ("bookTitle", "publicationTitle"),
    ("caseName", "title"),
    ("codePages", "pages"),
    ("company", "publisher"),
    ("dictionaryTitle", "publicationTitle"),
    ("distributor", "publisher"),
    ("docketNumber", "number"),
    ("encyclopediaTitle", "publicationTitle"),
    ("episodeNumber", "number"),
    ("firstPage", "pages"),
    ("forumTitle", "publicationTitle"),
    ("institution", "publisher"),
    ("label", "publisher"),
    ("letterType", "type"),
    ("manuscriptType", "type"),
    ("nameOfAct", "title"),
    ("network", "publisher"),
    ("patentNumber", "number"),
    ("postType", "type"),
    ("presentationType", "type"),
    ("proceedingsTitle", "publicationTitle"),
    ("programTitle", "publicationTitle"),
    ("reportNumber", "number"),
    ("reportType", "type"),
    ("seriesTitle", "series"),
    ("studio", "publisher"),
    ("subject", "title"),
    ("thesisType", "type"),
    ("university", "publisher"),
    ("websiteTitle", "publicationTitle"),
    ("websiteType", "type"),
];

type Table = HashMap<&'static str, &'static str>;

/// Enum-keyed lookup tables built once at startup: two maps per kind, one
/// per direction
pub struct FieldTranslator {
    to_standard: HashMap<Kind, Table>,
    to_source: HashMap<Kind, Table>,
    base_fields: Table,
}

lazy_static! {
    static ref TRANSLATOR: FieldTranslator = FieldTranslator::new();
}

impl FieldTranslator {
    fn new() -> Self {
        let mut to_standard = HashMap::new();
        let mut to_source = HashMap::new();
        for (kind, pairs) in [
            (Kind::Type, TYPES),
            (Kind::CreatorRole, CREATOR_ROLES),
            (Kind::Field, FIELDS),
        ] {
            let forward: Table = pairs.iter().copied().collect();
            // Reverse map keeps the first source name per standard name so
            // collapsed variants (e.g. broadcast) round-trip consistently.
            let mut reverse: Table = HashMap::new();
            for &(source, standard) in pairs {
                reverse.entry(standard).or_insert(source);
            }
            to_standard.insert(kind, forward);
            to_source.insert(kind, reverse);
        }
        Self {
            to_standard,
            to_source,
            base_fields: BASE_FIELDS.iter().copied().collect(),
        }
    }

    /// The process-wide table, built on first use
    pub fn global() -> &'static FieldTranslator {
        &TRANSLATOR
    }

    /// Translate `name` between vocabularies. Falls back to the base-field
    /// indirection for field lookups, and to identity when no mapping
    /// exists at all.
    pub fn translate(&self, kind: Kind, name: &str, direction: Direction) -> String {
        let table = match direction {
            Direction::ToStandard => &self.to_standard[&kind],
            Direction::ToSource => &self.to_source[&kind],
        };
        if let Some(found) = table.get(name) {
            return found.to_string();
        }
        if kind == Kind::Field && direction == Direction::ToStandard {
            if let Some(base) = self.base_fields.get(name) {
                if let Some(found) = table.get(base) {
                    return found.to_string();
                }
            }
        }
        tracing::debug!(?kind, name, "no vocabulary mapping, passing through");
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t() -> &'static FieldTranslator {
        FieldTranslator::global()
    }

    #[test]
    fn test_direct_type_translation() {
        assert_eq!(
            t().translate(Kind::Type, "journalArticle", Direction::ToStandard),
            "article-journal"
        );
        assert_eq!(
            t().translate(Kind::Type, "article-journal", Direction::ToSource),
            "journalArticle"
        );
    }

    #[test]
    fn test_creator_role_translation() {
        assert_eq!(
            t().translate(Kind::CreatorRole, "seriesEditor", Direction::ToStandard),
            "collection-editor"
        );
    }

    #[test]
    fn test_base_field_indirection() {
        // bookTitle has no direct mapping; it resolves via its base field
        // publicationTitle.
        assert_eq!(
            t().translate(Kind::Field, "bookTitle", Direction::ToStandard),
            "container-title"
        );
        assert_eq!(
            t().translate(Kind::Field, "caseName", Direction::ToStandard),
            "title"
        );
    }

    #[test]
    fn test_identity_fallback() {
        assert_eq!(
            t().translate(Kind::Field, "someFutureField", Direction::ToStandard),
            "someFutureField"
        );
        assert_eq!(
            t().translate(Kind::Type, "unknownType", Direction::ToSource),
            "unknownType"
        );
    }

    #[test]
    fn test_date_field_maps_to_issued() {
        assert_eq!(
            t().translate(Kind::Field, "date", Direction::ToStandard),
            "issued"
        );
    }
}

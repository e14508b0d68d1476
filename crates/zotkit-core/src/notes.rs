//! Note body extraction
//!
//! The source stores each note as an HTML fragment inside a wrapper
//! `<div ...>...</div>` whose attributes vary between application versions.
//! We parse the wrapper instead of slicing fixed byte offsets: a note that
//! does not match the expected shape is logged and falls back to a plain
//! tag strip of the whole fragment, so nothing is ever mis-truncated.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WS_RE: Regex = Regex::new(r"[ \t]+").unwrap();
}

/// Strip the wrapper div and all markup from a stored note, returning the
/// plain text body.
pub fn strip_note_html(note: &str) -> String {
    let inner = match unwrap_note(note) {
        Some(inner) => inner,
        None => {
            tracing::warn!("note wrapper did not match expected shape, stripping all tags");
            note
        }
    };
    clean_fragment(inner)
}

/// Extract the content between the outer wrapper div's tags, or None when
/// the fragment is not wrapped the way the source writes it.
fn unwrap_note(note: &str) -> Option<&str> {
    let trimmed = note.trim();
    if !trimmed.starts_with("<div") || !trimmed.ends_with("</div>") {
        return None;
    }
    let open_end = trimmed.find('>')?;
    let inner = &trimmed[open_end + 1..trimmed.len() - "</div>".len()];
    Some(inner)
}

/// Remove remaining tags, decode the entities the source emits, and
/// collapse whitespace.
fn clean_fragment(fragment: &str) -> String {
    // Block-level closers become line breaks so paragraphs stay separated.
    let with_breaks = fragment
        .replace("</p>", "\n")
        .replace("</div>", "\n")
        .replace("<br>", "\n")
        .replace("<br/>", "\n")
        .replace("<br />", "\n");
    let no_tags = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&no_tags);
    let collapsed = WS_RE.replace_all(&decoded, " ");
    collapsed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_standard_wrapper() {
        let note = r#"<div class="zotero-note znv1"><p>Reading list for chapter two.</p></div>"#;
        assert_eq!(strip_note_html(note), "Reading list for chapter two.");
    }

    #[test]
    fn test_multiple_paragraphs_keep_line_breaks() {
        let note = r#"<div class="zotero-note znv1"><p>First.</p><p>Second.</p></div>"#;
        assert_eq!(strip_note_html(note), "First.\nSecond.");
    }

    #[test]
    fn test_nested_markup_is_removed() {
        let note =
            r#"<div class="zotero-note znv1"><p>See <strong>figure</strong> 3 &amp; 4.</p></div>"#;
        assert_eq!(strip_note_html(note), "See figure 3 & 4.");
    }

    #[test]
    fn test_unwrapped_note_falls_back_to_tag_strip() {
        let note = "<p>Bare paragraph with no wrapper.</p>";
        assert_eq!(strip_note_html(note), "Bare paragraph with no wrapper.");
    }

    #[test]
    fn test_plain_text_note_passes_through() {
        assert_eq!(strip_note_html("just text"), "just text");
    }

    #[test]
    fn test_entities_decoded_after_tag_strip() {
        let note = r#"<div class="zotero-note znv1"><p>&lt;not a tag&gt;&nbsp;&quot;q&quot;</p></div>"#;
        assert_eq!(strip_note_html(note), "<not a tag> \"q\"");
    }
}

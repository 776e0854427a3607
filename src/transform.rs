// Wikitext Transformer Module
//
// Purpose: wrap the parse_wiki_text grammar and reshape its node tree into
// an ordered list of titled sections with extracted plain text. No markup
// interpretation happens here; the parser owns the grammar.

use parse_wiki_text::{Configuration, ConfigurationSource, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on transformer input. Real articles top out around 2 MB of
/// wikitext; anything past this is junk or abuse.
pub const MAX_WIKITEXT_BYTES: usize = 16 * 1024 * 1024;

/// Site configuration for the parser: the extension tags, protocols and
/// magic words of a stock English-language MediaWiki install.
static SITE_CONFIGURATION: ConfigurationSource<'static> = ConfigurationSource {
    category_namespaces: &["category"],
    extension_tags: &[
        "chem",
        "gallery",
        "imagemap",
        "math",
        "nowiki",
        "pre",
        "ref",
        "references",
        "score",
        "source",
        "syntaxhighlight",
        "timeline",
    ],
    file_namespaces: &["file", "image"],
    link_trail: "abcdefghijklmnopqrstuvwxyz",
    magic_words: &[
        "FORCETOC",
        "INDEX",
        "NOEDITSECTION",
        "NOGALLERY",
        "NOINDEX",
        "NOTOC",
    ],
    protocols: &[
        "//",
        "ftp://",
        "http://",
        "https://",
        "irc://",
        "ircs://",
        "mailto:",
        "news:",
    ],
    redirect_magic_words: &["REDIRECT"],
};

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("wikitext input of {0} bytes exceeds the {MAX_WIKITEXT_BYTES} byte limit")]
    InputTooLarge(usize),
}

/// A titled region of the parsed document. The lead section (content before
/// the first heading) carries an empty title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub title: String,
    pub text: String,
}

/// Transformer output: sections in original document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub sections: Vec<DocumentSection>,
}

impl ParsedDocument {
    /// Whole-document plain text: non-empty section texts joined with a
    /// blank line, heading markup stripped.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub struct WikitextTransformer {
    configuration: Configuration,
}

impl Default for WikitextTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl WikitextTransformer {
    pub fn new() -> Self {
        Self {
            configuration: Configuration::new(&SITE_CONFIGURATION),
        }
    }

    /// Parse wikitext into sections. Deterministic; parser warnings are
    /// logged at debug level and never fail the request.
    pub fn transform(&self, wikitext: &str) -> Result<ParsedDocument, TransformError> {
        if wikitext.len() > MAX_WIKITEXT_BYTES {
            return Err(TransformError::InputTooLarge(wikitext.len()));
        }

        let output = self.configuration.parse(wikitext);
        if !output.warnings.is_empty() {
            tracing::debug!(
                "wikitext parse produced {} warnings (first: {})",
                output.warnings.len(),
                output.warnings[0].message.message()
            );
        }

        Ok(build_document(&output.nodes))
    }
}

/// Split the top-level node list at headings into sections.
///
/// Every heading closes the current section and opens a new one. The lead
/// section keeps the empty title and is dropped when it has no text; titled
/// sections are kept even when empty so callers see the document outline.
fn build_document(nodes: &[Node]) -> ParsedDocument {
    let mut sections = Vec::new();
    let mut title = String::new();
    let mut buffer = String::new();
    let mut lead = true;

    for node in nodes {
        if let Node::Heading { nodes, .. } = node {
            flush_section(&mut sections, &title, &buffer, lead);
            title = collect_text(nodes).trim().to_string();
            buffer.clear();
            lead = false;
        } else {
            append_node(node, &mut buffer);
        }
    }
    flush_section(&mut sections, &title, &buffer, lead);

    ParsedDocument { sections }
}

fn flush_section(sections: &mut Vec<DocumentSection>, title: &str, buffer: &str, lead: bool) {
    let text = normalize(buffer);
    if lead && text.is_empty() {
        return;
    }
    sections.push(DocumentSection {
        title: title.to_string(),
        text,
    });
}

fn collect_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    append_nodes(nodes, &mut out);
    out
}

fn append_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        append_node(node, out);
    }
}

/// Tags whose contents never belong in extracted text.
fn is_opaque_tag(name: &str) -> bool {
    matches!(
        name,
        "ref" | "references" | "gallery" | "imagemap" | "timeline" | "math" | "chem" | "score"
    )
}

fn append_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { value, .. } => out.push_str(value),
        Node::CharacterEntity { character, .. } => out.push(*character),
        Node::ParagraphBreak { .. } => out.push_str("\n\n"),
        Node::HorizontalDivider { .. } => out.push('\n'),

        // Internal links keep their label ([[target]] renders the target).
        Node::Link { text, .. } => append_nodes(text, out),
        // External links keep the label and drop the URL; a bare URL
        // contributes nothing.
        Node::ExternalLink { nodes, .. } => {
            let inner = collect_text(nodes);
            if let Some((_, label)) = inner.split_once(char::is_whitespace) {
                out.push_str(label.trim());
            }
        }

        Node::Preformatted { nodes, .. } => append_nodes(nodes, out),
        Node::Tag { name, nodes, .. } => {
            if !is_opaque_tag(name.as_ref()) {
                append_nodes(nodes, out);
            }
        }

        // One line per item, matching rendered list layout.
        Node::OrderedList { items, .. } | Node::UnorderedList { items, .. } => {
            for item in items {
                append_line(&collect_text(&item.nodes), out);
            }
        }
        Node::DefinitionList { items, .. } => {
            for item in items {
                append_line(&collect_text(&item.nodes), out);
            }
        }

        // Markup with no plain-text rendering: formatting toggles, tables,
        // templates, images, categories, comments, magic words, redirects,
        // template parameters and stray tag tokens. Nested headings cannot
        // occur; top-level ones are handled by the section splitter.
        Node::Bold { .. }
        | Node::BoldItalic { .. }
        | Node::Italic { .. }
        | Node::Category { .. }
        | Node::Comment { .. }
        | Node::EndTag { .. }
        | Node::Heading { .. }
        | Node::Image { .. }
        | Node::MagicWord { .. }
        | Node::Parameter { .. }
        | Node::Redirect { .. }
        | Node::StartTag { .. }
        | Node::Table { .. }
        | Node::Template { .. } => {}
    }
}

fn append_line(line: &str, out: &mut String) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(line);
    out.push('\n');
}

/// Tidy extracted text: trim line ends, collapse blank-line runs to one
/// blank line, drop leading and trailing blank lines.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_blank = false;
    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(line.trim_start());
        pending_blank = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(wikitext: &str) -> ParsedDocument {
        WikitextTransformer::new()
            .transform(wikitext)
            .expect("transform should succeed")
    }

    #[test]
    fn single_heading_and_paragraph() {
        let doc = transform("== Intro ==\nHello world.");
        assert_eq!(
            doc.sections,
            vec![DocumentSection {
                title: "Intro".to_string(),
                text: "Hello world.".to_string(),
            }]
        );
    }

    #[test]
    fn lead_section_has_empty_title() {
        let doc = transform("Opening text.\n\n== Later ==\nMore text.");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "");
        assert_eq!(doc.sections[0].text, "Opening text.");
        assert_eq!(doc.sections[1].title, "Later");
        assert_eq!(doc.sections[1].text, "More text.");
    }

    #[test]
    fn empty_lead_section_is_dropped() {
        let doc = transform("== Only ==\nBody.");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].title, "Only");
    }

    #[test]
    fn titled_empty_section_is_kept() {
        let doc = transform("== Empty ==\n== Full ==\nText.");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].title, "Empty");
        assert_eq!(doc.sections[0].text, "");
        assert_eq!(doc.sections[1].text, "Text.");
    }

    #[test]
    fn empty_input_yields_empty_document() {
        let doc = transform("");
        assert!(doc.sections.is_empty());
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn sections_keep_document_order() {
        let doc = transform("== A ==\none\n== B ==\ntwo\n=== C ===\nthree");
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn internal_link_keeps_label() {
        let doc = transform("See [[target|the label]] and [[plain link]].");
        assert_eq!(doc.sections[0].text, "See the label and plain link.");
    }

    #[test]
    fn external_link_keeps_label_drops_url() {
        let doc = transform("Visit [http://example.com the site] today.");
        assert_eq!(doc.sections[0].text, "Visit the site today.");
    }

    #[test]
    fn bare_external_link_is_dropped() {
        let doc = transform("Before [http://example.com] after.");
        assert_eq!(doc.sections[0].text, "Before  after.");
    }

    #[test]
    fn templates_and_comments_are_stripped() {
        let doc = transform("Real text {{cite web|url=x}} more.<!-- hidden -->");
        assert_eq!(doc.sections[0].text, "Real text  more.");
    }

    #[test]
    fn bold_and_italic_markers_are_stripped() {
        let doc = transform("'''Bold''' and ''italic'' words.");
        assert_eq!(doc.sections[0].text, "Bold and italic words.");
    }

    #[test]
    fn character_entities_are_decoded() {
        let doc = transform("Fish &amp; chips.");
        assert_eq!(doc.sections[0].text, "Fish & chips.");
    }

    #[test]
    fn list_items_one_per_line() {
        let doc = transform("* first\n* second\n* third");
        assert_eq!(doc.sections[0].text, "first\nsecond\nthird");
    }

    #[test]
    fn ref_tag_contents_are_stripped() {
        let doc = transform("Claim.<ref>Some citation</ref> Next.");
        assert_eq!(doc.sections[0].text, "Claim. Next.");
    }

    #[test]
    fn plain_text_joins_sections_without_titles() {
        let doc = transform("Lead.\n\n== One ==\nfirst\n== Two ==\nsecond");
        assert_eq!(doc.plain_text(), "Lead.\n\nfirst\n\nsecond");
    }

    #[test]
    fn plain_text_skips_empty_sections() {
        let doc = transform("== Empty ==\n== Full ==\nonly text");
        assert_eq!(doc.plain_text(), "only text");
    }

    #[test]
    fn blank_line_runs_are_collapsed() {
        let doc = transform("para one\n\n\n\npara two");
        assert_eq!(doc.sections[0].text, "para one\n\npara two");
    }

    #[test]
    fn oversized_input_is_rejected() {
        let big = "a".repeat(MAX_WIKITEXT_BYTES + 1);
        let err = WikitextTransformer::new().transform(&big).unwrap_err();
        assert!(matches!(err, TransformError::InputTooLarge(_)));
    }

    #[test]
    fn transform_is_deterministic() {
        let input = "== Intro ==\nHello [[world]].\n* a\n* b";
        assert_eq!(transform(input), transform(input));
    }
}

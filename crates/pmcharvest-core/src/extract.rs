use crate::document::{Document, Element};
use crate::error::Result;
use crate::models::MetadataRecord;

// ─── Title rules ──────────────────────────────────────────────────────────────

/// One step of the title fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleRule {
    /// First `article-title` anywhere in the document.
    AnyArticleTitle,
    /// First `article-title` directly under a `title-group`.
    TitleGroupArticleTitle,
    /// First `alt-title` directly under a `title-group`.
    TitleGroupAltTitle,
    /// `Untitled (<journal> <year>)` when either part is known.
    Placeholder,
}

/// Evaluated in order; the first rule producing a title wins.
pub const TITLE_RULES: [TitleRule; 4] = [
    TitleRule::AnyArticleTitle,
    TitleRule::TitleGroupArticleTitle,
    TitleRule::TitleGroupAltTitle,
    TitleRule::Placeholder,
];

impl TitleRule {
    /// Each lookup inspects only its first matching element; a blank match
    /// fails the rule rather than continuing to later matches.
    pub fn apply(self, root: &Element) -> Option<String> {
        match self {
            Self::AnyArticleTitle => non_blank(root.find("article-title")),
            Self::TitleGroupArticleTitle => {
                non_blank(root.find_child_of("title-group", "article-title"))
            }
            Self::TitleGroupAltTitle => non_blank(root.find_child_of("title-group", "alt-title")),
            Self::Placeholder => {
                let journal = journal(root).unwrap_or_default();
                let year = year(root).unwrap_or_default();
                if journal.is_empty() && year.is_empty() {
                    return None;
                }
                Some(format!("Untitled ({journal} {year})").trim().to_string())
            }
        }
    }
}

pub fn resolve_title(doc: &Document) -> Option<String> {
    TITLE_RULES.iter().find_map(|rule| rule.apply(doc.root()))
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// Build a metadata record from a parsed JATS document. Pure and total.
pub fn extract_record(doc: &Document) -> MetadataRecord {
    let root = doc.root();
    MetadataRecord {
        pmid: article_id(root, "pmid"),
        doi: article_id(root, "doi"),
        title: resolve_title(doc),
        abstract_text: abstract_text(root),
        journal: journal(root),
        year: year(root),
        authors: authors(root),
    }
}

/// Parse XML text and extract its record. Fails only on malformed XML.
pub fn parse_record(xml: &str) -> Result<MetadataRecord> {
    let doc = Document::parse(xml)?;
    Ok(extract_record(&doc))
}

fn journal(root: &Element) -> Option<String> {
    root.find("journal-title").map(trimmed_text)
}

fn year(root: &Element) -> Option<String> {
    root.find_child_of("pub-date", "year").map(trimmed_text)
}

fn article_id(root: &Element, scheme: &str) -> Option<String> {
    root.find_with_attr("article-id", "pub-id-type", scheme)
        .map(trimmed_text)
}

fn abstract_text(root: &Element) -> Option<String> {
    let joined = root
        .find_outermost("abstract")
        .into_iter()
        .flat_map(Element::text_nodes)
        .collect::<Vec<_>>()
        .join(" ");
    Some(clean_text(&joined)).filter(|text| !text.is_empty())
}

fn authors(root: &Element) -> Option<Vec<String>> {
    let names = root
        .find_all_with_attr("contrib", "contrib-type", "author")
        .filter_map(contributor_name)
        .collect::<Vec<_>>();
    (!names.is_empty()).then_some(names)
}

fn contributor_name(contrib: &Element) -> Option<String> {
    let collab = contrib
        .find("collab")
        .map(|collab| collab.text_without("contrib-group").trim().to_string())
        .filter(|name| !name.is_empty());
    if collab.is_some() {
        return collab;
    }

    let parts = [contrib.find("given-names"), contrib.find("surname")]
        .into_iter()
        .filter_map(non_blank)
        .collect::<Vec<_>>();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn trimmed_text(element: &Element) -> String {
    element.text().trim().to_string()
}

fn non_blank(element: Option<&Element>) -> Option<String> {
    element.map(trimmed_text).filter(|text| !text.is_empty())
}

fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

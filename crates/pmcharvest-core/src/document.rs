//! Owned XML element tree with name-based depth-first lookups.
//!
//! The tree is built from `quick-xml` pull events and exposes a small query
//! surface (first match by name, first match under a given parent, attribute
//! filters, subtree text) so extraction code does not depend on the parser.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse XML text into a single-rooted tree.
    ///
    /// Comments, processing instructions, the declaration and DOCTYPE are
    /// dropped. Fails on malformed markup, unclosed elements, more than one
    /// root, non-whitespace text outside the root, or an empty document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                CoreError::Xml(format!("at byte {}: {e}", reader.buffer_position()))
            })?;

            match event {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| CoreError::Xml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    push_text(&mut stack, value)?;
                }
                Event::CData(data) => {
                    push_text(&mut stack, String::from_utf8_lossy(&data).into_owned())?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(CoreError::Xml(format!("unclosed element <{}>", open.name)));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| CoreError::Xml("document has no root element".to_string()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(CoreError::Xml(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], value: String) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            if !value.is_empty() {
                parent.children.push(Node::Text(value));
            }
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(CoreError::Xml("text outside the root element".to_string())),
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CoreError::Xml(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order, paired with their parent.
    /// The element itself is not included.
    pub fn descendants_with_parent(&self) -> Descendants<'_> {
        let mut stack = Vec::new();
        for child in self.child_elements().rev() {
            stack.push((self, child));
        }
        Descendants { stack }
    }

    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        self.descendants_with_parent().map(|(_, element)| element)
    }

    /// First descendant named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|element| element.name == name)
    }

    /// First descendant named `name` whose direct parent is named `parent`.
    pub fn find_child_of(&self, parent: &str, name: &str) -> Option<&Element> {
        self.descendants_with_parent()
            .find(|(p, element)| p.name == parent && element.name == name)
            .map(|(_, element)| element)
    }

    pub fn find_with_attr(&self, name: &str, attr: &str, value: &str) -> Option<&Element> {
        self.find_all_with_attr(name, attr, value).next()
    }

    pub fn find_all_with_attr<'a>(
        &'a self,
        name: &str,
        attr: &str,
        value: &str,
    ) -> impl Iterator<Item = &'a Element> {
        self.descendants()
            .filter(move |element| element.name == name && element.attr(attr) == Some(value))
    }

    /// Descendants named `name` that are not nested inside another match.
    pub fn find_outermost(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            child.collect_outermost(name, &mut found);
        }
        found
    }

    fn collect_outermost<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
            return;
        }
        for child in self.child_elements() {
            child.collect_outermost(name, found);
        }
    }

    /// Every text node in the subtree, in document order.
    pub fn text_nodes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Full subtree text, concatenated without separators.
    pub fn text(&self) -> String {
        self.text_nodes().concat()
    }

    /// Subtree text with every element named `skip` (and its content) left out.
    pub fn text_without(&self, skip: &str) -> String {
        let mut out = String::new();
        self.collect_text_without(skip, &mut out);
        out
    }

    fn collect_text_without(&self, skip: &str, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) if element.name == skip => {}
                Node::Element(element) => element.collect_text_without(skip, out),
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<(&'a Element, &'a Element)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a Element, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, element) = self.stack.pop()?;
        for child in element.child_elements().rev() {
            self.stack.push((element, child));
        }
        Some((parent, element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Archiving and Interchange DTD v1.3 20210610//EN" "JATS-archivearticle1-3.dtd">
<article article-type="research-article">
  <!-- front matter -->
  <front>
    <title-group>
      <article-title>Deep <italic>and</italic> wide</article-title>
    </title-group>
    <article-id pub-id-type="pmid">111</article-id>
    <article-id pub-id-type="doi">10.1/abc</article-id>
  </front>
  <body><p>Text &amp; more<![CDATA[ <raw> ]]></p></body>
</article>"#;

    #[test]
    fn parses_nested_structure() {
        let doc = Document::parse(SAMPLE).unwrap();
        let root = doc.root();
        assert_eq!(root.name, "article");
        assert_eq!(root.attr("article-type"), Some("research-article"));
        assert_eq!(root.child_elements().count(), 2);
    }

    #[test]
    fn finds_first_match_in_document_order() {
        let doc = Document::parse(SAMPLE).unwrap();
        let names: Vec<&str> = doc.root().descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "front",
                "title-group",
                "article-title",
                "italic",
                "article-id",
                "article-id",
                "body",
                "p"
            ]
        );
        assert_eq!(
            doc.root().find("article-id").map(Element::text).as_deref(),
            Some("111")
        );
    }

    #[test]
    fn attribute_and_parent_filters() {
        let doc = Document::parse(SAMPLE).unwrap();
        let root = doc.root();
        assert_eq!(
            root.find_with_attr("article-id", "pub-id-type", "doi")
                .map(Element::text)
                .as_deref(),
            Some("10.1/abc")
        );
        assert!(root.find_with_attr("article-id", "pub-id-type", "pmc").is_none());
        assert!(root.find_child_of("title-group", "article-title").is_some());
        assert!(root.find_child_of("front", "article-title").is_none());
    }

    #[test]
    fn text_variants() {
        let doc = Document::parse(SAMPLE).unwrap();
        let title = doc.root().find("article-title").unwrap();
        assert_eq!(title.text(), "Deep and wide");
        assert_eq!(title.text_without("italic"), "Deep  wide");
        assert_eq!(title.text_nodes(), vec!["Deep ", "and", " wide"]);

        let p = doc.root().find("p").unwrap();
        assert_eq!(p.text(), "Text & more <raw> ");
    }

    #[test]
    fn outermost_skips_nested_matches() {
        let doc = Document::parse("<r><a><a>x</a></a><b><a>y</a></b></r>").unwrap();
        let found = doc.root().find_outermost("a");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text(), "x");
        assert_eq!(found[1].text(), "y");
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(Document::parse(""), Err(CoreError::Xml(_))));
        assert!(matches!(Document::parse("not xml"), Err(CoreError::Xml(_))));
        assert!(matches!(Document::parse("<a><b></a>"), Err(CoreError::Xml(_))));
        assert!(matches!(Document::parse("<a><b>"), Err(CoreError::Xml(_))));
        assert!(matches!(Document::parse("<a/><b/>"), Err(CoreError::Xml(_))));
    }

    #[test]
    fn unknown_entities_are_kept_raw() {
        let doc = Document::parse(r#"<p><ext-link href="a&nbsp;b">A&nbsp;B</ext-link></p>"#).unwrap();
        let link = doc.root().find("ext-link").unwrap();
        assert_eq!(link.attr("href"), Some("a&nbsp;b"));
        assert_eq!(link.text(), "A&nbsp;B");
    }

    #[test]
    fn self_closing_root_is_a_document() {
        let doc = Document::parse("<article/>").unwrap();
        assert_eq!(doc.root().name, "article");
        assert!(doc.root().children.is_empty());
    }
}

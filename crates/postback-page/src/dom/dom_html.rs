//! HTML parsing into the owned tree, and serialization back to markup.

use scraper::{ElementRef, Html};

use super::dom_node::{Document, Element, Node};
use crate::error::PageError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// Parse a full document. HTML parsing never fails; broken markup is
    /// repaired the way browsers do.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let children = parsed
            .tree
            .root()
            .children()
            .filter_map(|child| convert(child.value(), ElementRef::wrap(child)))
            .collect();
        Self { children }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_html(&mut out);
        }
        out
    }
}

/// Parse a markup snippet with the same grammar as a full document, as the
/// content of a `<body>`.
///
/// Snippets carrying characters that cannot appear in markup are rejected.
pub fn parse_fragment(html: &str) -> Result<Vec<Node>, PageError> {
    if let Some(c) = html
        .chars()
        .find(|c| (*c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(PageError::MalformedMarkup(format!(
            "invalid character U+{:04X}",
            c as u32
        )));
    }

    let wrapped = format!("<html><body>{}</body></html>", html);
    let document = Document::parse(&wrapped);

    let body = document
        .find_first(|e| e.tag == "body")
        .and_then(|path| document.element(&path).cloned())
        .ok_or_else(|| PageError::MalformedMarkup("fragment has no body".to_string()))?;

    Ok(body.children)
}

fn convert(value: &scraper::Node, element: Option<ElementRef<'_>>) -> Option<Node> {
    match value {
        scraper::Node::Element(_) => element.map(|e| Node::Element(convert_element(e))),
        scraper::Node::Text(text) => Some(Node::Text(String::from(&**text))),
        scraper::Node::Comment(comment) => Some(Node::Comment(String::from(&**comment))),
        scraper::Node::Doctype(doctype) => Some(Node::Doctype(doctype.name().to_string())),
        _ => None,
    }
}

fn convert_element(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut out = Element::new(value.name());
    out.attributes = value
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    out.children = element
        .children()
        .filter_map(|child| convert(child.value(), ElementRef::wrap(child)))
        .collect();
    out
}

impl Node {
    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) => escape_into(text, false, out),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Doctype(name) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

impl Element {
    pub fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        self.write_children(out);

        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Markup of the children only.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    fn write_children(&self, out: &mut String) {
        let raw = RAW_TEXT_ELEMENTS.contains(&self.tag.as_str());
        for child in &self.children {
            match child {
                Node::Text(text) if raw => out.push_str(text),
                other => other.write_html(out),
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

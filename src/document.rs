//! Parsed-document capabilities used by the notification extractor.
//!
//! The extractor never touches an HTML library directly. It asks a [`DocumentTree`]
//! for a handful of structural operations: find an element by its marker text, climb to
//! an enclosing container, step to a following sibling, look for a styled descendant,
//! and read text or markup. [`HtmlDocument`] implements these on top of `scraper`.
//!
//! # Example
//!
//! ```
//! use inbox_watch::document::{DocumentTree, HtmlDocument, Marker};
//! use regex::Regex;
//!
//! let doc = HtmlDocument::parse(
//!     "<table><tr><td><span>HEAD</span></td></tr><tr><td>next row</td></tr></table>",
//! );
//! let marker = Marker::new("span", Regex::new("HEAD").unwrap());
//!
//! let span = doc.find_by_marker_text(&marker).unwrap();
//! let row = doc.enclosing(span, "tr").unwrap();
//! let next = doc.following_sibling(row, "tr").unwrap();
//! assert_eq!(doc.inner_text(next), "next row");
//! ```

use crate::entities::encode_named_entities;
use regex::Regex;
use scraper::{ElementRef, Html, Node};

/// Identifies an element by tag, optional class, and the text it holds.
///
/// The text is the element's sole string: the element must contain exactly one child,
/// either a text node or an element that itself satisfies this rule. Wrapping
/// containers therefore never match a marker meant for the innermost label.
#[derive(Debug, Clone)]
pub struct Marker {
    tag: &'static str,
    class: Option<&'static str>,
    pattern: Regex,
}

impl Marker {
    /// Creates a marker for `tag` elements whose sole string matches `pattern`.
    #[must_use]
    pub fn new(tag: &'static str, pattern: Regex) -> Self {
        Self {
            tag,
            class: None,
            pattern,
        }
    }

    /// Additionally requires the element to carry `class`.
    #[must_use]
    pub fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    /// Returns the tag name this marker looks for.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.tag
    }

    /// Returns the required class, if any.
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.class
    }

    /// Returns `true` if `text` matches the marker pattern.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Structural operations over a parsed document.
///
/// Every operation returns `None` when the requested node does not exist; none of them
/// fail otherwise.
pub trait DocumentTree {
    /// Handle to an element of the document.
    type Node<'a>: Copy
    where
        Self: 'a;

    /// All text of the document concatenated in document order, whitespace included.
    fn flattened_text(&self) -> String;

    /// First element in document order matching `marker`.
    fn find_by_marker_text(&self, marker: &Marker) -> Option<Self::Node<'_>>;

    /// Nearest ancestor of `node` with the given tag.
    fn enclosing<'a>(&'a self, node: Self::Node<'a>, tag: &str) -> Option<Self::Node<'a>>;

    /// Next sibling of `node` with the given tag.
    fn following_sibling<'a>(&'a self, node: Self::Node<'a>, tag: &str)
        -> Option<Self::Node<'a>>;

    /// First descendant of `node` (or `node` itself) with the given tag and class.
    fn styled_descendant<'a>(
        &'a self,
        node: Self::Node<'a>,
        tag: &str,
        class: &str,
    ) -> Option<Self::Node<'a>>;

    /// Text of `node` with every text fragment trimmed and empty fragments dropped.
    fn inner_text<'a>(&'a self, node: Self::Node<'a>) -> String;

    /// Inner markup of `node`, trimmed, with named entities kept in entity form.
    fn inner_html_preserving_entities<'a>(&'a self, node: Self::Node<'a>) -> String;
}

/// HTML5 document parsed with `scraper`.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses `source` as a full HTML document.
    ///
    /// Parsing is lenient: any input, including empty or non-HTML text, yields a document.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.root_element().descendants().filter_map(ElementRef::wrap)
    }
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument").finish_non_exhaustive()
    }
}

impl DocumentTree for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn flattened_text(&self) -> String {
        self.html.root_element().text().collect()
    }

    fn find_by_marker_text(&self, marker: &Marker) -> Option<ElementRef<'_>> {
        self.elements().find(|element| {
            let value = element.value();
            value.name() == marker.tag()
                && marker
                    .class()
                    .map_or(true, |class| value.classes().any(|c| c == class))
                && sole_string(*element).is_some_and(|text| marker.matches_text(text))
        })
    }

    fn enclosing<'a>(&'a self, node: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
        node.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == tag)
    }

    fn following_sibling<'a>(&'a self, node: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
        node.next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == tag)
    }

    fn styled_descendant<'a>(
        &'a self,
        node: ElementRef<'a>,
        tag: &str,
        class: &str,
    ) -> Option<ElementRef<'a>> {
        node.descendants().filter_map(ElementRef::wrap).find(|element| {
            let value = element.value();
            value.name() == tag && value.classes().any(|c| c == class)
        })
    }

    fn inner_text<'a>(&'a self, node: ElementRef<'a>) -> String {
        node.text()
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect()
    }

    fn inner_html_preserving_entities<'a>(&'a self, node: ElementRef<'a>) -> String {
        encode_named_entities(node.inner_html().trim())
    }
}

/// The single string an element holds, following single-child chains.
fn sole_string(element: ElementRef<'_>) -> Option<&str> {
    let mut children = element.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }

    match only.value() {
        Node::Text(text) => Some(&**text),
        Node::Element(_) => ElementRef::wrap(only).and_then(sole_string),
        _ => None,
    }
}

//! Presentation tree built by the renderers and rewritten by the passes.
//!
//! The tree is a plain owned structure: elements carry a tag, ordered
//! attributes and children; text runs hold unescaped text; raw nodes hold
//! HTML fragments that are emitted verbatim (highlighted code, HTML blocks the
//! renderer could not type). Serialization goes through [`maud::Render`] so
//! the tree can be embedded directly in page markup.

use maud::Render;
use regex::Regex;
use std::sync::LazyLock;

/// Elements serialized without children or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements followed by a newline when serialized.
const BLOCK_TAGS: &[&str] = &[
    "blockquote",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "thead",
    "tr",
    "ul",
];

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^<([A-Za-z][A-Za-z0-9-]*)((?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>$"#,
    )
    .expect("open tag regex")
});

static CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</([A-Za-z][A-Za-z0-9-]*)\s*>$").expect("close tag regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .expect("attribute regex")
});

/// Node of the presentation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Raw(String),
}

impl Node {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// Returns the element when this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element mutably when this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Checks whether this node is an element with the given tag.
    pub fn is_element(&self, tag: &str) -> bool {
        self.as_element().is_some_and(|element| element.is(tag))
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Raw fragments contribute nothing: they are opaque to text matching.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Raw(_) => {}
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Element node with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::add_class`].
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Appends a class unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    /// Checks whether the element starts a new line of flow content.
    pub fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.tag.as_str())
    }
}

/// Root of a rendered document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Serializes the document to an HTML fragment.
    pub fn to_html(&self) -> String {
        self.render().into_string()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Collects every element with the given tag in document order.
    pub fn elements(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_elements(&self.children, tag, &mut found);
        found
    }
}

fn collect_elements<'a>(nodes: &'a [Node], tag: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.is(tag) {
                found.push(element);
            }
            collect_elements(&element.children, tag, found);
        }
    }
}

impl Render for Document {
    fn render_to(&self, buffer: &mut String) {
        for child in &self.children {
            child.render_to(buffer);
        }
    }
}

impl Render for Node {
    fn render_to(&self, buffer: &mut String) {
        match self {
            Node::Text(text) => escape_html_into(buffer, text),
            Node::Raw(html) => buffer.push_str(html),
            Node::Element(element) => element.render_to(buffer),
        }
    }
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(&self.tag);
        for (name, value) in &self.attrs {
            buffer.push(' ');
            buffer.push_str(name);
            buffer.push_str("=\"");
            escape_html_into(buffer, value);
            buffer.push('"');
        }
        buffer.push('>');

        if !self.is_void() {
            for child in &self.children {
                child.render_to(buffer);
            }
            buffer.push_str("</");
            buffer.push_str(&self.tag);
            buffer.push('>');
        }

        if self.is_block() {
            buffer.push('\n');
        }
    }
}

/// Merges adjacent text runs and drops empty ones.
pub fn merge_text(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match (merged.last_mut(), node) {
            (_, Node::Text(text)) if text.is_empty() => {}
            (Some(Node::Text(previous)), Node::Text(text)) => previous.push_str(&text),
            (_, node) => merged.push(node),
        }
    }
    *nodes = merged;
}

/// Parsed form of a raw HTML tag fragment.
enum Tag {
    Open(Element, bool),
    Close(String),
}

fn parse_tag(fragment: &str) -> Option<Tag> {
    let fragment = fragment.trim();
    if let Some(caps) = CLOSE_TAG.captures(fragment) {
        return Some(Tag::Close(caps[1].to_ascii_lowercase()));
    }

    let caps = OPEN_TAG.captures(fragment)?;
    let mut element = Element::new(caps[1].to_ascii_lowercase());
    for attr in ATTRIBUTE.captures_iter(caps.get(2).map_or("", |m| m.as_str())) {
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());
        element.set_attr(attr[1].to_ascii_lowercase(), decode_entities(value));
    }
    let self_closing = &caps[3] == "/" || element.is_void();
    Some(Tag::Open(element, self_closing))
}

/// Open element waiting for its closing tag.
struct Frame {
    source: String,
    element: Element,
}

/// Folds raw inline HTML tags into typed elements.
///
/// A simple open tag and the matching close tag found later in the same
/// inline run become one [`Element`] holding the nodes between them. Void and
/// self-closing tags become childless elements. Tags that cannot be paired
/// stay raw, so the serialized output is unchanged for them.
///
/// # Arguments
///
/// * `nodes`: Inline children of one container, in document order
///
/// # Returns
///
/// Inline children with paired tags folded
pub fn fold_inline_html(nodes: Vec<Node>) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut stack: Vec<Frame> = Vec::new();

    fn push(root: &mut Vec<Node>, stack: &mut [Frame], node: Node) {
        match stack.last_mut() {
            Some(frame) => frame.element.children.push(node),
            None => root.push(node),
        }
    }

    for node in nodes {
        let Node::Raw(fragment) = &node else {
            push(&mut root, &mut stack, node);
            continue;
        };

        match parse_tag(fragment) {
            Some(Tag::Open(element, true)) => push(&mut root, &mut stack, element.into()),
            Some(Tag::Open(element, false)) => stack.push(Frame {
                source: fragment.clone(),
                element,
            }),
            Some(Tag::Close(name)) if stack.last().is_some_and(|f| f.element.tag == name) => {
                if let Some(frame) = stack.pop() {
                    push(&mut root, &mut stack, frame.element.into());
                }
            }
            _ => push(&mut root, &mut stack, node),
        }
    }

    // Unclosed tags unwind back into raw fragments followed by their content.
    while let Some(frame) = stack.pop() {
        push(&mut root, &mut stack, Node::Raw(frame.source));
        for child in frame.element.children {
            push(&mut root, &mut stack, child);
        }
    }

    root
}

/// Escapes HTML special characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

fn escape_html_into(buffer: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => buffer.push_str("&amp;"),
            '<' => buffer.push_str("&lt;"),
            '>' => buffer.push_str("&gt;"),
            '"' => buffer.push_str("&quot;"),
            '\'' => buffer.push_str("&#39;"),
            _ => buffer.push(ch),
        }
    }
}

/// Decodes the entities produced by [`escape_html`].
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

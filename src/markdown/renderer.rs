//! Comrak-backed renderer producing the presentation tree.

use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use super::Renderer;
use super::lines::{FenceTracker, container_prefix_len};
use crate::tree::{Document, Element, Node, fold_inline_html, merge_text};

static FOOTNOTE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( {0,3})\[\^[^\]\n]+\]:").expect("footnote definition regex"));

/// Renders markdown with comrak and converts its AST into a [`Document`].
///
/// Enables the GFM extensions that have no counterpart in the tree passes:
/// tables, strikethrough and autolinks. Task lists and footnotes stay
/// disabled so that `[ ]` and `[^id]` reach the passes as plain text. Raw
/// HTML is allowed because the pre-render transform emits inline tags.
pub struct ComrakRenderer<'a> {
    options: Options<'a>,
}

impl<'a> ComrakRenderer<'a> {
    /// Creates renderer with the GitHub extension set.
    ///
    /// Configures:
    /// - Tables, strikethrough, autolinks
    /// - Raw HTML passthrough (content is author-trusted)
    /// - No smart punctuation, so source quotes survive unchanged
    pub fn new() -> Self {
        let mut options = Options::default();

        // Extension options (GFM features)
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = false;
        options.extension.footnotes = false;

        // Render options (security: we trust)
        options.render.unsafe_ = true;

        Self { options }
    }

    /// Converts the children of a comrak node.
    ///
    /// `tight` is set for the children of an item in a tight list, whose
    /// paragraphs render without a `<p>` wrapper.
    fn convert_children<'n>(&self, node: &'n AstNode<'n>, tight: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        for child in node.children() {
            self.convert(child, tight, &mut nodes);
        }
        nodes
    }

    /// Converts inline children, normalizing text runs and raw tags.
    fn convert_inlines<'n>(&self, node: &'n AstNode<'n>) -> Vec<Node> {
        let mut nodes = self.convert_children(node, false);
        merge_text(&mut nodes);
        let mut nodes = fold_inline_html(nodes);
        merge_text(&mut nodes);
        nodes
    }

    fn convert<'n>(&self, node: &'n AstNode<'n>, tight: bool, out: &mut Vec<Node>) {
        let value = node.data.borrow().value.clone();

        let converted: Node = match value {
            NodeValue::Document => {
                out.extend(self.convert_children(node, false));
                return;
            }
            NodeValue::Paragraph if tight => {
                out.extend(self.convert_inlines(node));
                return;
            }
            NodeValue::Paragraph => Element::new("p")
                .with_children(self.convert_inlines(node))
                .into(),
            NodeValue::BlockQuote => Element::new("blockquote")
                .with_children(self.convert_children(node, false))
                .into(),
            NodeValue::List(list) => {
                let mut element = match list.list_type {
                    ListType::Bullet => Element::new("ul"),
                    ListType::Ordered => Element::new("ol"),
                };
                if list.list_type == ListType::Ordered && list.start != 1 {
                    element.set_attr("start", list.start.to_string());
                }
                let mut items = Vec::new();
                for item in node.children() {
                    let children = self.convert_children(item, list.tight);
                    items.push(Element::new("li").with_children(children).into());
                }
                element.with_children(items).into()
            }
            NodeValue::Item(_) => Element::new("li")
                .with_children(self.convert_children(node, tight))
                .into(),
            NodeValue::Heading(heading) => Element::new(format!("h{}", heading.level))
                .with_children(self.convert_inlines(node))
                .into(),
            NodeValue::ThematicBreak => Element::new("hr").into(),
            NodeValue::CodeBlock(block) => {
                let mut code = Element::new("code");
                if let Some(language) = block.info.split_whitespace().next() {
                    code.set_attr("class", format!("language-{}", language));
                }
                Element::new("pre")
                    .with_children(vec![code.with_text(block.literal).into()])
                    .into()
            }
            NodeValue::HtmlBlock(block) => Node::Raw(block.literal),
            NodeValue::Table(table) => self.convert_table(node, &table.alignments),
            NodeValue::Text(text) => Node::Text(text),
            NodeValue::SoftBreak => Node::text("\n"),
            NodeValue::LineBreak => Element::new("br").into(),
            NodeValue::Code(code) => Element::new("code").with_text(code.literal).into(),
            NodeValue::HtmlInline(html) => Node::Raw(html),
            NodeValue::Emph => Element::new("em")
                .with_children(self.convert_inlines(node))
                .into(),
            NodeValue::Strong => Element::new("strong")
                .with_children(self.convert_inlines(node))
                .into(),
            NodeValue::Strikethrough => Element::new("del")
                .with_children(self.convert_inlines(node))
                .into(),
            NodeValue::Link(link) => {
                let mut anchor = Element::new("a").with_attr("href", link.url);
                if !link.title.is_empty() {
                    anchor.set_attr("title", link.title);
                }
                anchor.with_children(self.convert_inlines(node)).into()
            }
            NodeValue::Image(link) => {
                let alt = Document::new(self.convert_inlines(node)).text_content();
                let mut image = Element::new("img")
                    .with_attr("src", link.url)
                    .with_attr("alt", alt);
                if !link.title.is_empty() {
                    image.set_attr("title", link.title);
                }
                image.into()
            }
            _ => Node::Raw(self.format_subtree(node)),
        };

        out.push(converted);
    }

    /// Builds a table with a header section and a body section.
    fn convert_table<'n>(&self, node: &'n AstNode<'n>, alignments: &[TableAlignment]) -> Node {
        let mut head = Vec::new();
        let mut body = Vec::new();

        for row in node.children() {
            let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            let cell_tag = if header { "th" } else { "td" };

            let mut cells = Vec::new();
            for (index, cell) in row.children().enumerate() {
                let mut element = Element::new(cell_tag);
                let align = match alignments.get(index) {
                    Some(TableAlignment::Left) => Some("left"),
                    Some(TableAlignment::Center) => Some("center"),
                    Some(TableAlignment::Right) => Some("right"),
                    _ => None,
                };
                if let Some(align) = align {
                    element.set_attr("align", align);
                }
                cells.push(element.with_children(self.convert_inlines(cell)).into());
            }

            let row = Element::new("tr").with_children(cells).into();
            if header {
                head.push(row);
            } else {
                body.push(row);
            }
        }

        let mut sections = vec![Element::new("thead").with_children(head).into()];
        if !body.is_empty() {
            sections.push(Element::new("tbody").with_children(body).into());
        }
        Element::new("table").with_children(sections).into()
    }

    /// Serializes a node comrak knows but the tree has no typed mapping for.
    fn format_subtree<'n>(&self, node: &'n AstNode<'n>) -> String {
        let mut html = Vec::new();
        if let Err(e) = comrak::format_html(node, &self.options, &mut html) {
            warn!(error = %e, "Failed to format markdown node");
            return String::new();
        }
        String::from_utf8_lossy(&html).into_owned()
    }
}

impl<'a> Default for ComrakRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ComrakRenderer<'_> {
    fn name(&self) -> &'static str {
        "comrak"
    }

    fn render(&self, text: &str) -> Document {
        let text = protect_footnote_definitions(text);
        let arena = Arena::new();
        let root = comrak::parse_document(&arena, &text, &self.options);
        Document::new(self.convert_children(root, false))
    }
}

/// Escapes the bracket of footnote definition lines outside fenced code.
///
/// `[^id]: word` is otherwise a valid link reference definition and comrak
/// would consume the line along with every `[^id]` reference to it. This
/// holds inside blockquotes and list items too, so container markers are
/// skipped before matching.
fn protect_footnote_definitions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut fences = FenceTracker::new();

    for line in text.split_inclusive('\n') {
        if fences.is_code(line) {
            out.push_str(line);
            continue;
        }

        let prefix = container_prefix_len(line);
        match FOOTNOTE_DEFINITION.captures(&line[prefix..]) {
            Some(caps) => {
                let bracket = prefix + caps[1].len();
                out.push_str(&line[..bracket]);
                out.push('\\');
                out.push_str(&line[bracket..]);
            }
            None => out.push_str(line),
        }
    }

    out
}

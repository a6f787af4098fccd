//! Footnote definitions, references and the trailing footnotes section.
//!
//! Resolution runs in three steps over typed nodes:
//!
//! 1. Lines of the form `[^id]: text` are cut out of the tree and recorded in
//!    a table. A definition ends at the end of its line: a newline inside a
//!    text run, a `<br>` or the next block element.
//! 2. Remaining `[^id]` tokens with a recorded id become superscript links
//!    numbered by first appearance. Unknown ids stay literal.
//! 3. If anything resolved, a `div.footnote` section is appended.
//!
//! Code spans and code blocks are never scanned.

use regex::Regex;
use std::collections::HashMap;
use std::mem;
use std::sync::LazyLock;

use super::Pass;
use crate::pipeline::RunContext;
use crate::tree::{Document, Element, Node, merge_text};

static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^([^\]\n]+)\]:[ \t]*").expect("footnote definition regex"));

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^([^\]]+)\]").expect("footnote reference regex"));

/// Class of the appended footnotes section.
pub const SECTION_CLASS: &str = "footnote";

/// Anchor id of a footnote entry.
pub fn anchor(id: &str) -> String {
    format!("footnote-{}", id)
}

/// Resolves footnotes and appends the footnotes section.
pub struct Footnotes;

impl Pass for Footnotes {
    fn name(&self) -> &'static str {
        "footnotes"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>) {
        let mut table = FootnoteTable::default();
        extract(&mut doc.children, &mut table);
        if table.is_empty() {
            return;
        }

        let mut order = Vec::new();
        substitute(&mut doc.children, &table, &mut order);
        if order.is_empty() {
            return;
        }

        ctx.report.footnotes += order.len();
        doc.children.push(section(&order, &mut table).into());
    }
}

/// Footnote id to definition content.
#[derive(Debug, Default)]
struct FootnoteTable {
    definitions: HashMap<String, Vec<Node>>,
}

impl FootnoteTable {
    /// Records a definition; a later definition of the same id wins.
    fn define(&mut self, id: String, content: Vec<Node>) {
        self.definitions.insert(id, content);
    }

    fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn take(&mut self, id: &str) -> Vec<Node> {
        self.definitions.remove(id).unwrap_or_default()
    }
}

/// Definition being collected until the end of its line.
struct Pending {
    id: String,
    marker: String,
    content: Vec<Node>,
}

/// Line-aware scan over the children of one block container.
struct Extractor<'t> {
    table: &'t mut FootnoteTable,
    out: Vec<Node>,
    at_line_start: bool,
    pending: Option<Pending>,
    removed: usize,
}

impl<'t> Extractor<'t> {
    fn new(table: &'t mut FootnoteTable) -> Self {
        Self {
            table,
            out: Vec::new(),
            at_line_start: true,
            pending: None,
            removed: 0,
        }
    }

    fn run(mut self, nodes: Vec<Node>) -> (Vec<Node>, usize) {
        for node in nodes {
            match node {
                Node::Text(text) => self.text(&text),
                Node::Element(element) if element.is("br") => {
                    if self.pending.is_some() {
                        self.finish(Some(element.into()));
                    } else {
                        self.out.push(element.into());
                    }
                    self.at_line_start = true;
                }
                Node::Element(element) if starts_line(&element) => {
                    self.finish(None);
                    self.block(element);
                    self.at_line_start = true;
                }
                node => match &mut self.pending {
                    Some(pending) => pending.content.push(node),
                    None => {
                        self.out.push(node);
                        self.at_line_start = false;
                    }
                },
            }
        }
        self.finish(None);

        merge_text(&mut self.out);
        (self.out, self.removed)
    }

    /// Recurses into a nested container and drops paragraphs it emptied.
    fn block(&mut self, mut element: Element) {
        if element.is("pre") {
            self.out.push(element.into());
            return;
        }

        let children = mem::take(&mut element.children);
        let (children, removed) = Extractor::new(&mut *self.table).run(children);
        element.children = children;
        self.removed += removed;

        if removed > 0 && element.is("p") && is_blank(&element.children) {
            return;
        }
        self.out.push(element.into());
    }

    fn text(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            if let Some(pending) = &mut self.pending {
                match rest.find('\n') {
                    Some(pos) => {
                        pending.content.push(Node::text(&rest[..pos]));
                        self.finish(Some(Node::text("\n")));
                        self.at_line_start = true;
                        rest = &rest[pos + 1..];
                        continue;
                    }
                    None => {
                        pending.content.push(Node::text(rest));
                        return;
                    }
                }
            }

            if self.at_line_start {
                if let Some(caps) = DEFINITION.captures(rest) {
                    self.pending = Some(Pending {
                        id: caps[1].to_string(),
                        marker: caps[0].to_string(),
                        content: Vec::new(),
                    });
                    rest = &rest[caps[0].len()..];
                    if rest.is_empty() {
                        return;
                    }
                    continue;
                }
            }

            match rest.find('\n') {
                Some(pos) => {
                    self.out.push(Node::text(&rest[..=pos]));
                    self.at_line_start = true;
                    rest = &rest[pos + 1..];
                }
                None => {
                    self.out.push(Node::text(rest));
                    self.at_line_start = false;
                    return;
                }
            }
        }
    }

    /// Ends the pending definition, if any.
    ///
    /// `terminator` is the line break that ended it. Blank definitions are
    /// put back as ordinary text; a definition ended without a line break
    /// takes the preceding line break with it.
    fn finish(&mut self, terminator: Option<Node>) {
        let Some(pending) = self.pending.take() else {
            if let Some(terminator) = terminator {
                self.out.push(terminator);
            }
            return;
        };

        let mut content = pending.content;
        merge_text(&mut content);
        if let Some(Node::Text(last)) = content.last_mut() {
            let trimmed = last.trim_end().len();
            last.truncate(trimmed);
        }
        merge_text(&mut content);

        if is_blank(&content) {
            self.out.push(Node::Text(pending.marker));
            self.out.extend(content);
            if let Some(terminator) = terminator {
                self.out.push(terminator);
            }
            self.at_line_start = true;
            return;
        }

        if terminator.is_none() {
            self.trim_preceding_break();
        }
        self.table.define(pending.id, content);
        self.removed += 1;
    }

    fn trim_preceding_break(&mut self) {
        match self.out.last_mut() {
            Some(Node::Text(text)) if text.ends_with('\n') => {
                text.pop();
                if text.is_empty() {
                    self.out.pop();
                }
            }
            Some(node) if node.is_element("br") => {
                self.out.pop();
            }
            _ => {}
        }
    }
}

/// Elements that end a line and hold their own lines.
fn starts_line(element: &Element) -> bool {
    element.is_block() || element.is("td") || element.is("th")
}

fn is_blank(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| match node {
        Node::Text(text) => text.trim().is_empty(),
        _ => false,
    })
}

/// Cuts definitions out of `nodes` into `table`.
fn extract(nodes: &mut Vec<Node>, table: &mut FootnoteTable) {
    let children = mem::take(nodes);
    let (children, _) = Extractor::new(table).run(children);
    *nodes = children;
}

/// Replaces known references, numbering ids by first appearance.
fn substitute(nodes: &mut Vec<Node>, table: &FootnoteTable, order: &mut Vec<String>) {
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if REFERENCE.is_match(&text) => {
                split_references(&text, table, order, &mut out);
            }
            Node::Element(mut element) => {
                if !element.is("pre") && !element.is("code") {
                    substitute(&mut element.children, table, order);
                }
                out.push(element.into());
            }
            other => out.push(other),
        }
    }

    merge_text(&mut out);
    *nodes = out;
}

fn split_references(
    text: &str,
    table: &FootnoteTable,
    order: &mut Vec<String>,
    out: &mut Vec<Node>,
) {
    let mut last = 0;
    for caps in REFERENCE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let id = &caps[1];
        if !table.contains(id) {
            continue;
        }

        let number = match order.iter().position(|known| known == id) {
            Some(index) => index + 1,
            None => {
                order.push(id.to_string());
                order.len()
            }
        };

        out.push(Node::text(&text[last..whole.start()]));
        out.push(reference(id, number).into());
        last = whole.end();
    }
    out.push(Node::text(&text[last..]));
}

/// Superscript link to a footnote entry.
fn reference(id: &str, number: usize) -> Element {
    let link = Element::new("a")
        .with_attr("href", format!("#{}", anchor(id)))
        .with_text(number.to_string());
    Element::new("sup").with_children(vec![link.into()])
}

/// Footnotes section listing referenced definitions in numbering order.
fn section(order: &[String], table: &mut FootnoteTable) -> Element {
    let mut children = vec![Element::new("hr").into()];
    for (index, id) in order.iter().enumerate() {
        let mut entry = vec![Node::text(format!("{}. ", index + 1))];
        entry.extend(table.take(id));
        merge_text(&mut entry);
        children.push(
            Element::new("p")
                .with_attr("id", anchor(id))
                .with_children(entry)
                .into(),
        );
    }
    Element::new("div")
        .with_class(SECTION_CLASS)
        .with_children(children)
}

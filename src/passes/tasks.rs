//! Task list items with disabled checkboxes.

use regex::Regex;
use std::sync::LazyLock;

use super::Pass;
use crate::pipeline::{MatchScope, RunContext};
use crate::tree::{Document, Element, Node};

/// Class added to converted list items.
pub const TASK_CLASS: &str = "task-list-item";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[( |x)\]").expect("task token regex"));

static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\[( |x)\]").expect("leading task token regex"));

/// Converts `[ ]` and `[x]` in list items into checkboxes.
///
/// Items are handled innermost first. In textual scope every token anywhere
/// in the item is converted, code included; in structural scope only a token
/// leading the item's first text run is.
pub struct TaskLists;

impl Pass for TaskLists {
    fn name(&self) -> &'static str {
        "tasks"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>) {
        ctx.report.tasks += convert(&mut doc.children, ctx.options.scope);
    }
}

/// Builds a disabled checkbox.
pub fn checkbox(checked: bool) -> Element {
    let mut input = Element::new("input").with_attr("type", "checkbox");
    if checked {
        input.set_attr("checked", "");
    }
    input.with_attr("disabled", "")
}

fn convert(nodes: &mut [Node], scope: MatchScope) -> usize {
    let mut count = 0;
    for node in nodes {
        let Some(element) = node.as_element_mut() else {
            continue;
        };
        count += convert(&mut element.children, scope);

        if element.is("li") {
            let replaced = match scope {
                MatchScope::Textual => replace_tokens(&mut element.children),
                MatchScope::Structural => replace_leading_token(element),
            };
            if replaced > 0 {
                element.add_class(TASK_CLASS);
                count += 1;
            }
        }
    }
    count
}

/// Replaces every token in the text below `nodes`.
fn replace_tokens(nodes: &mut Vec<Node>) -> usize {
    let mut replaced = 0;
    let mut out = Vec::with_capacity(nodes.len());

    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if TOKEN.is_match(&text) => {
                replaced += split_tokens(&text, &mut out);
            }
            Node::Element(mut element) => {
                replaced += replace_tokens(&mut element.children);
                out.push(element.into());
            }
            other => out.push(other),
        }
    }

    *nodes = out;
    replaced
}

fn split_tokens(text: &str, out: &mut Vec<Node>) -> usize {
    let mut count = 0;
    let mut last = 0;
    for caps in TOKEN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            out.push(Node::text(&text[last..whole.start()]));
        }
        out.push(checkbox(&caps[1] == "x").into());
        last = whole.end();
        count += 1;
    }
    if last < text.len() {
        out.push(Node::text(&text[last..]));
    }
    count
}

/// Replaces a token at the start of the item's first text run.
fn replace_leading_token(item: &mut Element) -> usize {
    let in_paragraph = item.children.first().is_some_and(|first| first.is_element("p"));
    let container = if in_paragraph {
        match &mut item.children[0] {
            Node::Element(p) => &mut p.children,
            _ => return 0,
        }
    } else {
        &mut item.children
    };

    let Some(Node::Text(text)) = container.first() else {
        return 0;
    };
    let Some(caps) = LEADING_TOKEN.captures(text) else {
        return 0;
    };

    let indent = caps[1].to_string();
    let checked = &caps[2] == "x";
    let rest = text[caps[0].len()..].to_string();

    let mut leading = Vec::with_capacity(3);
    if !indent.is_empty() {
        leading.push(Node::Text(indent));
    }
    leading.push(checkbox(checked).into());
    if !rest.is_empty() {
        leading.push(Node::Text(rest));
    }
    container.splice(0..1, leading);
    1
}

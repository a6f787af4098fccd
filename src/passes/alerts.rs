//! GitHub alert blockquotes (`> [!NOTE]` and friends).

use regex::Regex;
use std::sync::LazyLock;

use super::Pass;
use crate::pipeline::{MatchScope, RunContext};
use crate::tree::{Document, Element, Node, merge_text};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[!(NOTE|TIP|IMPORTANT|WARNING|CAUTION)\]").expect("alert marker regex")
});

/// The five alert kinds GitHub recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    pub const ALL: [AlertKind; 5] = [
        AlertKind::Note,
        AlertKind::Tip,
        AlertKind::Important,
        AlertKind::Warning,
        AlertKind::Caution,
    ];

    /// Parses the keyword between `[!` and `]`; matching is case sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// Marker keyword, also used as the displayed title.
    pub fn keyword(self) -> &'static str {
        match self {
            AlertKind::Note => "NOTE",
            AlertKind::Tip => "TIP",
            AlertKind::Important => "IMPORTANT",
            AlertKind::Warning => "WARNING",
            AlertKind::Caution => "CAUTION",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AlertKind::Note => "📝",
            AlertKind::Tip => "💡",
            AlertKind::Important => "❗",
            AlertKind::Warning => "⚠️",
            AlertKind::Caution => "🚨",
        }
    }

    /// Modifier class, e.g. `alert-warning`.
    pub fn css_class(self) -> String {
        format!("alert-{}", self.keyword().to_ascii_lowercase())
    }
}

/// Replaces marked blockquotes with alert blocks.
///
/// Blockquotes are visited in document order. A converted alert is not
/// descended into, so quotes nested inside it stay quotes; an unmatched
/// blockquote is descended into.
pub struct Alerts;

impl Pass for Alerts {
    fn name(&self) -> &'static str {
        "alerts"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>) {
        ctx.report.alerts += convert(&mut doc.children, ctx.options.scope);
    }
}

fn convert(nodes: &mut [Node], scope: MatchScope) -> usize {
    let mut count = 0;
    for node in nodes {
        let Node::Element(element) = node else {
            continue;
        };

        if element.is("blockquote") {
            if let Some(kind) = detect(element, scope) {
                let mut quote = std::mem::replace(element, Element::new("div"));
                if strip_marker(&mut quote, scope).is_some() {
                    *element = alert(kind, quote.children);
                    count += 1;
                    continue;
                }
                *element = quote;
            }
        }

        count += convert(&mut element.children, scope);
    }
    count
}

/// Checks whether a blockquote carries an alert marker.
fn detect(quote: &Element, scope: MatchScope) -> Option<AlertKind> {
    let text = match scope {
        MatchScope::Textual => quote.text_content(),
        MatchScope::Structural => match first_paragraph_text(quote) {
            Some(text) => text.to_string(),
            None => return None,
        },
    };
    let caps = MARKER.captures(text.trim_start())?;
    AlertKind::from_keyword(&caps[1])
}

/// First text run of the blockquote's first paragraph.
fn first_paragraph_text(quote: &Element) -> Option<&str> {
    let p = quote.children.first()?.as_element().filter(|p| p.is("p"))?;
    match p.children.first()? {
        Node::Text(text) => Some(text),
        _ => None,
    }
}

/// Outcome of searching a subtree for the marker text.
enum Strip {
    /// No text in the subtree; keep looking in later siblings.
    Continue,
    /// The first text did not start with a marker.
    Stop,
    Stripped,
}

/// Removes the marker and the whitespace following it.
///
/// Also drops a line break left directly after the marker and the first
/// paragraph if nothing remains in it.
fn strip_marker(quote: &mut Element, scope: MatchScope) -> Option<()> {
    let outcome = match scope {
        MatchScope::Textual => strip_first_text(&mut quote.children),
        MatchScope::Structural => match quote.children.first_mut() {
            Some(Node::Element(p)) if p.is("p") => strip_first_text(&mut p.children),
            _ => Strip::Stop,
        },
    };
    if !matches!(outcome, Strip::Stripped) {
        return None;
    }

    if let Some(index) = quote.children.iter().position(|node| node.is_element("p")) {
        if quote.children[index].as_element().is_some_and(is_blank) {
            quote.children.remove(index);
        }
    }
    Some(())
}

fn strip_first_text(nodes: &mut Vec<Node>) -> Strip {
    for index in 0..nodes.len() {
        let outcome = match &mut nodes[index] {
            Node::Text(text) if text.trim().is_empty() => Strip::Continue,
            Node::Text(text) => {
                let trimmed = text.trim_start();
                match MARKER.find(trimmed) {
                    Some(marker) => {
                        *text = trimmed[marker.end()..].to_string();
                        tidy_after_marker(nodes, index);
                        merge_text(nodes);
                        return Strip::Stripped;
                    }
                    None => Strip::Stop,
                }
            }
            Node::Raw(_) => Strip::Continue,
            Node::Element(element) => {
                let outcome = strip_first_text(&mut element.children);
                // `**[!TIP]**` leaves an empty wrapper behind.
                if matches!(outcome, Strip::Stripped) && is_blank(element) {
                    nodes.remove(index);
                    tidy_after_marker(nodes, index);
                    merge_text(nodes);
                }
                outcome
            }
        };
        if !matches!(outcome, Strip::Continue) {
            return outcome;
        }
    }
    Strip::Continue
}

/// Drops whitespace and a line break left where the marker was.
fn tidy_after_marker(nodes: &mut Vec<Node>, index: usize) {
    if let Some(Node::Text(text)) = nodes.get_mut(index) {
        *text = text.trim_start().to_string();
        if !text.is_empty() {
            return;
        }
        nodes.remove(index);
    }
    if nodes.get(index).is_some_and(|node| node.is_element("br")) {
        nodes.remove(index);
    }
}

/// Checks whether an element holds no visible content.
fn is_blank(element: &Element) -> bool {
    element.children.iter().all(|child| match child {
        Node::Text(text) => text.trim().is_empty(),
        _ => false,
    })
}

/// Builds the alert block with header and body.
fn alert(kind: AlertKind, content: Vec<Node>) -> Element {
    let header = Element::new("div").with_class("alert-header").with_children(vec![
        Element::new("span")
            .with_class("alert-icon")
            .with_text(kind.icon())
            .into(),
        Element::new("strong")
            .with_class("alert-title")
            .with_text(kind.keyword())
            .into(),
    ]);
    let body = Element::new("div")
        .with_class("alert-content")
        .with_children(content);

    Element::new("div")
        .with_class("alert")
        .with_class(&kind.css_class())
        .with_children(vec![header.into(), body.into()])
}

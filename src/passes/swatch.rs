//! Color swatches in front of inline code holding a color literal.

use regex::Regex;
use std::sync::LazyLock;

use super::Pass;
use crate::pipeline::RunContext;
use crate::tree::{Document, Element, Node};

/// Class of the swatch element.
pub const SWATCH_CLASS: &str = "color-preview";

static COLOR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#[0-9a-fA-F]{6}|#[0-9a-fA-F]{3}|rgb\([^)]+\)|hsl\([^)]+\))$")
        .expect("color literal regex")
});

/// Checks whether the whole text is a hex, `rgb()` or `hsl()` color.
pub fn is_color_literal(text: &str) -> bool {
    COLOR_LITERAL.is_match(text)
}

/// Builds the swatch element for a color.
pub fn swatch(color: &str) -> Element {
    Element::new("span")
        .with_class(SWATCH_CLASS)
        .with_attr("style", format!("background-color: {}", color))
}

/// Checks whether a node is a swatch element.
pub fn is_swatch(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| element.is("span") && element.has_class(SWATCH_CLASS))
}

/// Inserts a swatch before each inline color literal.
pub struct ColorSwatches;

impl Pass for ColorSwatches {
    fn name(&self) -> &'static str {
        "swatch"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>) {
        ctx.report.swatches += inject(&mut doc.children);
    }
}

fn inject(nodes: &mut Vec<Node>) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i < nodes.len() {
        let color = match &nodes[i] {
            Node::Element(element) if element.is("code") => {
                let text = element.text_content();
                let preceded = i > 0 && is_swatch(&nodes[i - 1]);
                (is_color_literal(&text) && !preceded).then_some(text)
            }
            _ => None,
        };

        if let Some(color) = color {
            nodes.insert(i, swatch(&color).into());
            count += 1;
            i += 2;
            continue;
        }

        // Code blocks hold no inline code.
        if let Node::Element(element) = &mut nodes[i] {
            if !element.is("pre") && !element.is("code") {
                count += inject(&mut element.children);
            }
        }
        i += 1;
    }

    count
}

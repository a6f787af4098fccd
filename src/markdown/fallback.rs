//! Minimal line-oriented renderer used when no primary renderer is set.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::Renderer;
use crate::tree::{Document, Element, Node, fold_inline_html, merge_text};

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*([\w+-]*)\s*$").expect("fence open regex"));

static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*$").expect("fence close regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*$").expect("heading regex"));

static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s?(.*)$").expect("quote regex"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("bullet regex"));

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*)$").expect("numbered regex"));

static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"!\[(?P<alt>[^\]]*)\]\((?P<src>[^)\s]+)\)",
        r"|\[(?P<label>[^\]]+)\]\((?P<href>[^)\s]+)\)",
        r"|`(?P<code>[^`]+)`",
        r"|\*\*\*(?P<strongem>.+?)\*\*\*",
        r"|\*\*(?P<strong>.+?)\*\*",
        r"|\*(?P<em>[^*]+?)\*",
        r"|~~(?P<del>.+?)~~",
        r"|(?P<tag></?[A-Za-z][^<>]*>)",
    ))
    .expect("inline regex")
});

/// Kind of list a run of list lines belongs to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn of(line: &str) -> Option<(Self, String)> {
        if let Some(caps) = BULLET.captures(line) {
            return Some((ListKind::Bullet, caps[1].to_string()));
        }
        NUMBERED
            .captures(line)
            .map(|caps| (ListKind::Numbered, caps[1].to_string()))
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Bullet => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Line-oriented renderer without recursive parsing.
///
/// Supports headings, emphasis, strikethrough, fenced and inline code, links,
/// images, blockquotes and flat bullet or numbered lists. Every construct is
/// recognized by one pattern on one line (or a run of similar lines); inline
/// patterns are applied once, left to right, and never nest.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackRenderer;

impl FallbackRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for FallbackRenderer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn render(&self, text: &str) -> Document {
        let lines: Vec<&str> = text.lines().collect();
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if let Some(caps) = FENCE_OPEN.captures(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                let language = match caps[1].is_empty() {
                    true => "plaintext",
                    false => &caps[1],
                };
                let mut code = String::new();
                i += 1;
                while i < lines.len() && !FENCE_CLOSE.is_match(lines[i]) {
                    code.push_str(lines[i]);
                    code.push('\n');
                    i += 1;
                }
                i += 1;
                blocks.push(code_block(language, code));
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                let level = caps[1].len();
                blocks.push(
                    Element::new(format!("h{}", level))
                        .with_children(inline(&caps[2]))
                        .into(),
                );
                i += 1;
                continue;
            }

            if QUOTE.is_match(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                let mut quoted = Vec::new();
                while let Some(&line) = lines.get(i) {
                    if let Some(caps) = QUOTE.captures(line) {
                        quoted.push(caps.get(1).map_or("", |m| m.as_str()));
                    } else if continues_paragraph(line, quoted.last().copied()) {
                        quoted.push(line);
                    } else {
                        break;
                    }
                    i += 1;
                }
                blocks.push(blockquote(&quoted));
                continue;
            }

            if let Some((kind, _)) = ListKind::of(line) {
                flush_paragraph(&mut paragraph, &mut blocks);
                let mut items = Vec::new();
                while let Some((next, content)) = lines.get(i).and_then(|l| ListKind::of(l)) {
                    if next != kind {
                        break;
                    }
                    items.push(Element::new("li").with_children(inline(&content)).into());
                    i += 1;
                }
                blocks.push(Element::new(kind.tag()).with_children(items).into());
                continue;
            }

            if line.trim().is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
            } else {
                paragraph.push(line);
            }
            i += 1;
        }

        flush_paragraph(&mut paragraph, &mut blocks);
        Document::new(blocks)
    }
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Node>) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join("\n");
    paragraph.clear();
    blocks.push(Element::new("p").with_children(inline(&text)).into());
}

fn code_block(language: &str, code: String) -> Node {
    let code = Element::new("code")
        .with_attr("class", format!("language-{}", language))
        .with_text(code);
    Element::new("pre").with_children(vec![code.into()]).into()
}

/// Checks whether an unquoted line is a lazy continuation of a quote.
///
/// Plain text directly after a non-blank quoted line stays in the quote's
/// paragraph; a blank line or the start of another block ends the quote.
fn continues_paragraph(line: &str, previous: Option<&str>) -> bool {
    previous.is_some_and(|previous| !previous.trim().is_empty())
        && !line.trim().is_empty()
        && !HEADING.is_match(line)
        && !FENCE_OPEN.is_match(line)
        && ListKind::of(line).is_none()
}

/// Builds one blockquote; blank quoted lines separate its paragraphs.
fn blockquote(lines: &[&str]) -> Node {
    let mut children = Vec::new();
    let mut paragraph = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut children);
        } else {
            paragraph.push(*line);
        }
    }
    flush_paragraph(&mut paragraph, &mut children);
    Element::new("blockquote").with_children(children).into()
}

/// Applies the inline patterns in a single left-to-right scan.
fn inline(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        nodes.push(Node::text(&text[last..whole.start()]));
        nodes.push(inline_node(&caps));
        last = whole.end();
    }
    nodes.push(Node::text(&text[last..]));

    merge_text(&mut nodes);
    let mut nodes = fold_inline_html(nodes);
    merge_text(&mut nodes);
    nodes
}

fn inline_node(caps: &Captures<'_>) -> Node {
    let group = |name: &str| caps.name(name).map(|m| m.as_str());

    if let (Some(alt), Some(src)) = (group("alt"), group("src")) {
        return Element::new("img")
            .with_attr("src", src)
            .with_attr("alt", alt)
            .into();
    }
    if let (Some(label), Some(href)) = (group("label"), group("href")) {
        return Element::new("a").with_attr("href", href).with_text(label).into();
    }
    if let Some(code) = group("code") {
        return Element::new("code").with_text(code).into();
    }
    if let Some(text) = group("strongem") {
        let em = Element::new("em").with_text(text);
        return Element::new("strong").with_children(vec![em.into()]).into();
    }
    if let Some(text) = group("strong") {
        return Element::new("strong").with_text(text).into();
    }
    if let Some(text) = group("em") {
        return Element::new("em").with_text(text).into();
    }
    if let Some(text) = group("del") {
        return Element::new("del").with_text(text).into();
    }
    Node::Raw(group("tag").unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> Document {
        FallbackRenderer::new().render(markdown)
    }

    #[test]
    fn test_headings_and_emphasis() {
        // Arrange
        let markdown = "## Title\n\nSome **bold**, *italic*, ***both*** and ~~gone~~.";

        // Act
        let html = render(markdown).to_html();

        // Assert
        assert!(html.contains("<h2>Title</h2>"), "Should render heading: {}", html);
        assert!(html.contains("<strong>bold</strong>"), "Should render bold: {}", html);
        assert!(html.contains("<em>italic</em>"), "Should render italic: {}", html);
        assert!(html.contains("<strong><em>both</em></strong>"), "Should nest: {}", html);
        assert!(html.contains("<del>gone</del>"), "Should render del: {}", html);
    }

    #[test]
    fn test_fenced_code_is_literal() {
        // Arrange
        let markdown = "```rust\nlet x = **y**;\n```\nafter";

        // Act
        let doc = render(markdown);

        // Assert
        let code = doc.elements("code");
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].attr("class"), Some("language-rust"));
        assert_eq!(code[0].text_content(), "let x = **y**;\n");
        assert!(doc.elements("strong").is_empty(), "Code content must stay literal");
        assert_eq!(doc.elements("p")[0].text_content(), "after");
    }

    #[test]
    fn test_fenced_code_defaults_to_plaintext() {
        // Arrange & Act
        let doc = render("```\n<b>x</b>\n```");

        // Assert
        let code = doc.elements("code");
        assert_eq!(code[0].attr("class"), Some("language-plaintext"));
        assert!(doc.to_html().contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_consecutive_quote_lines_form_one_blockquote() {
        // Arrange
        let markdown = "> [!WARNING]\n> Be careful\n\nafter";

        // Act
        let doc = render(markdown);

        // Assert
        let quotes = doc.elements("blockquote");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text_content(), "[!WARNING]\nBe careful");
    }

    #[test]
    fn test_lazy_line_continues_quote_paragraph() {
        // Arrange
        let markdown = "> [!WARNING]\n> Be careful\nRef[^1]\n\n[^1]: Footnote text\n";

        // Act
        let doc = render(markdown);

        // Assert
        let quotes = doc.elements("blockquote");
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].text_content(), "[!WARNING]\nBe careful\nRef[^1]");
        assert_eq!(doc.elements("p").len(), 2);
    }

    #[test]
    fn test_block_start_ends_quote() {
        // Arrange
        let markdown = "> quoted\n# Heading\n> again\n\nplain";

        // Act
        let doc = render(markdown);

        // Assert
        assert_eq!(doc.elements("blockquote").len(), 2);
        assert_eq!(doc.elements("h1")[0].text_content(), "Heading");
        assert_eq!(doc.elements("blockquote")[1].text_content(), "again");
    }

    #[test]
    fn test_blank_quote_line_splits_paragraphs() {
        // Arrange & Act
        let doc = render("> one\n>\n> two");

        // Assert
        let quote = doc.elements("blockquote")[0];
        assert_eq!(quote.children.len(), 2);
    }

    #[test]
    fn test_list_runs() {
        // Arrange
        let markdown = "- [ ] item\n- [x] done\n1. first\n2. second";

        // Act
        let doc = render(markdown);

        // Assert
        assert_eq!(doc.elements("ul").len(), 1);
        assert_eq!(doc.elements("ol").len(), 1);
        let items = doc.elements("li");
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].text_content(), "[ ] item");
    }

    #[test]
    fn test_links_images_and_inline_code() {
        // Arrange
        let markdown = "A [link](https://example.com) and ![logo](logo.png) with `code`";

        // Act
        let doc = render(markdown);

        // Assert
        assert_eq!(doc.elements("a")[0].attr("href"), Some("https://example.com"));
        assert_eq!(doc.elements("img")[0].attr("alt"), Some("logo"));
        assert_eq!(doc.elements("code")[0].text_content(), "code");
    }

    #[test]
    fn test_raw_tags_are_folded() {
        // Arrange
        let markdown = "Hi <strong>@octocat</strong>, see <a href=\"#issue-3\">#3</a>";

        // Act
        let doc = render(markdown);

        // Assert
        assert_eq!(doc.elements("strong")[0].text_content(), "@octocat");
        assert_eq!(doc.elements("a")[0].attr("href"), Some("#issue-3"));
    }

    #[test]
    fn test_footnote_lines_stay_in_paragraph_text() {
        // Arrange
        let markdown = "Text[^1]\n\n[^1]: Footnote text";

        // Act
        let doc = render(markdown);

        // Assert
        let paragraphs = doc.elements("p");
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].text_content(), "[^1]: Footnote text");
    }

    #[test]
    fn test_empty_input() {
        // Arrange & Act
        let doc = render("");

        // Assert
        assert!(doc.children.is_empty());
    }
}

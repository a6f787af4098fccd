//! Source text rewriting applied before markdown rendering.
//!
//! Three token kinds are rewritten in one left-to-right scan: backticked
//! color literals gain a swatch marker, `@name` mentions become strong text
//! and `#123` issue numbers become links to a local anchor. The output is
//! still markdown with a little inline HTML, which both renderers fold back
//! into typed elements.

use maud::Render;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::markdown::lines::FenceTracker;
use crate::passes::swatch;
use crate::pipeline::MatchScope;

static TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"`(?P<color>#[0-9a-fA-F]{6}|#[0-9a-fA-F]{3}|rgb\([^)]+\)|hsl\([^)]+\))`",
        r"|@(?P<mention>[a-zA-Z0-9_-]+)",
        r"|#(?P<issue>\d+)",
    ))
    .expect("pre-render token regex")
});

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`\n]+`").expect("code span regex"));

/// Rewrites mentions, issue references and color literals.
///
/// # Arguments
///
/// * `source`: Raw markdown from the editing buffer
/// * `scope`: Whether tokens inside code are rewritten as well
///
/// # Returns
///
/// Markdown with the tokens replaced by inline HTML
pub fn transform(source: &str, scope: MatchScope) -> String {
    let protected = match scope {
        MatchScope::Textual => Vec::new(),
        MatchScope::Structural => code_ranges(source),
    };

    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for caps in TOKENS.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        let range = whole.range();

        if protected.iter().any(|code| strictly_inside(&range, code)) {
            continue;
        }

        let replacement = if let Some(color) = caps.name("color") {
            color_token(color.as_str())
        } else if let Some(name) = caps.name("mention") {
            format!("<strong>@{}</strong>", name.as_str())
        } else if let Some(number) = caps.name("issue") {
            // `&#123;` is a character reference, not an issue.
            if source[..range.start].ends_with('&') {
                continue;
            }
            let number = number.as_str();
            format!("<a href=\"#issue-{}\">#{}</a>", number, number)
        } else {
            continue;
        };

        out.push_str(&source[last..range.start]);
        out.push_str(&replacement);
        last = range.end;
    }

    out.push_str(&source[last..]);
    out
}

fn color_token(color: &str) -> String {
    format!("{}`{}`", swatch::swatch(color).render().into_string(), color)
}

/// Checks whether `token` lies within `code` without being the whole span.
fn strictly_inside(token: &Range<usize>, code: &Range<usize>) -> bool {
    code.start <= token.start && token.end <= code.end && token != code
}

/// Byte ranges of fenced code blocks and inline code spans.
fn code_ranges(source: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut fences = FenceTracker::new();
    let mut offset = 0;
    let mut outside = Vec::new();

    for line in source.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        if !fences.is_code(line) {
            outside.push(start..offset);
            continue;
        }

        match ranges.last_mut() {
            Some(block) if block.end == start => block.end = offset,
            _ => ranges.push(start..offset),
        }
    }

    for line in outside {
        for span in CODE_SPAN.find_iter(&source[line.clone()]) {
            ranges.push(line.start + span.start()..line.start + span.end());
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_become_strong() {
        // Arrange & Act
        let out = transform("Thanks @octo-cat_1!", MatchScope::Textual);

        // Assert
        assert_eq!(out, "Thanks <strong>@octo-cat_1</strong>!");
    }

    #[test]
    fn test_issue_references_become_links() {
        // Arrange & Act
        let out = transform("Fixes #42.", MatchScope::Textual);

        // Assert
        assert_eq!(out, "Fixes <a href=\"#issue-42\">#42</a>.");
    }

    #[test]
    fn test_color_literal_gains_marker() {
        // Arrange & Act
        let out = transform("Use `#ff0000` here", MatchScope::Textual);

        // Assert
        assert_eq!(
            out,
            "Use <span class=\"color-preview\" style=\"background-color: #ff0000\"></span>`#ff0000` here"
        );
    }

    #[test]
    fn test_color_marker_is_not_rescanned() {
        // Arrange & Act
        let out = transform("`#123`", MatchScope::Textual);

        // Assert
        assert!(!out.contains("issue"), "Generated style must not become a link: {}", out);
    }

    #[test]
    fn test_rgb_and_hsl_literals() {
        // Arrange & Act
        let out = transform("`rgb(1,2,3)` and `hsl(1,2%,3%)`", MatchScope::Textual);

        // Assert
        assert!(out.contains("background-color: rgb(1,2,3)"), "{}", out);
        assert!(out.contains("background-color: hsl(1,2%,3%)"), "{}", out);
    }

    #[test]
    fn test_non_color_code_untouched() {
        // Arrange
        let source = "`#12345` and `red`";

        // Act
        let out = transform(source, MatchScope::Textual);

        // Assert
        assert!(!out.contains("color-preview"), "{}", out);
    }

    #[test]
    fn test_character_reference_is_not_an_issue() {
        // Arrange & Act
        let out = transform("brace &#123; here", MatchScope::Textual);

        // Assert
        assert_eq!(out, "brace &#123; here");
    }

    #[test]
    fn test_textual_scope_rewrites_inside_code() {
        // Arrange
        let source = "```\nping @admin\n```\n";

        // Act
        let out = transform(source, MatchScope::Textual);

        // Assert
        assert!(out.contains("<strong>@admin</strong>"), "{}", out);
    }

    #[test]
    fn test_structural_scope_skips_code() {
        // Arrange
        let source = "```\nping @admin #7\n```\nsee `@me` and @you\n";

        // Act
        let out = transform(source, MatchScope::Structural);

        // Assert
        assert_eq!(
            out,
            "```\nping @admin #7\n```\nsee `@me` and <strong>@you</strong>\n"
        );
    }

    #[test]
    fn test_structural_scope_tracks_long_fences() {
        // Arrange
        let source = "````\n```\n@inside\n````\nafter @outside\n";

        // Act
        let out = transform(source, MatchScope::Structural);

        // Assert
        assert_eq!(
            out,
            "````\n```\n@inside\n````\nafter <strong>@outside</strong>\n"
        );
    }

    #[test]
    fn test_structural_scope_keeps_color_spans() {
        // Arrange & Act
        let out = transform("`#abc`", MatchScope::Structural);

        // Assert
        assert!(out.contains("color-preview"), "{}", out);
    }

    #[test]
    fn test_no_tokens_is_identity() {
        // Arrange
        let source = "# Heading\n\nPlain text.";

        // Act & Assert
        assert_eq!(transform(source, MatchScope::Textual), source);
    }
}

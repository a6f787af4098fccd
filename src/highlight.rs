//! Syntax highlighting of fenced code blocks with syntect.

use anyhow::{Context, Result};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::{trace, warn};

use crate::tree::{Element, Node};

/// Class prefix shared by the generated spans and the theme stylesheet.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Annotates one code block node in place.
pub trait Highlighter {
    /// Highlights the given `code` element.
    ///
    /// Returns `true` when the element content was replaced. Unknown
    /// languages and failures leave the element untouched.
    fn highlight(&self, code: &mut Element) -> bool;
}

/// Highlighter producing syntect classed HTML.
///
/// The language is taken from the `language-*` class the renderers put on
/// code elements. Output spans use the `hljs-` prefix so that the stylesheet
/// from [`theme_css`] applies to them.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    /// Creates highlighter with the bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlights code with syntect using CSS classes.
    ///
    /// # Arguments
    ///
    /// * `code`: Source code to highlight
    /// * `language`: Language identifier (rust, python, etc)
    ///
    /// # Returns
    ///
    /// `None` for unknown languages, otherwise HTML with
    /// `<span class="hljs-*">` tags
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting fails
    fn highlight_code(&self, code: &str, language: &str) -> Result<Option<String>> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language));

        let Some(syntax) = syntax else {
            return Ok(None);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(Some(generator.finalize()))
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &mut Element) -> bool {
        let Some(language) = language_of(code) else {
            return false;
        };

        // Already highlighted or carrying markup we must not flatten.
        if !code.children.iter().all(|child| matches!(child, Node::Text(_))) {
            return false;
        }

        let source = code.text_content();
        if source.is_empty() {
            return false;
        }

        match self.highlight_code(&source, &language) {
            Ok(Some(html)) => {
                trace!(language = %language, "Highlighted code block");
                code.children = vec![Node::Raw(html)];
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(language = %language, error = %e, "Syntax highlighting failed");
                false
            }
        }
    }
}

/// Extracts the fenced language from a `language-*` class.
fn language_of(code: &Element) -> Option<String> {
    code.attr("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

/// Runs the highlighter on every `pre > code` block below `nodes`.
///
/// Returns the number of blocks that were highlighted.
pub fn highlight_blocks(nodes: &mut [Node], highlighter: &dyn Highlighter) -> usize {
    let mut count = 0;
    for node in nodes {
        let Some(element) = node.as_element_mut() else {
            continue;
        };
        if element.is("pre") {
            for child in &mut element.children {
                if let Some(code) = child.as_element_mut().filter(|c| c.is("code")) {
                    count += usize::from(highlighter.highlight(code));
                }
            }
        } else {
            count += highlight_blocks(&mut element.children, highlighter);
        }
    }
    count
}

/// Names of the bundled themes usable with [`theme_css`].
pub fn theme_names() -> Vec<String> {
    ThemeSet::load_defaults().themes.into_keys().collect()
}

/// Generates the stylesheet for a bundled syntect theme.
///
/// # Errors
///
/// Returns error if the theme does not exist or CSS generation fails
pub fn theme_css(name: &str) -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes.themes.get(name).with_context(|| {
        format!(
            "Unknown theme: {} (available: {})",
            name,
            theme_names().join(", ")
        )
    })?;

    css_for_theme_with_class_style(theme, CLASS_STYLE)
        .with_context(|| format!("Failed to generate CSS for theme: {}", name))
}

//! CSS asset bundling

const BASE: &str = include_str!("../assets/base.css");
const MARKDOWN: &str = include_str!("../assets/markdown.css");
const EXTENSIONS: &str = include_str!("../assets/extensions.css");

/// Bundles the preview stylesheet with an optional highlighting theme.
///
/// # Arguments
///
/// * `theme_css`: Stylesheet generated for the syntax highlighting theme
///
/// # Returns
///
/// Single stylesheet embedded into the preview page
pub fn stylesheet(theme_css: Option<&str>) -> String {
    let mut parts = vec![BASE, MARKDOWN, EXTENSIONS];
    if let Some(theme_css) = theme_css {
        parts.push(theme_css);
    }
    parts.join("\n")
}

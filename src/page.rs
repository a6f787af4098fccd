//! Full HTML page around a rendered preview.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::pipeline::Preview;
use crate::stats::DocumentStats;

/// Wraps a preview in a standalone HTML document.
///
/// The stylesheet is embedded so the page can be opened straight from disk.
/// The preview tree renders itself through [`maud::Render`].
///
/// # Arguments
///
/// * `title`: Page title text (without suffix)
/// * `stylesheet`: Bundled CSS embedded in a `<style>` element
/// * `preview`: Result of a pipeline run
///
/// # Returns
///
/// Complete HTML document
pub fn page(title: &str, stylesheet: &str, preview: &Preview) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Preview" }
                style { (PreEscaped(stylesheet)) }
            }
            body {
                div class="container" {
                    article class="markdown-body" {
                        (preview.document)
                    }
                }
                (footer(&preview.stats))
            }
        }
    }
}

/// Footer with source statistics.
fn footer(stats: &DocumentStats) -> Markup {
    html! {
        footer class="preview-footer" {
            span class="stat-words" { (stats.words) " words" }
            span class="stat-characters" { (stats.characters) " characters" }
            span class="stat-lines" { (stats.lines) " lines" }
        }
    }
}

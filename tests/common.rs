//! Shared test utilities for integration tests.
//!
//! Provides pipelines for both renderers, a display that records what it
//! receives, and sample documents used across multiple test files.

#![allow(dead_code)]

use anyhow::Result;
use gfm_preview::{
    ComrakRenderer, Display, Element, Pipeline, PipelineOptions, Preview, SyntectHighlighter,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The alert, footnote and warning scenario from the README.
pub const WARNING_SCENARIO: &str = "> [!WARNING]\n> Be careful\n\nText[^1]\n\n[^1]: Footnote text\n";

/// The same scenario with the reference on a lazy continuation line.
///
/// Without a blank line `Ref[^1]` continues the quoted paragraph, so the
/// reference ends up inside the alert body.
pub const LAZY_WARNING_SCENARIO: &str =
    "> [!WARNING]\n> Be careful\nRef[^1]\n\n[^1]: Footnote text\n";

/// Creates pipeline with comrak and no highlighter.
///
/// Highlighting is left out so assertions can inspect code text directly.
pub fn comrak_pipeline() -> Pipeline {
    Pipeline::new(
        Some(Box::new(ComrakRenderer::new())),
        None,
        PipelineOptions::default(),
    )
}

/// Creates pipeline with comrak and syntect highlighting.
pub fn github_pipeline() -> Pipeline {
    Pipeline::new(
        Some(Box::new(ComrakRenderer::new())),
        Some(Box::new(SyntectHighlighter::new())),
        PipelineOptions::default(),
    )
}

/// Creates pipeline without a renderer, so the fallback renderer is used.
pub fn fallback_pipeline() -> Pipeline {
    Pipeline::new(None, None, PipelineOptions::default())
}

/// Both renderer configurations, labeled for assertion messages.
pub fn all_pipelines() -> Vec<(&'static str, Pipeline)> {
    vec![("comrak", comrak_pipeline()), ("fallback", fallback_pipeline())]
}

/// Finds the first element with `tag` carrying `class`.
///
/// # Returns
///
/// The element, or `None` when no element matches
pub fn find_with_class<'a>(preview: &'a Preview, tag: &str, class: &str) -> Option<&'a Element> {
    preview
        .document
        .elements(tag)
        .into_iter()
        .find(|element| element.has_class(class))
}

/// Display recording every published fragment.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub published: Vec<String>,
}

impl Display for RecordingDisplay {
    fn present(&mut self, preview: &Preview) -> Result<()> {
        self.published.push(preview.to_html());
        Ok(())
    }
}

/// Display that always fails to publish.
#[derive(Debug, Default)]
pub struct FailingDisplay;

impl Display for FailingDisplay {
    fn present(&mut self, _preview: &Preview) -> Result<()> {
        anyhow::bail!("display unavailable")
    }
}

/// Writes a markdown file into a fresh temporary directory.
///
/// # Arguments
///
/// * `name`: File name inside the directory
/// * `content`: Markdown text
///
/// # Returns
///
/// The directory guard and the full file path
///
/// # Errors
///
/// Returns error if the directory or file cannot be created
pub fn write_source(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}

/// Reads a generated page.
///
/// # Errors
///
/// Returns error if the file cannot be read
pub fn read_page(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

//! Editing session: source buffer, pipeline and display wired together.

use anyhow::Result;
use std::ops::Range;
use tracing::debug;

use crate::display::Display;
use crate::pipeline::{Pipeline, Preview};

/// Source text with a selection.
///
/// The selection is a byte range that always lies on char boundaries; an
/// empty selection is a caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
    selection: Range<usize>,
}

impl SourceBuffer {
    /// Creates buffer with the caret at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn selected_text(&self) -> &str {
        &self.text[self.selection.clone()]
    }

    /// Replaces the whole text, keeping the selection where it still fits.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.select(self.selection.start, self.selection.end);
    }

    /// Selects `start..end`, clamped to the text and to char boundaries.
    pub fn select(&mut self, start: usize, end: usize) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.selection = self.clamp(start)..self.clamp(end);
    }

    /// Replaces the selection with `insert`, leaving the caret after it.
    pub fn insert_at_cursor(&mut self, insert: &str) {
        let start = self.selection.start;
        self.text.replace_range(self.selection.clone(), insert);
        let caret = start + insert.len();
        self.selection = caret..caret;
    }

    /// Surrounds the selection with `before` and `after`.
    ///
    /// The selection keeps covering the wrapped text.
    pub fn wrap_selection(&mut self, before: &str, after: &str) {
        let Range { start, end } = self.selection.clone();
        self.text.insert_str(end, after);
        self.text.insert_str(start, before);
        self.selection = start + before.len()..end + before.len();
    }

    /// Inserts `prefix` at the start of the line holding the caret.
    pub fn insert_line_prefix(&mut self, prefix: &str) {
        let line_start = self.text[..self.selection.start]
            .rfind('\n')
            .map_or(0, |newline| newline + 1);
        self.text.insert_str(line_start, prefix);
        self.selection = self.selection.start + prefix.len()..self.selection.end + prefix.len();
    }

    fn clamp(&self, mut index: usize) -> usize {
        index = index.min(self.text.len());
        while !self.text.is_char_boundary(index) {
            index -= 1;
        }
        index
    }
}

/// Keeps a display in sync with a source buffer.
///
/// Every change goes through [`Session::edit`], which runs the pipeline once
/// on the new text and publishes the result.
pub struct Session<D: Display> {
    buffer: SourceBuffer,
    pipeline: Pipeline,
    display: D,
    last: Option<Preview>,
    runs: usize,
}

impl<D: Display> Session<D> {
    pub fn new(pipeline: Pipeline, display: D) -> Self {
        Self {
            buffer: SourceBuffer::default(),
            pipeline,
            display,
            last: None,
            runs: 0,
        }
    }

    pub fn buffer(&self) -> &SourceBuffer {
        &self.buffer
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Most recently published preview.
    pub fn last_preview(&self) -> Option<&Preview> {
        self.last.as_ref()
    }

    /// Number of pipeline runs so far.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Applies a change to the buffer, then runs and publishes once.
    ///
    /// # Errors
    ///
    /// Returns error if the display fails to publish the preview
    pub fn edit<F>(&mut self, change: F) -> Result<&Preview>
    where
        F: FnOnce(&mut SourceBuffer),
    {
        change(&mut self.buffer);
        self.refresh()
    }

    /// Replaces the whole text.
    ///
    /// # Errors
    ///
    /// Returns error if the display fails to publish the preview
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<&Preview> {
        let text = text.into();
        self.edit(move |buffer| buffer.set_text(text))
    }

    /// Runs the pipeline on the current text and publishes the result.
    ///
    /// # Errors
    ///
    /// Returns error if the display fails to publish the preview
    pub fn refresh(&mut self) -> Result<&Preview> {
        let preview = self.pipeline.run(self.buffer.text());
        self.runs += 1;
        debug!(run = self.runs, words = preview.stats.words, "Publishing preview");

        self.display.present(&preview)?;
        Ok(&*self.last.insert(preview))
    }
}

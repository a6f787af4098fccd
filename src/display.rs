//! Display surfaces receiving finished previews.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::assets;
use crate::highlight;
use crate::page;
use crate::pipeline::Preview;

/// Receives each finished preview and replaces what it showed before.
pub trait Display {
    /// Publishes a preview.
    ///
    /// # Errors
    ///
    /// Returns error if the preview cannot be written out
    fn present(&mut self, preview: &Preview) -> Result<()>;
}

/// Writes every preview as a standalone HTML page.
///
/// The page is first written next to the target and then renamed over it,
/// so a browser reloading the file never sees a partial page.
#[derive(Debug, Clone)]
pub struct HtmlFile {
    path: PathBuf,
    title: String,
    stylesheet: String,
}

impl HtmlFile {
    /// Creates file display with the stylesheet for `theme`.
    ///
    /// # Arguments
    ///
    /// * `path`: Output page path
    /// * `title`: Page title
    /// * `theme`: Syntax highlighting theme, or `None` for no theme CSS
    ///
    /// # Errors
    ///
    /// Returns error if the theme does not exist
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>, theme: Option<&str>) -> Result<Self> {
        let theme_css = theme.map(highlight::theme_css).transpose()?;
        Ok(Self {
            path: path.into(),
            title: title.into(),
            stylesheet: assets::stylesheet(theme_css.as_deref()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "preview.html".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

impl Display for HtmlFile {
    fn present(&mut self, preview: &Preview) -> Result<()> {
        let html = page::page(&self.title, &self.stylesheet, preview).into_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }

        let staging = self.staging_path();
        fs::write(&staging, html)
            .with_context(|| format!("Failed to write preview to {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace preview at {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Wrote preview page");
        Ok(())
    }
}

/// Prints the preview fragment to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Display for Stdout {
    fn present(&mut self, preview: &Preview) -> Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(preview.to_html().as_bytes())
            .and_then(|()| out.flush())
            .context("Failed to write preview to stdout")
    }
}

//! Command line configuration.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::highlight::{self, DEFAULT_THEME, SyntectHighlighter};
use crate::markdown::ComrakRenderer;
use crate::pipeline::{MatchScope, Pipeline, PipelineOptions};

/// Path meaning standard input or standard output.
const STDIO: &str = "-";

/// Command line configuration for gfm-preview.
#[derive(Debug, Clone, Parser)]
#[command(name = "gfm-preview", version, about, long_about = None)]
pub struct Config {
    /// Markdown source file, `-` for standard input
    #[arg(default_value = "README.md")]
    pub input: PathBuf,

    /// Output HTML page, `-` to print the fragment to standard output
    #[arg(short, long, default_value = "preview.html")]
    pub output: PathBuf,

    /// Page title (defaults to the input file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Syntax highlighting theme (InspiredGitHub, base16-ocean.dark, etc.)
    #[arg(long, default_value = DEFAULT_THEME)]
    pub theme: String,

    /// Re-render whenever the input file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Open the generated page in the default browser
    #[arg(long)]
    pub open: bool,

    /// Use the minimal line-oriented renderer instead of comrak
    #[arg(long)]
    pub plain: bool,

    /// Leave code blocks unhighlighted
    #[arg(long)]
    pub no_highlight: bool,

    /// Skip code when matching mentions, tasks and alerts
    #[arg(long)]
    pub structural: bool,

    /// Log pipeline details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The input file does not exist
    /// - Watching is requested for standard input
    /// - Opening is requested for standard output
    /// - The highlighting theme does not exist
    pub fn validate(&self) -> Result<()> {
        if !self.reads_stdin() && !self.input.exists() {
            bail!("Input file does not exist: {}", self.input.display());
        }

        if self.watch && self.reads_stdin() {
            bail!("Cannot watch standard input");
        }

        if self.open && self.writes_stdout() {
            bail!("Cannot open a preview written to standard output");
        }

        if !self.no_highlight && !highlight::theme_names().contains(&self.theme) {
            bail!("Unknown theme: {}", self.theme);
        }

        Ok(())
    }

    pub fn reads_stdin(&self) -> bool {
        self.input == Path::new(STDIO)
    }

    pub fn writes_stdout(&self) -> bool {
        self.output == Path::new(STDIO)
    }

    /// Reads the markdown source.
    ///
    /// # Errors
    ///
    /// Returns error if the input cannot be read or is not UTF8.
    pub fn read_input(&self) -> Result<String> {
        if self.reads_stdin() {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            return Ok(text);
        }

        fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read input: {}", self.input.display()))
    }

    /// Returns page title from configuration or input file name.
    pub fn page_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }

        self.input
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|_| !self.reads_stdin())
            .map_or_else(|| "Preview".to_string(), String::from)
    }

    /// Theme to embed, if highlighting is enabled.
    pub fn theme(&self) -> Option<&str> {
        (!self.no_highlight).then_some(self.theme.as_str())
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let scope = match self.structural {
            true => MatchScope::Structural,
            false => MatchScope::Textual,
        };
        PipelineOptions { scope }
    }

    /// Builds the pipeline the flags describe.
    pub fn pipeline(&self) -> Pipeline {
        let renderer = (!self.plain).then(|| {
            Box::new(ComrakRenderer::new()) as Box<dyn crate::markdown::Renderer>
        });
        let highlighter = (!self.no_highlight).then(|| {
            Box::new(SyntectHighlighter::new()) as Box<dyn highlight::Highlighter>
        });
        Pipeline::new(renderer, highlighter, self.pipeline_options())
    }
}

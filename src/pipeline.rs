//! Preview pipeline: pre-render transform, render, highlight, passes.

use tracing::{debug, trace};

use crate::highlight::{Highlighter, SyntectHighlighter, highlight_blocks};
use crate::markdown::{ComrakRenderer, FallbackRenderer, Renderer};
use crate::passes;
use crate::prerender;
use crate::stats::DocumentStats;
use crate::tree::Document;

/// How loosely mention, task and alert tokens are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchScope {
    /// Match tokens anywhere in the text, code included.
    #[default]
    Textual,
    /// Skip code and require task and alert markers to lead their block.
    Structural,
}

/// Options shared by every run of a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub scope: MatchScope,
}

/// Counts of what one run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Name of the renderer that produced the tree.
    pub renderer: &'static str,
    pub highlighted: usize,
    pub swatches: usize,
    pub tasks: usize,
    pub alerts: usize,
    pub footnotes: usize,
}

/// State handed to each pass during one run.
pub struct RunContext<'a> {
    pub options: &'a PipelineOptions,
    pub report: &'a mut RunReport,
}

impl<'a> RunContext<'a> {
    pub fn new(options: &'a PipelineOptions, report: &'a mut RunReport) -> Self {
        Self { options, report }
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub document: Document,
    pub report: RunReport,
    pub stats: DocumentStats,
}

impl Preview {
    /// Serializes the tree to an HTML fragment.
    pub fn to_html(&self) -> String {
        self.document.to_html()
    }
}

/// Turns markdown source into a preview tree.
///
/// Collaborators are resolved once at construction: a missing renderer is
/// replaced by [`FallbackRenderer`], a missing highlighter leaves code blocks
/// as plain text.
pub struct Pipeline {
    renderer: Box<dyn Renderer>,
    highlighter: Option<Box<dyn Highlighter>>,
    options: PipelineOptions,
}

impl Pipeline {
    /// Creates pipeline from optional collaborators.
    ///
    /// # Arguments
    ///
    /// * `renderer`: Markdown renderer, or `None` for the fallback renderer
    /// * `highlighter`: Code block highlighter, or `None` to skip highlighting
    /// * `options`: Matching options applied to every run
    pub fn new(
        renderer: Option<Box<dyn Renderer>>,
        highlighter: Option<Box<dyn Highlighter>>,
        options: PipelineOptions,
    ) -> Self {
        let renderer = renderer.unwrap_or_else(|| {
            debug!("No renderer configured, using fallback renderer");
            Box::new(FallbackRenderer::new())
        });
        Self {
            renderer,
            highlighter,
            options,
        }
    }

    /// Pipeline with comrak rendering and syntect highlighting.
    pub fn github(options: PipelineOptions) -> Self {
        Self::new(
            Some(Box::new(ComrakRenderer::new())),
            Some(Box::new(SyntectHighlighter::new())),
            options,
        )
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs the full pipeline on `source`.
    ///
    /// Every run starts from scratch: nothing is cached between runs, so two
    /// runs over the same text produce identical trees.
    pub fn run(&self, source: &str) -> Preview {
        let transformed = prerender::transform(source, self.options.scope);
        let mut document = self.renderer.render(&transformed);

        let mut report = RunReport {
            renderer: self.renderer.name(),
            ..RunReport::default()
        };

        if let Some(highlighter) = &self.highlighter {
            report.highlighted = highlight_blocks(&mut document.children, highlighter.as_ref());
        }

        {
            let mut ctx = RunContext::new(&self.options, &mut report);
            for pass in passes::ordered() {
                pass.apply(&mut document, &mut ctx);
                trace!(pass = pass.name(), "Applied pass");
            }
        }

        debug!(
            renderer = report.renderer,
            highlighted = report.highlighted,
            swatches = report.swatches,
            tasks = report.tasks,
            alerts = report.alerts,
            footnotes = report.footnotes,
            "Rendered preview"
        );

        Preview {
            document,
            report,
            stats: DocumentStats::from_source(source),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::github(PipelineOptions::default())
    }
}

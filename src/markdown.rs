//! Markdown rendering into the presentation tree.
//!
//! The generic renderer is a collaborator behind the [`Renderer`] trait. The
//! primary implementation wraps comrak with the GFM extensions the passes do
//! not provide themselves; [`FallbackRenderer`] is the line-oriented renderer
//! used when no primary renderer is configured.

mod fallback;
pub(crate) mod lines;
mod renderer;

pub use fallback::FallbackRenderer;
pub use renderer::ComrakRenderer;

use crate::tree::Document;

/// Converts CommonMark-ish text into a presentation tree.
///
/// Implementations must accept any input and never fail: malformed markup
/// degrades to literal text.
pub trait Renderer {
    /// Short identifier used in run reports and logs.
    fn name(&self) -> &'static str;

    /// Renders markdown text into a document tree.
    fn render(&self, text: &str) -> Document;
}

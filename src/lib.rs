//! Live GitHub Flavored Markdown preview.
//!
//! A run takes markdown source through four stages: a text rewrite for
//! mentions, issue references and color literals; rendering into a
//! presentation tree; syntax highlighting of code blocks; and the tree passes
//! for color swatches, task lists, alerts and footnotes.

mod assets;
mod config;
mod display;
pub mod highlight;
pub mod markdown;
mod page;
pub mod passes;
pub mod pipeline;
pub mod prerender;
mod session;
mod stats;
pub mod tree;
pub mod watch;

pub use config::Config;
pub use display::{Display, HtmlFile, Stdout};
pub use highlight::{Highlighter, SyntectHighlighter};
pub use markdown::{ComrakRenderer, FallbackRenderer, Renderer};
pub use page::page;
pub use pipeline::{MatchScope, Pipeline, PipelineOptions, Preview, RunReport};
pub use session::{Session, SourceBuffer};
pub use stats::DocumentStats;
pub use tree::{Document, Element, Node};

//! Tree passes applied after rendering.
//!
//! Each pass is total: it never fails and a pass that finds nothing leaves the
//! tree untouched. The order is fixed by [`ordered`].

pub mod alerts;
pub mod footnotes;
pub mod swatch;
pub mod tasks;

pub use alerts::{AlertKind, Alerts};
pub use footnotes::Footnotes;
pub use swatch::ColorSwatches;
pub use tasks::TaskLists;

use crate::pipeline::RunContext;
use crate::tree::Document;

/// Rewrites the rendered tree in place.
pub trait Pass {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Applies the pass, recording what it changed in `ctx.report`.
    fn apply(&self, doc: &mut Document, ctx: &mut RunContext<'_>);
}

/// The passes in the order every run applies them.
///
/// Swatches come first so that later passes see the final inline code
/// layout; footnotes come last so the section lands after any alert.
pub fn ordered() -> [&'static dyn Pass; 4] {
    [&ColorSwatches, &TaskLists, &Alerts, &Footnotes]
}

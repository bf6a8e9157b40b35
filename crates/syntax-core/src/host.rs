//! Traits implemented by the host editor environment.
//!
//! The syntax layer never draws, schedules, or resolves styles itself; it calls back into the
//! host through these seams. All of them are infallible by contract: a highlighting engine must
//! never block editing or crash the host on partial data, so "unknown" answers degrade to
//! no-ops ([`UNSTYLED`](crate::span::UNSTYLED), empty redraws) rather than errors.

use crate::span::{HighlightSpan, StyleId};
use std::ops::Range;

/// Identifies one host buffer.
///
/// Used to key per-buffer coordinating state (e.g. the active highlighter table) without holding
/// a reference into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// Resolves style names to numeric style ids.
pub trait StyleResolver {
    /// Return the id for `name`, or [`UNSTYLED`](crate::span::UNSTYLED) if the name is unknown.
    ///
    /// Must not fail; unknown names simply suppress highlighting.
    fn resolve_style(&self, name: &str) -> StyleId;
}

/// Schedules rows for re-highlighting.
pub trait RedrawScheduler {
    /// Request that the half-open row range be redrawn (and its highlight lines re-requested)
    /// on an upcoming pass.
    fn request_redraw(&self, rows: Range<usize>);
}

/// Receives highlight spans for the current redraw pass.
pub trait SpanSink {
    /// Accept one ephemeral span. Later emissions paint over earlier ones.
    fn emit(&mut self, span: HighlightSpan);
}

impl SpanSink for Vec<HighlightSpan> {
    fn emit(&mut self, span: HighlightSpan) {
        self.push(span);
    }
}

/// The full host surface a highlighter needs.
pub trait HighlightHost: StyleResolver + RedrawScheduler {}

impl<T: StyleResolver + RedrawScheduler + ?Sized> HighlightHost for T {}

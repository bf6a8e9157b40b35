//! Style ids and ephemeral highlight spans.

use crate::edit::Point;

/// Style ID type.
///
/// Resolved by the host from a style name (see
/// [`StyleResolver`](crate::host::StyleResolver)). The value is opaque to the syntax layer.
pub type StyleId = u32;

/// The reserved "no style" id.
///
/// Resolvers return this for unknown style names; spans with this id are never emitted.
pub const UNSTYLED: StyleId = 0;

/// A highlight annotation for the current redraw pass.
///
/// Spans are **ephemeral**: they are valid only for the pass that produced them and must be
/// re-emitted every time the covered lines are redrawn. They are never persisted as document
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start position of the highlighted node.
    pub start: Point,
    /// Exclusive end position of the highlighted node.
    pub end: Point,
    /// Resolved style id (never [`UNSTYLED`]).
    pub style_id: StyleId,
    /// Always `true`; carried so hosts can route the span to per-pass decoration storage.
    pub ephemeral: bool,
}

impl HighlightSpan {
    /// Create an ephemeral span.
    pub fn new(start: Point, end: Point, style_id: StyleId) -> Self {
        Self {
            start,
            end,
            style_id,
            ephemeral: true,
        }
    }
}

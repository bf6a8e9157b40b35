//! Rope-backed shared text handle.
//!
//! The host owns the text being parsed; the syntax layer holds a non-owning reference and only
//! ever reads it. [`SourceText`] wraps a [`ropey::Rope`] so byte/row conversions are O(log N)
//! and parsers can read the text chunk by chunk without materializing a `String`.
//!
//! Mutation flows through [`SourceText::apply_edit`], which returns the structured
//! [`EditDescription`] the host then delivers to edit-notification listeners.

use crate::edit::{EditDescription, Point};
use ropey::Rope;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared, single-threaded handle to a [`SourceText`].
///
/// The whole subsystem is cooperative and callback-driven; `Rc<RefCell<_>>` matches that model.
pub type SharedSource = Rc<RefCell<SourceText>>;

/// The mutable text a tree of parsers is kept in sync with.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    rope: Rope,
}

impl SourceText {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from initial text.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Create a shared handle from initial text.
    pub fn shared(text: &str) -> SharedSource {
        Rc::new(RefCell::new(Self::from_str(text)))
    }

    /// Total length in bytes.
    pub fn byte_len(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Total number of lines (a trailing newline opens a final empty line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Byte offset of the first character of `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= line_count()`.
    pub fn line_to_byte(&self, row: usize) -> usize {
        self.rope.line_to_byte(row)
    }

    /// Convert a byte offset to a row/byte-column position.
    ///
    /// # Panics
    ///
    /// Panics if `byte > byte_len()`.
    pub fn byte_to_point(&self, byte: usize) -> Point {
        let row = self.rope.byte_to_line(byte);
        Point::new(row, byte - self.rope.line_to_byte(row))
    }

    /// Convert a row/byte-column position to a byte offset.
    pub fn point_to_byte(&self, point: Point) -> usize {
        self.rope.line_to_byte(point.row) + point.column
    }

    /// The position one past the last character.
    pub fn end_point(&self) -> Point {
        self.byte_to_point(self.byte_len())
    }

    /// Copy the text in a byte range out of the rope.
    pub fn text_in(&self, range: std::ops::Range<usize>) -> String {
        let start = self.rope.byte_to_char(range.start);
        let end = self.rope.byte_to_char(range.end);
        self.rope.slice(start..end).to_string()
    }

    /// The chunk containing `byte` and the byte offset the chunk starts at.
    ///
    /// Parsers use this to read the source incrementally; `byte == byte_len()` returns an empty
    /// tail chunk.
    pub fn chunk_at_byte(&self, byte: usize) -> (&str, usize) {
        let (chunk, chunk_start, _, _) = self.rope.chunk_at_byte(byte);
        (chunk, chunk_start)
    }

    /// Iterate over the chunks covering a byte range.
    pub fn chunks_in(&self, range: std::ops::Range<usize>) -> ropey::iter::Chunks<'_> {
        let start = self.rope.byte_to_char(range.start);
        let end = self.rope.byte_to_char(range.end);
        self.rope.slice(start..end).chunks()
    }

    /// Replace the bytes `[start_byte, old_end_byte)` with `text` and describe the change.
    ///
    /// All three positions of the returned description are computed here, from the pre- and
    /// post-edit rope, so downstream consumers never re-derive end points.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or not on character boundaries.
    pub fn apply_edit(
        &mut self,
        start_byte: usize,
        old_end_byte: usize,
        text: &str,
    ) -> EditDescription {
        let start_position = self.byte_to_point(start_byte);
        let old_end_position = self.byte_to_point(old_end_byte);

        let start_char = self.rope.byte_to_char(start_byte);
        let old_end_char = self.rope.byte_to_char(old_end_byte);
        self.rope.remove(start_char..old_end_char);
        self.rope.insert(start_char, text);

        let new_end_byte = start_byte + text.len();
        EditDescription {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_position,
            old_end_position,
            new_end_position: self.byte_to_point(new_end_byte),
        }
    }
}

impl std::fmt::Display for SourceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rope)
    }
}

//! Points and structured edit descriptions.
//!
//! Incremental consumers (parse trees, highlight caches) need **structured edits** rather than
//! "the document changed somewhere". This module defines the 9-field edit tuple the host delivers
//! on every mutation: the edit start, the old end, and the new end, each as a byte offset plus a
//! row/column position.
//!
//! All positions are computed from the actual deleted/inserted text by the constructors here (or
//! by [`SourceText::apply_edit`](crate::SourceText::apply_edit)); consumers apply them verbatim
//! and never re-derive end points.

/// A position in a text source, as a zero-based row and a **byte** column within that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Point {
    /// Zero-based line number.
    pub row: usize,
    /// Byte offset within the line.
    pub column: usize,
}

impl Point {
    /// Create a point from a row and byte column.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The position reached by walking `text` forward from `self`.
    ///
    /// Newlines in `text` advance the row and reset the column.
    pub fn advanced_by(mut self, text: &str) -> Self {
        let mut parts = text.split('\n');
        let Some(first) = parts.next() else {
            return self;
        };

        self.column = self.column.saturating_add(first.len());
        for part in parts {
            self.row = self.row.saturating_add(1);
            self.column = part.len();
        }

        self
    }
}

/// A structured description of one text mutation.
///
/// The deleted range is `[start_byte, old_end_byte)` in the pre-edit document; the inserted range
/// is `[start_byte, new_end_byte)` in the post-edit document. Positions carry the same three
/// locations in row/column form so tree consumers can shift cached rows without a line index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDescription {
    /// Byte offset where the edit starts.
    pub start_byte: usize,
    /// Exclusive end byte of the deleted range (pre-edit coordinates).
    pub old_end_byte: usize,
    /// Exclusive end byte of the inserted range (post-edit coordinates).
    pub new_end_byte: usize,
    /// Position of `start_byte`.
    pub start_position: Point,
    /// Position of `old_end_byte` in the pre-edit document.
    pub old_end_position: Point,
    /// Position of `new_end_byte` in the post-edit document.
    pub new_end_position: Point,
}

impl EditDescription {
    /// Describe inserting `inserted` at `offset` into `before` (the pre-edit text).
    pub fn insert(before: &str, offset: usize, inserted: &str) -> Self {
        let start_position = point_at(before, offset);
        Self {
            start_byte: offset,
            old_end_byte: offset,
            new_end_byte: offset + inserted.len(),
            start_position,
            old_end_position: start_position,
            new_end_position: start_position.advanced_by(inserted),
        }
    }

    /// Describe deleting `len` bytes at `offset` from `before` (the pre-edit text).
    pub fn delete(before: &str, offset: usize, len: usize) -> Self {
        let start_position = point_at(before, offset);
        let deleted = &before[offset..offset + len];
        Self {
            start_byte: offset,
            old_end_byte: offset + len,
            new_end_byte: offset,
            start_position,
            old_end_position: start_position.advanced_by(deleted),
            new_end_position: start_position,
        }
    }

    /// Net change in document length, in bytes.
    pub fn byte_delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }
}

fn point_at(text: &str, offset: usize) -> Point {
    Point::default().advanced_by(&text[..offset])
}

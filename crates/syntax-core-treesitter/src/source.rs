//! Bridging between [`SourceText`] and Tree-sitter.
//!
//! Parsing and query evaluation both read the rope chunk by chunk; the source is never
//! materialized into a contiguous buffer.

use syntax_core::{EditDescription, Point, SourceText};
use tree_sitter::{InputEdit, Node, Parser, TextProvider, Tree};

pub(crate) fn ts_point(point: Point) -> tree_sitter::Point {
    tree_sitter::Point {
        row: point.row,
        column: point.column,
    }
}

pub(crate) fn core_point(point: tree_sitter::Point) -> Point {
    Point::new(point.row, point.column)
}

pub(crate) fn input_edit(edit: &EditDescription) -> InputEdit {
    InputEdit {
        start_byte: edit.start_byte,
        old_end_byte: edit.old_end_byte,
        new_end_byte: edit.new_end_byte,
        start_position: ts_point(edit.start_position),
        old_end_position: ts_point(edit.old_end_position),
        new_end_position: ts_point(edit.new_end_position),
    }
}

/// The whole-document range of `source`, used as the changed range of a first parse.
pub(crate) fn full_range(source: &SourceText) -> tree_sitter::Range {
    tree_sitter::Range {
        start_byte: 0,
        end_byte: source.byte_len(),
        start_point: tree_sitter::Point { row: 0, column: 0 },
        end_point: ts_point(source.end_point()),
    }
}

/// Run `parser` over `source` chunk by chunk, reusing `old_tree` incrementally when present.
pub(crate) fn parse_source(
    parser: &mut Parser,
    source: &SourceText,
    old_tree: Option<&Tree>,
) -> Option<Tree> {
    let len = source.byte_len();
    let mut chunk = |byte: usize, _position: tree_sitter::Point| -> &[u8] {
        if byte >= len {
            return &[];
        }
        let (text, chunk_start) = source.chunk_at_byte(byte);
        &text.as_bytes()[byte - chunk_start..]
    };
    parser.parse_with_options(&mut chunk, old_tree, None)
}

/// A [`TextProvider`] over rope chunks, for query predicate evaluation.
pub struct RopeProvider<'a>(pub &'a SourceText);

/// Byte view of the chunks covering one node.
pub struct ChunkBytes<'a> {
    chunks: ropey::iter::Chunks<'a>,
}

impl<'a> Iterator for ChunkBytes<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(str::as_bytes)
    }
}

impl<'a> TextProvider<&'a [u8]> for RopeProvider<'a> {
    type I = ChunkBytes<'a>;

    fn text(&mut self, node: Node) -> Self::I {
        ChunkBytes {
            chunks: self.0.chunks_in(node.start_byte()..node.end_byte()),
        }
    }
}

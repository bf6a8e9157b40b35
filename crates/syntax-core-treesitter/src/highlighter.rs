//! On-demand, per-line highlight resolution.
//!
//! The [`Highlighter`] walks every [`LanguageTree`] overlapping a requested line and emits the
//! highlight spans for that line. Work is shared across a redraw pass: each subtree keeps a
//! resumable capture cursor, so highlighting lines top to bottom does one linear sweep over the
//! captures instead of rescanning per line.

use crate::language::LanguageLoader;
use crate::language_tree::LanguageTree;
use crate::source::{RopeProvider, core_point};
use crate::SyntaxError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use streaming_iterator::StreamingIterator;
use syntax_core::{HighlightHost, HighlightSpan, Point, SourceText, SpanSink, StyleId, StyleResolver, UNSTYLED};
use tree_sitter::{Node, Query, QueryCursor};

/// Default mapping from semantic capture names to style names.
///
/// Consulted for captures whose name is entirely lower-case and therefore semantic (e.g.
/// `comment`, `string.escape`). Unlisted names resolve to no style.
const DEFAULT_CAPTURE_STYLES: &[(&str, &str)] = &[
    ("boolean", "Boolean"),
    ("character", "Character"),
    ("comment", "Comment"),
    ("conditional", "Conditional"),
    ("constant", "Constant"),
    ("constant.builtin", "Special"),
    ("constant.macro", "Define"),
    ("constructor", "Special"),
    ("error", "Error"),
    ("exception", "Exception"),
    ("field", "Identifier"),
    ("float", "Float"),
    ("function", "Function"),
    ("function.builtin", "Special"),
    ("function.macro", "Macro"),
    ("include", "Include"),
    ("keyword", "Keyword"),
    ("label", "Label"),
    ("method", "Function"),
    ("number", "Number"),
    ("operator", "Operator"),
    ("parameter", "Identifier"),
    ("property", "Identifier"),
    ("punctuation.bracket", "Delimiter"),
    ("punctuation.delimiter", "Delimiter"),
    ("repeat", "Repeat"),
    ("string", "String"),
    ("string.escape", "SpecialChar"),
    ("string.regex", "String"),
    ("structure", "Structure"),
    ("type", "Type"),
    ("type.builtin", "Type"),
    ("variable.builtin", "Special"),
];

/// Resolve one capture name to a style id.
///
/// A name that is not entirely lower-case names a style directly: the substring before the first
/// `.` is handed to the resolver verbatim (e.g. `Normal.left` resolves `Normal`), bypassing the
/// default table. Lower-case names go through [`DEFAULT_CAPTURE_STYLES`].
fn resolve_capture_style(name: &str, resolver: &dyn StyleResolver) -> StyleId {
    if name.chars().any(|c| c.is_uppercase()) {
        let style = name.split('.').next().unwrap_or(name);
        return resolver.resolve_style(style);
    }
    DEFAULT_CAPTURE_STYLES
        .iter()
        .find(|(capture, _)| *capture == name)
        .map(|(_, style)| resolver.resolve_style(style))
        .unwrap_or(UNSTYLED)
}

/// A compiled highlight query plus its lazily memoized capture-to-style cache.
///
/// The cache keys are this query's capture ids; they are not portable across queries, so
/// replacing the query replaces the cache.
pub struct HighlightQuery {
    query: Query,
    styles: RefCell<HashMap<u32, StyleId>>,
}

impl HighlightQuery {
    /// Compile `source` against `language`. Malformed queries fail here, never per line.
    pub fn new(language: &tree_sitter::Language, source: &str) -> Result<Self, SyntaxError> {
        Ok(Self {
            query: Query::new(language, source)?,
            styles: RefCell::new(HashMap::new()),
        })
    }

    /// The style for a capture id, computing and memoizing it on first use.
    fn style_for_capture(&self, index: u32, resolver: &dyn StyleResolver) -> StyleId {
        if let Some(&style) = self.styles.borrow().get(&index) {
            return style;
        }
        let name = self.query.capture_names()[index as usize];
        let style = resolve_capture_style(name, resolver);
        self.styles.borrow_mut().insert(index, style);
        style
    }
}

/// One capture pulled from a subtree's highlight query, in document order.
struct CaptureSpan {
    capture: u32,
    start: Point,
    end: Point,
}

/// Pass-scoped resumable cursor over one subtree's captures.
///
/// `next_row` only ever increases within a pass; the cursor is dropped (not rewound) at the next
/// pass begin or when the owning tree is invalidated.
pub(crate) struct HighlightCursor {
    captures: Vec<CaptureSpan>,
    index: usize,
    next_row: usize,
}

impl HighlightCursor {
    /// Collect the captures of `query` over `node`, restricted to rows `[start_row, end_row)`.
    fn collect(query: &HighlightQuery, node: Node, source: &SourceText, rows: Range<usize>) -> Self {
        let mut cursor = QueryCursor::new();
        cursor.set_point_range(
            tree_sitter::Point { row: rows.start, column: 0 }
                ..tree_sitter::Point { row: rows.end, column: 0 },
        );

        let mut captures = Vec::new();
        let mut iter = cursor.captures(&query.query, node, RopeProvider(source));
        while let Some((m, capture_index)) = iter.next() {
            let capture = &m.captures[*capture_index];
            captures.push(CaptureSpan {
                capture: capture.index,
                start: core_point(capture.node.start_position()),
                end: core_point(capture.node.end_position()),
            });
        }

        Self {
            captures,
            index: 0,
            next_row: 0,
        }
    }
}

/// Per-line highlight resolver over a [`LanguageTree`] and its descendants.
///
/// Construction registers a tree-changed listener on the root (changed ranges become redraw
/// requests) and requests a full-document redraw. The host then drives the pass lifecycle:
/// [`on_pass_begin`](Self::on_pass_begin) once per pass, [`on_window`](Self::on_window) per
/// window, then [`on_line`](Self::on_line) per visible row in non-decreasing order.
pub struct Highlighter {
    root: Rc<RefCell<LanguageTree>>,
    host: Rc<dyn HighlightHost>,
    loader: Rc<dyn LanguageLoader>,
    root_language: String,
    queries: RefCell<HashMap<String, Option<Rc<HighlightQuery>>>>,
}

impl Highlighter {
    /// Bind a highlighter to a root tree with the query for the root language.
    pub fn new(
        root: Rc<RefCell<LanguageTree>>,
        query: HighlightQuery,
        host: Rc<dyn HighlightHost>,
        loader: Rc<dyn LanguageLoader>,
    ) -> Self {
        let root_language = {
            let mut tree = root.borrow_mut();
            let redraw_host = Rc::clone(&host);
            tree.on_tree_changed(move |ranges| {
                for range in ranges {
                    redraw_host.request_redraw(range.start_point.row..range.end_point.row + 1);
                }
            });
            tree.language_name().to_string()
        };

        let mut queries = HashMap::new();
        queries.insert(root_language.clone(), Some(Rc::new(query)));

        let highlighter = Self {
            root,
            host,
            loader,
            root_language,
            queries: RefCell::new(queries),
        };
        highlighter.request_full_redraw();
        highlighter
    }

    /// The root tree this highlighter reads.
    pub fn root(&self) -> &Rc<RefCell<LanguageTree>> {
        &self.root
    }

    /// Replace the root language's highlight query.
    ///
    /// Drops the old query's capture-to-style cache (ids are query-specific) and requests a
    /// full-document redraw.
    pub fn set_query(&self, query: HighlightQuery) {
        self.queries
            .borrow_mut()
            .insert(self.root_language.clone(), Some(Rc::new(query)));
        self.request_full_redraw();
    }

    /// Begin a redraw pass: drop every subtree's cursor state.
    ///
    /// Runs over all subtrees even if the pass never requests lines overlapping some of them;
    /// cursor state is pass-scoped, not line-scoped. An abandoned pass needs no cleanup beyond
    /// the next call here.
    pub fn on_pass_begin(&self) {
        self.root.borrow_mut().for_each_tree(&mut |tree| {
            tree.highlight_cursor = None;
        });
    }

    /// Begin redrawing a window: make the tree of trees valid.
    ///
    /// Returns whether highlighting can proceed for this window.
    pub fn on_window(&self, _visible_rows: Range<usize>) -> bool {
        match self.root.borrow_mut().parse() {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "window parse failed; skipping highlights");
                false
            }
        }
    }

    /// Emit the spans for one line into `sink`.
    ///
    /// Walks every subtree whose covered rows include `line`, parent before children, children
    /// in ascending language-name order; the host layers later spans over earlier ones.
    pub fn on_line(&self, line: usize, sink: &mut dyn SpanSink) {
        self.root.borrow_mut().for_each_tree(&mut |tree| {
            self.highlight_tree_line(tree, line, sink);
        });
    }

    fn highlight_tree_line(&self, tree: &mut LanguageTree, line: usize, sink: &mut dyn SpanSink) {
        let Some(ts_tree) = tree.tree().cloned() else {
            return;
        };
        let root_node = ts_tree.root_node();
        let end_row = root_node.end_position().row;
        if line < root_node.start_position().row || line > end_row {
            return;
        }
        let Some(query) = self.query_for(tree.language_name()) else {
            return;
        };

        if tree.highlight_cursor.is_none() {
            let source = Rc::clone(tree.source());
            let source = source.borrow();
            tree.highlight_cursor = Some(HighlightCursor::collect(
                &query,
                root_node,
                &source,
                line..end_row + 1,
            ));
        }
        let Some(cursor) = tree.highlight_cursor.as_mut() else {
            return;
        };

        // Pull until the next interesting row. A capture starting past this line is left
        // unconsumed and re-evaluated when the pass reaches its start row.
        while cursor.next_row <= line {
            let Some(span) = cursor.captures.get(cursor.index) else {
                break;
            };
            if span.start.row > line {
                cursor.next_row = span.start.row;
                break;
            }
            cursor.index += 1;

            let resolver: &dyn StyleResolver = &*self.host;
            let style = query.style_for_capture(span.capture, resolver);
            if span.end.row >= line && style != UNSTYLED {
                sink.emit(HighlightSpan::new(span.start, span.end, style));
            }
        }
    }

    /// The compiled highlight query for `language`, compiling it from the loader on first use.
    fn query_for(&self, language: &str) -> Option<Rc<HighlightQuery>> {
        if let Some(query) = self.queries.borrow().get(language) {
            return query.clone();
        }
        let compiled = self
            .loader
            .language_config(language)
            .and_then(|config| {
                match HighlightQuery::new(&config.language, &config.highlights_query) {
                    Ok(query) => Some(Rc::new(query)),
                    Err(err) => {
                        tracing::debug!(%language, error = %err, "highlight query failed to compile");
                        None
                    }
                }
            });
        self.queries
            .borrow_mut()
            .insert(language.to_string(), compiled.clone());
        compiled
    }

    fn request_full_redraw(&self) {
        let lines = self.root.borrow().source().borrow().line_count();
        self.host.request_redraw(0..lines);
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("root_language", &self.root_language)
            .field("compiled_queries", &self.queries.borrow().len())
            .finish_non_exhaustive()
    }
}

//! A tree of incremental parse trees.
//!
//! A [`LanguageTree`] owns one Tree-sitter parser bound to one language, the current parse tree
//! for its region of the source, and one child `LanguageTree` per embedded language discovered by
//! its injection query. Edits invalidate the whole subtree; the next [`LanguageTree::parse`]
//! reparses incrementally, reconciles the children, and notifies listeners.

use crate::highlighter::HighlightCursor;
use crate::injection::{InjectionGroups, resolve_injections};
use crate::language::{LanguageConfig, LanguageLoader, SyntaxError};
use crate::source::{full_range, input_edit, parse_source};
use std::collections::BTreeMap;
use std::rc::Rc;
use syntax_core::{EditDescription, SharedSource};
use tree_sitter::{Parser, Query, Tree};

/// Callback invoked after a parse, with the ranges whose structure changed.
pub type TreeChangedCallback = Box<dyn FnMut(&[tree_sitter::Range])>;
/// Callback invoked after an edit has been applied to the cached tree.
pub type BytesEditedCallback = Box<dyn FnMut(&EditDescription)>;
/// Callback invoked with a language name when a child tree is added or removed.
pub type ChildCallback = Box<dyn FnMut(&str)>;

#[derive(Default)]
struct Callbacks {
    on_changed: Vec<TreeChangedCallback>,
    on_bytes: Vec<BytesEditedCallback>,
    on_child_added: Vec<ChildCallback>,
    on_child_removed: Vec<ChildCallback>,
}

/// One language's incremental parse state over a shared source, plus its injected children.
///
/// The tree is either *valid* (the cached tree reflects the current source) or *invalid*; the
/// cached tree is never read while invalid; [`LanguageTree::parse`] is the only way in.
/// Children are keyed by language name and always match the most recent injection resolution
/// exactly.
///
/// Listeners registered through the `on_*` methods must not call back into the tree they observe;
/// they run while the tree is being mutated.
pub struct LanguageTree {
    source: SharedSource,
    name: String,
    loader: Rc<dyn LanguageLoader>,
    parser: Parser,
    injection_query: Option<Query>,
    tree: Option<Tree>,
    valid: bool,
    included_ranges: Vec<tree_sitter::Range>,
    children: BTreeMap<String, LanguageTree>,
    callbacks: Callbacks,
    /// Pass-scoped highlight cursor; owned conceptually by the highlighter.
    pub(crate) highlight_cursor: Option<HighlightCursor>,
}

impl LanguageTree {
    /// Create an (unparsed) tree for `name` over `source`.
    ///
    /// Fails immediately if the loader does not know the language, the grammar cannot be bound,
    /// or the language's injection query does not compile. A tree that failed to construct must
    /// not be retried.
    pub fn new(
        source: SharedSource,
        name: impl Into<String>,
        loader: Rc<dyn LanguageLoader>,
    ) -> Result<Self, SyntaxError> {
        let name = name.into();
        let config: LanguageConfig = loader
            .language_config(&name)
            .ok_or_else(|| SyntaxError::UnknownLanguage(name.clone()))?;

        let mut parser = Parser::new();
        parser.set_language(&config.language)?;

        let injection_query = match config.injections_query.as_deref() {
            Some(q) if !q.trim().is_empty() => Some(Query::new(&config.language, q)?),
            _ => None,
        };

        Ok(Self {
            source,
            name,
            loader,
            parser,
            injection_query,
            tree: None,
            valid: false,
            included_ranges: Vec::new(),
            children: BTreeMap::new(),
            callbacks: Callbacks::default(),
            highlight_cursor: None,
        })
    }

    /// The language this tree parses.
    pub fn language_name(&self) -> &str {
        &self.name
    }

    /// The shared source this tree reads.
    pub fn source(&self) -> &SharedSource {
        &self.source
    }

    /// The cached tree, if one has been produced.
    ///
    /// `None` before the first [`parse`](Self::parse); may be stale while
    /// [`is_valid`](Self::is_valid) is `false`.
    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Whether the cached tree reflects the current source.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The sub-ranges of the source this tree is restricted to (empty = whole document).
    pub fn included_ranges(&self) -> &[tree_sitter::Range] {
        &self.included_ranges
    }

    /// Child trees, in ascending language-name order.
    pub fn children(&self) -> impl Iterator<Item = &LanguageTree> {
        self.children.values()
    }

    /// The child tree for `language`, if present.
    pub fn child(&self, language: &str) -> Option<&LanguageTree> {
        self.children.get(language)
    }

    /// Mark this tree and every descendant invalid. Never parses.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.highlight_cursor = None;
        for child in self.children.values_mut() {
            child.invalidate();
        }
    }

    /// Apply one source mutation to this subtree.
    ///
    /// Invalidates self and descendants, shifts any cached trees in place so the next parse can
    /// reuse them incrementally, then fires the bytes-edited listeners (so they observe post-edit
    /// coordinates).
    pub fn notify_edit(&mut self, edit: &EditDescription) {
        self.valid = false;
        self.highlight_cursor = None;
        if let Some(tree) = self.tree.as_mut() {
            tree.edit(&input_edit(edit));
        }
        for child in self.children.values_mut() {
            child.notify_edit(edit);
        }
        for callback in self.callbacks.on_bytes.iter_mut() {
            callback(edit);
        }
    }

    /// Restrict parsing to `ranges` of the source and invalidate.
    ///
    /// Injected children are restricted to exactly their content-node ranges this way; an empty
    /// vector lifts the restriction.
    pub fn set_included_ranges(&mut self, ranges: Vec<tree_sitter::Range>) {
        self.included_ranges = ranges;
        self.valid = false;
        self.highlight_cursor = None;
    }

    /// Ensure the cached tree is valid, reparsing and reconciling children if needed.
    ///
    /// Idempotent while valid: returns the cached tree and no changed ranges. Otherwise reparses
    /// (incrementally when an edited tree is cached), resolves injections, reconciles the child
    /// set, recursively parses the children, fires the tree-changed listeners, and returns the
    /// new tree plus the changed ranges.
    pub fn parse(&mut self) -> Result<(Tree, Vec<tree_sitter::Range>), SyntaxError> {
        if self.valid {
            if let Some(tree) = self.tree.clone() {
                return Ok((tree, Vec::new()));
            }
        }

        let source = Rc::clone(&self.source);
        let source = source.borrow();

        self.parser
            .set_included_ranges(&self.included_ranges)
            .map_err(|e| SyntaxError::IncludedRanges(e.0))?;
        let new_tree =
            parse_source(&mut self.parser, &source, self.tree.as_ref()).ok_or(SyntaxError::Parse)?;

        let changed: Vec<tree_sitter::Range> = match self.tree.as_ref() {
            Some(old) => old.changed_ranges(&new_tree).collect(),
            None => vec![full_range(&source)],
        };

        let groups = match self.injection_query.as_ref() {
            Some(query) => resolve_injections(query, &new_tree, &source),
            None => InjectionGroups::new(),
        };
        drop(source);

        tracing::debug!(
            language = %self.name,
            incremental = self.tree.is_some(),
            changed_ranges = changed.len(),
            injections = groups.len(),
            "parsed"
        );

        self.tree = Some(new_tree.clone());
        self.valid = true;
        self.reconcile_children(groups);

        for callback in self.callbacks.on_changed.iter_mut() {
            callback(&changed);
        }
        Ok((new_tree, changed))
    }

    /// Reconcile the child set against the languages found by the last injection resolution.
    ///
    /// Set-equality based: stale children are removed (removal listeners fire once, destruction
    /// is depth-first via drop), missing children are created, and every surviving child is
    /// restricted to exactly its group's content ranges. Runs on every parse, including when no
    /// injections were found.
    ///
    /// Infallible: a child that cannot be constructed, restricted, or parsed is dropped from the
    /// map instead of failing the parent's parse. An injection the grammar stack cannot serve
    /// degrades to an unhighlighted region, it never blocks editing.
    fn reconcile_children(&mut self, groups: InjectionGroups) {
        let stale: Vec<String> = self
            .children
            .keys()
            .filter(|name| !groups.contains_key(*name))
            .cloned()
            .collect();
        for name in stale {
            self.children.remove(&name);
            tracing::debug!(language = %name, "removed injected child");
            for callback in self.callbacks.on_child_removed.iter_mut() {
                callback(&name);
            }
        }

        for (name, ranges) in groups {
            if !self.children.contains_key(&name) {
                match LanguageTree::new(Rc::clone(&self.source), &name, Rc::clone(&self.loader)) {
                    Ok(child) => {
                        self.children.insert(name.clone(), child);
                        tracing::debug!(language = %name, "added injected child");
                        for callback in self.callbacks.on_child_added.iter_mut() {
                            callback(&name);
                        }
                    }
                    Err(err) => {
                        // An injected language the loader cannot provide is a skipped
                        // injection, not a fatal configuration error.
                        tracing::debug!(language = %name, error = %err, "skipping injection");
                        continue;
                    }
                }
            }
            if let Some(child) = self.children.get_mut(&name) {
                if child.included_ranges != ranges {
                    child.set_included_ranges(ranges);
                }
                if let Err(err) = child.parse() {
                    // e.g. nested matches of one language yield overlapping ranges, which the
                    // parser rejects. Drop the child; the region stays unhighlighted.
                    tracing::debug!(language = %name, error = %err, "child parse failed; dropping child");
                    self.children.remove(&name);
                    for callback in self.callbacks.on_child_removed.iter_mut() {
                        callback(&name);
                    }
                }
            }
        }
    }

    /// Depth-first traversal over this tree and all descendants, parent first, children in
    /// ascending language-name order.
    ///
    /// Always visits `self` first; callers that only want the descendants iterate
    /// [`children`](Self::children) instead.
    pub fn for_each_tree<F: FnMut(&mut LanguageTree)>(&mut self, f: &mut F) {
        f(self);
        for child in self.children.values_mut() {
            child.for_each_tree(f);
        }
    }

    /// Whether this tree's included region covers the whole byte range.
    pub fn contains(&self, range: &std::ops::Range<usize>) -> bool {
        self.included_ranges.is_empty()
            || self
                .included_ranges
                .iter()
                .any(|r| r.start_byte <= range.start && range.end <= r.end_byte)
    }

    /// The smallest subtree whose included region covers the byte range.
    ///
    /// Hosts use this to route position-dependent features (indentation, symbols) to the
    /// language actually under the cursor. Falls back to `self` when no child covers the range.
    pub fn language_for_range(&self, range: &std::ops::Range<usize>) -> &LanguageTree {
        for child in self.children.values() {
            if child.contains(range) {
                return child.language_for_range(range);
            }
        }
        self
    }

    /// Register a listener for tree-changed events.
    pub fn on_tree_changed<F>(&mut self, callback: F)
    where
        F: FnMut(&[tree_sitter::Range]) + 'static,
    {
        self.callbacks.on_changed.push(Box::new(callback));
    }

    /// Register a listener for bytes-edited events.
    pub fn on_bytes_edited<F>(&mut self, callback: F)
    where
        F: FnMut(&EditDescription) + 'static,
    {
        self.callbacks.on_bytes.push(Box::new(callback));
    }

    /// Register a listener for child-added events.
    pub fn on_child_added<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.callbacks.on_child_added.push(Box::new(callback));
    }

    /// Register a listener for child-removed events.
    pub fn on_child_removed<F>(&mut self, callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.callbacks.on_child_removed.push(Box::new(callback));
    }
}

impl std::fmt::Debug for LanguageTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageTree")
            .field("language", &self.name)
            .field("valid", &self.valid)
            .field("parsed", &self.tree.is_some())
            .field("included_ranges", &self.included_ranges.len())
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

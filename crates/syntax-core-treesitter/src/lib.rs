#![warn(missing_docs)]
//! `syntax-core-treesitter` - Tree-sitter integration for `syntax-core`.
//!
//! This crate keeps a **tree of trees** valid over a mutable [`syntax_core::SourceText`] and
//! drives on-demand, per-visible-line highlighting from it:
//!
//! - [`LanguageTree`] owns one incremental parser per language, plus one child tree per embedded
//!   ("injected") language discovered by that language's injection query
//! - [`Highlighter`] answers per-line highlight requests lazily, resuming a cached capture cursor
//!   per subtree so a full redraw pass does linear work over the document instead of rescanning
//!   per line
//!
//! Hosts deliver [`syntax_core::EditDescription`]s to the root tree, drive the highlighter from
//! their redraw hooks (`on_pass_begin` / `on_window` / `on_line`), and receive ephemeral
//! [`syntax_core::HighlightSpan`]s back through a [`syntax_core::SpanSink`].

mod highlighter;
mod injection;
mod language;
mod language_tree;
mod registry;
mod source;

pub use highlighter::{HighlightQuery, Highlighter};
pub use language::{LanguageConfig, LanguageLoader, LanguageRegistry, SyntaxError};
pub use language_tree::LanguageTree;
pub use registry::HighlighterRegistry;
pub use source::RopeProvider;

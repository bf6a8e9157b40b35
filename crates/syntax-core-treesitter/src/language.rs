//! Language configuration and lookup.

use std::collections::HashMap;

/// Errors produced by this crate.
///
/// Configuration problems (unknown language bindings, malformed queries) are fatal at
/// construction time; nothing here is raised per line or per capture.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// No [`LanguageConfig`] is registered for the requested language name.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
    /// Binding the Tree-sitter language to a parser failed (ABI mismatch).
    #[error("tree-sitter language error: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    /// Compiling a Tree-sitter query failed.
    #[error("tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),
    /// An included-ranges restriction was rejected by the parser.
    #[error("invalid included ranges at index {0}")]
    IncludedRanges(usize),
    /// The parser returned no tree.
    #[error("tree-sitter produced no tree")]
    Parse,
}

/// Configuration for one language: its grammar and its query sources.
#[derive(Clone)]
pub struct LanguageConfig {
    /// Tree-sitter grammar.
    pub language: tree_sitter::Language,
    /// Syntax highlighting query (`.scm`).
    pub highlights_query: String,
    /// Optional injection query (`.scm`) locating embedded-language regions.
    pub injections_query: Option<String>,
}

impl LanguageConfig {
    /// Create a config with a grammar and a highlights query.
    pub fn new(language: tree_sitter::Language, highlights_query: impl Into<String>) -> Self {
        Self {
            language,
            highlights_query: highlights_query.into(),
            injections_query: None,
        }
    }

    /// Set an injection query.
    pub fn with_injections_query(mut self, injections_query: impl Into<String>) -> Self {
        self.injections_query = Some(injections_query.into());
        self
    }
}

impl std::fmt::Debug for LanguageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageConfig")
            .field("highlights_query", &self.highlights_query.len())
            .field("injections_query", &self.injections_query.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

/// Resolves language names to configurations.
///
/// [`LanguageTree`](crate::LanguageTree) consults the loader when constructing the root tree and
/// whenever injection resolution discovers a new embedded language.
pub trait LanguageLoader {
    /// Return the configuration for `name`, or `None` if the language is unavailable.
    fn language_config(&self, name: &str) -> Option<LanguageConfig>;
}

/// A plain map-backed [`LanguageLoader`].
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the configuration for `name`.
    pub fn register(&mut self, name: impl Into<String>, config: LanguageConfig) {
        self.configs.insert(name.into(), config);
    }

    /// Number of registered languages.
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Returns `true` if no languages are registered.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl LanguageLoader for LanguageRegistry {
    fn language_config(&self, name: &str) -> Option<LanguageConfig> {
        self.configs.get(name).cloned()
    }
}

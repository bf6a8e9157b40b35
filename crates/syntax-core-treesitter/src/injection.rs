//! Injection resolution: discovering embedded-language regions.
//!
//! After every parse, the owning [`LanguageTree`](crate::LanguageTree) runs its injection query
//! (if any) over the fresh tree and groups the captured content nodes by resolved language. The
//! tree then reconciles its child set against those groups.

use crate::source::RopeProvider;
use std::collections::BTreeMap;
use streaming_iterator::StreamingIterator;
use syntax_core::SourceText;
use tree_sitter::{Query, QueryCursor, Tree};

/// The capture name that authoritatively names the injected language.
///
/// When a match carries a `@language` capture, its **text** is the target language, overriding
/// whatever the other captures in the match would imply.
pub(crate) const LANGUAGE_CAPTURE: &str = "language";

/// Content ranges per resolved language, in match order within each language.
pub(crate) type InjectionGroups = BTreeMap<String, Vec<tree_sitter::Range>>;

/// Evaluate `query` over the root node of `tree` and group content ranges by language.
///
/// Per match: a `@language` capture's text names the language; otherwise the first
/// non-`language` capture's own name is the implied language. Either way that first
/// non-`language` capture's node is the content handed to the child tree. Matches with no
/// usable content capture are skipped; they never fail.
pub(crate) fn resolve_injections(query: &Query, tree: &Tree, source: &SourceText) -> InjectionGroups {
    let mut groups = InjectionGroups::new();
    let capture_names = query.capture_names();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), RopeProvider(source));
    while let Some(m) = matches.next() {
        let mut language: Option<String> = None;
        let mut content: Option<(&str, tree_sitter::Range)> = None;

        for capture in m.captures {
            let name = capture_names[capture.index as usize];
            if name == LANGUAGE_CAPTURE {
                let node = capture.node;
                language = Some(source.text_in(node.start_byte()..node.end_byte()));
            } else if content.is_none() {
                content = Some((name, capture.node.range()));
            }
        }

        let Some((implied, range)) = content else {
            tracing::debug!(pattern = m.pattern_index, "injection match without content capture");
            continue;
        };
        let language = language.unwrap_or_else(|| implied.to_string());
        groups.entry(language).or_default().push(range);
    }

    groups
}

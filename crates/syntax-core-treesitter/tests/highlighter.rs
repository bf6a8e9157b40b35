use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use syntax_core::{
    BufferId, HighlightSpan, RedrawScheduler, SourceText, StyleId, StyleResolver, UNSTYLED,
};
use syntax_core_treesitter::{
    HighlightQuery, Highlighter, HighlighterRegistry, LanguageConfig, LanguageLoader,
    LanguageRegistry, LanguageTree,
};
use tree_sitter_rust::LANGUAGE;

const HIGHLIGHTS: &str = r#"
(line_comment) @comment
(string_literal) @string
(primitive_type) @type
(function_item name: (identifier) @function)
"#;

/// Host double recording every style resolution and redraw request.
#[derive(Default)]
struct TestHost {
    styles: HashMap<String, StyleId>,
    resolutions: RefCell<Vec<String>>,
    redraws: RefCell<Vec<Range<usize>>>,
}

impl TestHost {
    fn with_styles(pairs: &[(&str, StyleId)]) -> Rc<Self> {
        Rc::new(Self {
            styles: pairs.iter().map(|(n, id)| (n.to_string(), *id)).collect(),
            ..Self::default()
        })
    }

    fn resolution_count(&self, name: &str) -> usize {
        self.resolutions.borrow().iter().filter(|n| *n == name).count()
    }

    fn redraw_covering(&self, row: usize) -> bool {
        self.redraws.borrow().iter().any(|r| r.contains(&row))
    }
}

impl StyleResolver for TestHost {
    fn resolve_style(&self, name: &str) -> StyleId {
        self.resolutions.borrow_mut().push(name.to_string());
        self.styles.get(name).copied().unwrap_or(UNSTYLED)
    }
}

impl RedrawScheduler for TestHost {
    fn request_redraw(&self, rows: Range<usize>) {
        self.redraws.borrow_mut().push(rows);
    }
}

fn loader(injections: Option<&str>) -> Rc<dyn LanguageLoader> {
    let mut registry = LanguageRegistry::new();
    let mut config = LanguageConfig::new(LANGUAGE.into(), HIGHLIGHTS);
    if let Some(injections) = injections {
        config = config.with_injections_query(injections);
    }
    registry.register("rust", config);
    registry.register("a", LanguageConfig::new(LANGUAGE.into(), "(line_comment) @Embedded.note"));
    Rc::new(registry)
}

fn highlighter_over(text: &str, host: Rc<TestHost>, injections: Option<&str>) -> Highlighter {
    let source = SourceText::shared(text);
    let loader = loader(injections);
    let root = LanguageTree::new(source, "rust", Rc::clone(&loader)).unwrap();
    let query = HighlightQuery::new(&LANGUAGE.into(), HIGHLIGHTS).unwrap();
    Highlighter::new(Rc::new(RefCell::new(root)), query, host, loader)
}

fn run_pass(highlighter: &Highlighter, rows: Range<usize>) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    highlighter.on_pass_begin();
    assert!(highlighter.on_window(rows.clone()));
    for line in rows {
        highlighter.on_line(line, &mut spans);
    }
    spans
}

const SAMPLE: &str = "// top comment\nfn main() {\n    let s = \"hi\";\n}\n";

#[test]
fn construction_requests_a_full_document_redraw() {
    let host = TestHost::with_styles(&[]);
    let _highlighter = highlighter_over(SAMPLE, Rc::clone(&host), None);
    assert_eq!(host.redraws.borrow()[0], 0..5);
}

#[test]
fn lines_emit_their_spans() {
    let host = TestHost::with_styles(&[("Comment", 1), ("String", 2), ("Function", 3)]);
    let highlighter = highlighter_over(SAMPLE, host, None);

    let mut spans = Vec::new();
    highlighter.on_pass_begin();
    assert!(highlighter.on_window(0..5));
    highlighter.on_line(0, &mut spans);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].style_id, 1);
    assert_eq!(spans[0].start.row, 0);
    assert_eq!(spans[0].end.column, 14);
    assert!(spans[0].ephemeral);

    spans.clear();
    highlighter.on_line(1, &mut spans);
    assert_eq!(spans.len(), 1, "function name span on row 1");
    assert_eq!(spans[0].style_id, 3);

    spans.clear();
    highlighter.on_line(2, &mut spans);
    assert_eq!(spans.len(), 1, "string span on row 2");
    assert_eq!(spans[0].style_id, 2);
}

#[test]
fn unstyled_captures_are_suppressed() {
    // No style registered for `Comment`: the capture resolves to UNSTYLED and is dropped.
    let host = TestHost::with_styles(&[("String", 2)]);
    let highlighter = highlighter_over(SAMPLE, Rc::clone(&host), None);

    let spans = run_pass(&highlighter, 0..5);
    assert!(spans.iter().all(|s| s.style_id != UNSTYLED));
    assert!(!spans.iter().any(|s| s.start.row == 0));
    assert_eq!(host.resolution_count("Comment"), 1);
}

#[test]
fn rerendering_a_line_is_idempotent_across_passes() {
    let host = TestHost::with_styles(&[("Comment", 1), ("String", 2), ("Function", 3)]);
    let highlighter = highlighter_over(SAMPLE, host, None);

    let first = run_pass(&highlighter, 0..5);
    let second = run_pass(&highlighter, 0..5);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn a_pass_emits_each_capture_once() {
    let host = TestHost::with_styles(&[("Comment", 1), ("String", 2), ("Function", 3)]);
    let highlighter = highlighter_over(SAMPLE, host, None);

    let spans = run_pass(&highlighter, 0..5);
    let mut deduped = spans.clone();
    deduped.dedup_by(|a, b| a == b);
    assert_eq!(spans, deduped, "cursor resume must not re-emit consumed captures");
}

#[test]
fn skipping_ahead_does_not_lose_later_captures() {
    let host = TestHost::with_styles(&[("Comment", 1), ("String", 2), ("Function", 3)]);
    let highlighter = highlighter_over(SAMPLE, host, None);

    // Request only rows 0 and 2: the cursor jumps from the comment straight to the string.
    let mut spans = Vec::new();
    highlighter.on_pass_begin();
    assert!(highlighter.on_window(0..5));
    highlighter.on_line(0, &mut spans);
    highlighter.on_line(2, &mut spans);
    assert!(spans.iter().any(|s| s.style_id == 1));
    assert!(spans.iter().any(|s| s.style_id == 2));
}

#[test]
fn capture_styles_resolve_exactly_once_per_query() {
    let two_comments = "// one\n// two\nfn main() {}\n";
    let host = TestHost::with_styles(&[("Comment", 1), ("Function", 3)]);
    let highlighter = highlighter_over(two_comments, Rc::clone(&host), None);

    run_pass(&highlighter, 0..4);
    assert_eq!(host.resolution_count("Comment"), 1);

    // Second pass reuses the memoized resolution.
    run_pass(&highlighter, 0..4);
    assert_eq!(host.resolution_count("Comment"), 1);
}

#[test]
fn set_query_drops_the_style_cache_and_requests_redraw() {
    let host = TestHost::with_styles(&[("Comment", 1), ("String", 2), ("Function", 3)]);
    let highlighter = highlighter_over(SAMPLE, Rc::clone(&host), None);
    run_pass(&highlighter, 0..5);
    assert_eq!(host.resolution_count("Comment"), 1);

    let redraws_before = host.redraws.borrow().len();
    highlighter.set_query(HighlightQuery::new(&LANGUAGE.into(), HIGHLIGHTS).unwrap());
    assert_eq!(host.redraws.borrow().len(), redraws_before + 1);
    assert_eq!(*host.redraws.borrow().last().unwrap(), 0..5);

    run_pass(&highlighter, 0..5);
    assert_eq!(host.resolution_count("Comment"), 2, "new query, new cache");
}

#[test]
fn edit_triggers_redraw_of_the_changed_rows() {
    let source = SourceText::shared("fn main() {\n    let a = 1;\n    let b = 2;\n}\n");
    let loader = loader(None);
    let root = LanguageTree::new(Rc::clone(&source), "rust", Rc::clone(&loader)).unwrap();
    let host = TestHost::with_styles(&[("String", 2), ("Function", 3)]);
    let highlighter = Highlighter::new(
        Rc::new(RefCell::new(root)),
        HighlightQuery::new(&LANGUAGE.into(), HIGHLIGHTS).unwrap(),
        host.clone(),
        loader,
    );
    run_pass(&highlighter, 0..5);

    host.redraws.borrow_mut().clear();
    let offset = source.borrow().line_to_byte(3);
    let edit = source
        .borrow_mut()
        .apply_edit(offset, offset, "    let c = \"three\";\n");
    highlighter.root().borrow_mut().notify_edit(&edit);

    // The next pass parses and the tree-changed listener reports the edited rows.
    let spans = run_pass(&highlighter, 0..6);
    assert!(host.redraw_covering(3), "redraws {:?}", host.redraws.borrow());
    assert!(spans.iter().any(|s| s.start.row == 3 && s.style_id == 2));
}

#[test]
fn injected_trees_emit_after_their_parent() {
    let text = "fn main() {}\n// trailing note\n";
    let host = TestHost::with_styles(&[("Comment", 1), ("Function", 3), ("Embedded", 9)]);
    let highlighter = highlighter_over(text, host, Some("((line_comment) @a)"));

    let mut spans = Vec::new();
    highlighter.on_pass_begin();
    assert!(highlighter.on_window(0..3));
    highlighter.on_line(1, &mut spans);

    // Root emits the comment capture, then the child tree for language `a` emits its own
    // capture `Embedded.note`, whose leading style name is resolved directly.
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].style_id, 1);
    assert_eq!(spans[1].style_id, 9);
}

#[test]
fn registry_tracks_attachment_lifecycle() {
    let host = TestHost::with_styles(&[]);
    let highlighter = Rc::new(RefCell::new(highlighter_over(SAMPLE, host, None)));

    let mut registry = HighlighterRegistry::new();
    let buffer = BufferId(7);
    assert!(registry.attach(buffer, Rc::clone(&highlighter)).is_none());
    assert_eq!(registry.len(), 1);
    assert!(registry.get(buffer).is_some());
    assert!(registry.get(BufferId(8)).is_none());
    assert!(registry.detach(buffer).is_some());
    assert!(registry.is_empty());
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use syntax_core::{RedrawScheduler, SourceText, StyleId, StyleResolver, UNSTYLED};
use syntax_core_treesitter::{
    HighlightQuery, Highlighter, LanguageConfig, LanguageRegistry, LanguageTree,
};
use tree_sitter_rust::LANGUAGE;

struct Host {
    styles: HashMap<&'static str, StyleId>,
}

impl StyleResolver for Host {
    fn resolve_style(&self, name: &str) -> StyleId {
        self.styles.get(name).copied().unwrap_or(UNSTYLED)
    }
}

impl RedrawScheduler for Host {
    fn request_redraw(&self, rows: Range<usize>) {
        println!("redraw requested for rows {rows:?}");
    }
}

fn main() {
    let source = SourceText::shared(
        r#"
// comment
fn add(a: i32, b: i32) -> i32 {
    let s = "hi";
    a + b
}
"#,
    );

    let mut registry = LanguageRegistry::new();
    registry.register(
        "rust",
        LanguageConfig::new(LANGUAGE.into(), tree_sitter_rust::HIGHLIGHTS_QUERY),
    );
    let loader: Rc<dyn syntax_core_treesitter::LanguageLoader> = Rc::new(registry);

    let host = Rc::new(Host {
        styles: HashMap::from([
            ("Comment", 1),
            ("String", 2),
            ("Type", 3),
            ("Function", 4),
        ]),
    });

    let root = LanguageTree::new(Rc::clone(&source), "rust", Rc::clone(&loader))
        .expect("init language tree");
    let query = HighlightQuery::new(&LANGUAGE.into(), tree_sitter_rust::HIGHLIGHTS_QUERY)
        .expect("compile highlights query");
    let highlighter = Highlighter::new(Rc::new(RefCell::new(root)), query, host, loader);

    let lines = source.borrow().line_count();
    let mut spans = Vec::new();
    highlighter.on_pass_begin();
    if highlighter.on_window(0..lines) {
        for line in 0..lines {
            highlighter.on_line(line, &mut spans);
        }
    }

    for span in &spans {
        println!(
            "{}:{}..{}:{} style={}",
            span.start.row, span.start.column, span.end.row, span.end.column, span.style_id
        );
    }
    println!("spans={}", spans.len());
}

//! The table of active highlighters.
//!
//! One coordinating object per host session maps buffers to their highlighters, replacing any
//! ambient global lookup. The host inserts when it constructs a highlighter for a buffer,
//! removes when the buffer (or the session) goes away, and routes its redraw hooks through
//! [`HighlighterRegistry::get`].

use crate::highlighter::Highlighter;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use syntax_core::BufferId;

/// Maps buffers to their active highlighters. Explicit lifecycle: insert on attach, remove on
/// detach; dropping a highlighter destroys its tree of trees depth-first.
#[derive(Debug, Default)]
pub struct HighlighterRegistry {
    active: HashMap<BufferId, Rc<RefCell<Highlighter>>>,
}

impl HighlighterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `highlighter` to `buffer`, returning the previously attached one, if any.
    pub fn attach(
        &mut self,
        buffer: BufferId,
        highlighter: Rc<RefCell<Highlighter>>,
    ) -> Option<Rc<RefCell<Highlighter>>> {
        self.active.insert(buffer, highlighter)
    }

    /// Detach and return the highlighter for `buffer`, if any.
    pub fn detach(&mut self, buffer: BufferId) -> Option<Rc<RefCell<Highlighter>>> {
        self.active.remove(&buffer)
    }

    /// The highlighter for `buffer`, if one is attached.
    pub fn get(&self, buffer: BufferId) -> Option<&Rc<RefCell<Highlighter>>> {
        self.active.get(&buffer)
    }

    /// Number of attached highlighters.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if no highlighters are attached.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

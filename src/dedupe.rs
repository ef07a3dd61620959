//! Deduplication utilities shared by edit-propagation features.

use std::collections::HashSet;

use tower_lsp::lsp_types::Url;

use crate::mapping::Span;
use crate::service::{DocSpan, TextEdit};

/// Tracks `(document, start offset)` pairs already expanded during one
/// logical query. This is what makes teleport traversal terminate on
/// cyclic graphs: a visited location is never re-expanded.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<(Url, usize)>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the location visited. Returns `true` if it was new.
    pub fn insert(&mut self, uri: &Url, span: Span) -> bool {
        self.seen.insert((uri.clone(), span.start))
    }

    pub fn contains(&self, uri: &Url, span: Span) -> bool {
        self.seen.contains(&(uri.clone(), span.start))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Remove exact-duplicate edits: same span, same replacement text.
/// Relative order of the survivors is preserved.
pub fn dedupe_text_edits(edits: Vec<TextEdit>) -> Vec<TextEdit> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(edits.len());
    for edit in edits {
        if seen.insert((edit.span, edit.new_text.clone())) {
            result.push(edit);
        }
    }
    result
}

/// Remove duplicate document locations, preserving order.
pub fn dedupe_doc_spans(spans: Vec<DocSpan>) -> Vec<DocSpan> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(spans.len());
    for loc in spans {
        if seen.insert((loc.uri.clone(), loc.span)) {
            result.push(loc);
        }
    }
    result
}

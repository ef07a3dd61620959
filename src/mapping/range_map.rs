//! Capability-annotated span mapping between a source document and a
//! generated (mapped) document.
//!
//! A `RangeMap` is single-direction in the sense that every entry has a
//! fixed source side and mapped side, but it answers point and interval
//! queries against either side. Entries are immutable for the lifetime of
//! one virtual-document version; regeneration builds a whole new map.

use crate::capabilities::{Capabilities, CapabilityKind, RenameTransform};

/// A byte-offset interval, end-exclusive. A zero-length span is a cursor
/// position and is a valid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// A degenerate span representing a cursor position.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// End-boundary convention for matching queries against an entry.
///
/// Spans are end-exclusive. The exception is `BoundaryInclusive`, used for
/// identifier entries so that a cursor sitting just past the last character
/// of a token still resolves to it (rename at token edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    EndExclusive,
    BoundaryInclusive,
}

/// One mapping between a source span and a mapped span, with the features
/// valid there and optional rename-text rewrites for crossing the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub source: Span,
    pub mapped: Span,
    pub caps: Capabilities,
    pub mode: MappingMode,
    /// Applied to the requested name before it is handed to the
    /// per-language service (source -> mapped direction).
    pub before_rename: Option<RenameTransform>,
    /// Applied to replacement text coming back from the service
    /// (mapped -> source direction).
    pub apply_rename: Option<RenameTransform>,
}

impl MappingEntry {
    pub fn new(source: Span, mapped: Span, caps: Capabilities, mode: MappingMode) -> Self {
        Self {
            source,
            mapped,
            caps,
            mode,
            before_rename: None,
            apply_rename: None,
        }
    }

    fn side_contains(&self, side: Span, query: Span) -> bool {
        if query.start < side.start || query.end > side.end {
            return false;
        }
        match self.mode {
            MappingMode::BoundaryInclusive => true,
            // A cursor sitting exactly on the exclusive end does not match.
            MappingMode::EndExclusive => query.start < side.end || query.start == side.start,
        }
    }

    /// Translate a query sub-span from one side to the other. Equal-length
    /// sides translate offset-exactly; unequal sides (tag-case mappings)
    /// cannot, so the whole opposite span is the answer.
    fn translate(from: Span, to: Span, query: Span) -> Span {
        if from.len() == to.len() {
            Span::new(
                to.start + (query.start - from.start),
                to.start + (query.end - from.start),
            )
        } else {
            to
        }
    }
}

/// A query result: the translated span plus the entry that produced it.
#[derive(Debug, Clone, Copy)]
pub struct MappedSpan<'a> {
    pub span: Span,
    pub entry: &'a MappingEntry,
}

/// An ordered set of mapping entries for one virtual-document version.
///
/// Query results preserve construction order, which is the documented
/// tie-break when several entries contain the same point: first declared
/// wins. Construction therefore places more specific entries (identifier
/// tokens) before broad region entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeMap {
    entries: Vec<MappingEntry>,
}

impl RangeMap {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All mapped spans whose source side contains `query`.
    pub fn source_to_mapped(&self, query: Span) -> Vec<MappedSpan<'_>> {
        self.lookup(query, true, None)
    }

    /// All source spans whose mapped side contains `query`.
    pub fn mapped_to_source(&self, query: Span) -> Vec<MappedSpan<'_>> {
        self.lookup(query, false, None)
    }

    /// Like `source_to_mapped`, restricted to entries supporting `cap`.
    pub fn source_to_mapped_with(&self, query: Span, cap: CapabilityKind) -> Vec<MappedSpan<'_>> {
        self.lookup(query, true, Some(cap))
    }

    /// Like `mapped_to_source`, restricted to entries supporting `cap`.
    pub fn mapped_to_source_with(&self, query: Span, cap: CapabilityKind) -> Vec<MappedSpan<'_>> {
        self.lookup(query, false, Some(cap))
    }

    fn lookup(
        &self,
        query: Span,
        source_side: bool,
        cap: Option<CapabilityKind>,
    ) -> Vec<MappedSpan<'_>> {
        let mut result = Vec::new();
        for entry in &self.entries {
            if let Some(cap) = cap {
                if !entry.caps.supports(cap) {
                    continue;
                }
            }
            let (from, to) = if source_side {
                (entry.source, entry.mapped)
            } else {
                (entry.mapped, entry.source)
            };
            if entry.side_contains(from, query) {
                result.push(MappedSpan {
                    span: MappingEntry::translate(from, to, query),
                    entry,
                });
            }
        }
        result
    }
}

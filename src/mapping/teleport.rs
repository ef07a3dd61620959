//! Same-document links between generated locations.
//!
//! A teleport maps a range within one virtual document to another range in
//! that same document that must be treated as referentially linked: a
//! binding declared in the script portion and its occurrence in the
//! generated render stub are the canonical pair. Edit propagation walks
//! these links transitively, so traversal must be cycle-safe.

use tower_lsp::lsp_types::Url;

use crate::capabilities::{Capabilities, CapabilityKind, RenameTransform};
use crate::dedupe::VisitedSet;
use crate::mapping::range_map::{MappingMode, Span};

/// One directed teleport link. Units construct links in pairs (both
/// directions) so traversal can start from either end.
#[derive(Debug, Clone, PartialEq)]
pub struct TeleportEntry {
    pub anchor: Span,
    pub target: Span,
    pub caps: Capabilities,
    pub mode: MappingMode,
    /// Rewrites the rename text when an edit crosses this link.
    pub rename_transform: Option<RenameTransform>,
}

impl TeleportEntry {
    pub fn new(anchor: Span, target: Span, caps: Capabilities) -> Self {
        Self {
            anchor,
            target,
            caps,
            mode: MappingMode::BoundaryInclusive,
            rename_transform: None,
        }
    }

    fn anchor_contains(&self, query: Span) -> bool {
        if query.start < self.anchor.start || query.end > self.anchor.end {
            return false;
        }
        match self.mode {
            MappingMode::BoundaryInclusive => true,
            MappingMode::EndExclusive => {
                query.start < self.anchor.end || query.start == self.anchor.start
            }
        }
    }
}

/// A teleport query result.
#[derive(Debug, Clone, Copy)]
pub struct TeleportHit<'a> {
    pub span: Span,
    pub entry: &'a TeleportEntry,
}

/// All teleport links for one virtual document, in construction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeleportMap {
    entries: Vec<TeleportEntry>,
}

impl TeleportMap {
    pub fn new(entries: Vec<TeleportEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TeleportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Targets of every link whose anchor contains `query`.
    pub fn find(&self, query: Span) -> Vec<TeleportHit<'_>> {
        self.entries
            .iter()
            .filter(|e| e.anchor_contains(query))
            .map(|entry| TeleportHit {
                span: entry.target,
                entry,
            })
            .collect()
    }

    /// Like `find`, restricted to links supporting `cap`.
    pub fn find_with(&self, query: Span, cap: CapabilityKind) -> Vec<TeleportHit<'_>> {
        self.entries
            .iter()
            .filter(|e| e.caps.supports(cap) && e.anchor_contains(query))
            .map(|entry| TeleportHit {
                span: entry.target,
                entry,
            })
            .collect()
    }
}

/// Transitive closure of teleport links starting at `start`, restricted to
/// links supporting `cap`.
///
/// Iterative worklist with a visited set keyed by `(document, start
/// offset)`: each location is expanded at most once, so traversal
/// terminates on any finite graph, cyclic or not. The start location
/// itself is counted as visited and not included in the result.
pub fn expand_teleports(
    uri: &Url,
    start: Span,
    cap: CapabilityKind,
    map: &TeleportMap,
) -> Vec<Span> {
    let mut visited = VisitedSet::new();
    visited.insert(uri, start);

    let mut worklist = vec![start];
    let mut reached = Vec::new();

    while let Some(span) = worklist.pop() {
        for hit in map.find_with(span, cap) {
            if visited.insert(uri, hit.span) {
                reached.push(hit.span);
                worklist.push(hit.span);
            }
        }
    }

    reached
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("file:///x.poly.template.ts").unwrap()
    }

    fn link(anchor: std::ops::Range<usize>, target: std::ops::Range<usize>) -> TeleportEntry {
        TeleportEntry::new(anchor.into(), target.into(), Capabilities::full())
    }

    #[test]
    fn find_matches_anchor_containment() {
        let map = TeleportMap::new(vec![link(10..15, 40..45)]);
        let hits = map.find(Span::point(12));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Span::new(40, 45));
        assert!(map.find(Span::point(30)).is_empty());
    }

    #[test]
    fn find_with_filters_capability() {
        let mut no_rename = link(10..15, 40..45);
        no_rename.caps = Capabilities {
            references: true,
            ..Capabilities::none()
        };
        let map = TeleportMap::new(vec![no_rename]);
        assert!(map.find_with(Span::point(12), CapabilityKind::RenameIn).is_empty());
        assert_eq!(
            map.find_with(Span::point(12), CapabilityKind::References).len(),
            1
        );
    }

    #[test]
    fn expansion_follows_chains() {
        // 10..15 -> 40..45 -> 70..75
        let map = TeleportMap::new(vec![link(10..15, 40..45), link(40..45, 70..75)]);
        let mut reached = expand_teleports(&url(), Span::new(10, 15), CapabilityKind::RenameIn, &map);
        reached.sort_by_key(|s| s.start);
        assert_eq!(reached, vec![Span::new(40, 45), Span::new(70, 75)]);
    }

    #[test]
    fn expansion_terminates_on_cycles() {
        // 10..15 <-> 40..45, plus a self link
        let map = TeleportMap::new(vec![
            link(10..15, 40..45),
            link(40..45, 10..15),
            link(40..45, 40..45),
        ]);
        let reached = expand_teleports(&url(), Span::new(10, 15), CapabilityKind::RenameIn, &map);
        // The start is visited, so only the other node is reported once.
        assert_eq!(reached, vec![Span::new(40, 45)]);
    }

    #[test]
    fn expansion_from_unlinked_location_is_empty() {
        let map = TeleportMap::new(vec![link(10..15, 40..45)]);
        assert!(expand_teleports(&url(), Span::point(99), CapabilityKind::RenameIn, &map).is_empty());
    }
}

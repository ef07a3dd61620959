//! Source-unit collection and the process-owned global stub.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::document::source_unit::{
    SourceUnit, TargetProject, VirtualDocKind, VirtualDocument,
};

/// URI of the document-independent global stub shared by every
/// template-project document.
pub const GLOBAL_STUB_URI: &str = "polydoc://global/stub.d.ts";

const GLOBAL_STUB_TEXT: &str = "\
// Shared declarations for generated template-project documents.
declare function __render(): void;
";

/// Storage for the source units of one host project, keyed by composite
/// document URI. Removal destroys the unit, so a later lookup observes
/// nothing rather than stale maps.
#[derive(Debug, Default)]
pub struct SourceUnitStore {
    units: DashMap<Url, Arc<SourceUnit>>,
}

impl SourceUnitStore {
    pub fn new() -> Self {
        Self {
            units: DashMap::new(),
        }
    }

    pub fn insert(&self, unit: SourceUnit) -> Arc<SourceUnit> {
        let uri = unit.uri().clone();
        let unit = Arc::new(unit);
        self.units.insert(uri, Arc::clone(&unit));
        unit
    }

    /// Evict a unit. Returns whether one existed.
    pub fn remove(&self, uri: &Url) -> bool {
        self.units.remove(uri).is_some()
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<SourceUnit>> {
        self.units.get(uri).map(|r| Arc::clone(&r))
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.units.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Snapshot of every unit, in unspecified order.
    pub fn all(&self) -> Vec<Arc<SourceUnit>> {
        self.units.iter().map(|r| Arc::clone(&r)).collect()
    }

    /// Composite URIs of every unit, sorted for deterministic iteration.
    pub fn all_uris(&self) -> Vec<Url> {
        let mut uris: Vec<Url> = self.units.iter().map(|r| r.key().clone()).collect();
        uris.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        uris
    }

    /// The unit owning the given virtual-document URI, if any.
    pub fn find_by_virtual_uri(&self, uri: &Url) -> Option<Arc<SourceUnit>> {
        self.units
            .iter()
            .find(|r| r.owns_virtual(uri))
            .map(|r| Arc::clone(&r))
    }

    /// Every virtual document in the store plus the global stub, sorted by
    /// URI. This is the bulk-export surface used to dump generated files.
    pub fn all_virtual_documents(&self) -> Vec<VirtualDocument> {
        let mut docs = vec![global_stub()];
        for unit in self.units.iter() {
            docs.extend(unit.virtual_documents().cloned());
        }
        docs.sort_by(|a, b| a.uri.as_str().cmp(b.uri.as_str()));
        docs
    }
}

/// The process-owned global stub document. Not tied to any unit; its
/// version is constant because its content never changes at runtime.
pub fn global_stub() -> VirtualDocument {
    VirtualDocument {
        uri: Url::parse(GLOBAL_STUB_URI).expect("static uri"),
        kind: VirtualDocKind::GlobalStub,
        project: TargetProject::Template,
        text: GLOBAL_STUB_TEXT.to_string(),
        version: 1,
    }
}

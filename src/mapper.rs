//! Coordinate translation façade over the unit store.
//!
//! Features talk to the `Mapper` instead of individual units: it resolves
//! which unit owns a document, routes the query to the right range map,
//! and returns owned results so callers never borrow into the store.
//! Every conversion tolerates zero matches and out-of-range input by
//! returning an empty vector.

use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use crate::capabilities::CapabilityKind;
use crate::document::{
    SourceUnit, SourceUnitStore, TargetProject, VirtualDocKind, VirtualDocument,
};
use crate::mapping::{expand_teleports, MappingEntry, RangeMap, Span};
use crate::service::{MarkupService, ScriptService, StyleService};

/// A translated location in a virtual document. The entry is cloned out of
/// the map so the hit outlives the store lookup that produced it.
#[derive(Debug, Clone)]
pub struct VirtualHit {
    pub uri: Url,
    pub project: TargetProject,
    pub span: Span,
    pub entry: MappingEntry,
}

/// A translated location back in a composite document.
#[derive(Debug, Clone)]
pub struct SourceHit {
    pub uri: Url,
    pub span: Span,
    pub entry: MappingEntry,
}

/// The store plus the per-language service handles features route through.
/// Script analysis runs twice, once per target project.
pub struct Mapper {
    store: Arc<SourceUnitStore>,
    template_service: Arc<dyn ScriptService + Send + Sync>,
    script_service: Arc<dyn ScriptService + Send + Sync>,
    style_service: Arc<dyn StyleService + Send + Sync>,
    markup_service: Arc<dyn MarkupService + Send + Sync>,
}

impl Mapper {
    pub fn new(
        store: Arc<SourceUnitStore>,
        template_service: Arc<dyn ScriptService + Send + Sync>,
        script_service: Arc<dyn ScriptService + Send + Sync>,
        style_service: Arc<dyn StyleService + Send + Sync>,
        markup_service: Arc<dyn MarkupService + Send + Sync>,
    ) -> Self {
        Self {
            store,
            template_service,
            script_service,
            style_service,
            markup_service,
        }
    }

    pub fn store(&self) -> &Arc<SourceUnitStore> {
        &self.store
    }

    pub fn script_service(&self, project: TargetProject) -> &Arc<dyn ScriptService + Send + Sync> {
        match project {
            TargetProject::Template => &self.template_service,
            TargetProject::Script => &self.script_service,
        }
    }

    pub fn style_service(&self) -> &Arc<dyn StyleService + Send + Sync> {
        &self.style_service
    }

    pub fn markup_service(&self) -> &Arc<dyn MarkupService + Send + Sync> {
        &self.markup_service
    }

    pub fn get_source_unit(&self, uri: &Url) -> Option<Arc<SourceUnit>> {
        self.store.get(uri)
    }

    pub fn all_source_units(&self) -> Vec<Arc<SourceUnit>> {
        self.store.all()
    }

    /// The composite document owning the given virtual document, if any.
    pub fn composite_uri_for(&self, virtual_uri: &Url) -> Option<Url> {
        self.store
            .find_by_virtual_uri(virtual_uri)
            .map(|unit| unit.uri().clone())
    }

    /// Composite script-region offsets to the script-project and
    /// template-project documents.
    pub fn script_to(
        &self,
        composite: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<VirtualHit> {
        let Some(unit) = self.store.get(composite) else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        if let Some(doc) = unit.script_doc() {
            forward_hits(doc, unit.script_map(), query, cap, &mut hits);
        }
        if let Some(doc) = unit.template_doc() {
            forward_hits(doc, unit.template_map(), query, cap, &mut hits);
        }
        hits
    }

    /// Script-project or template-project document offsets back to the
    /// composite document.
    pub fn script_from(
        &self,
        virtual_uri: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<SourceHit> {
        self.from_virtual(virtual_uri, query, cap, VirtualDocKind::Script)
    }

    /// Composite style-region offsets to the style documents.
    pub fn style_to(
        &self,
        composite: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<VirtualHit> {
        let Some(unit) = self.store.get(composite) else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        for (doc, map) in unit.style_docs().iter().zip(unit.style_maps()) {
            forward_hits(doc, map, query, cap, &mut hits);
        }
        hits
    }

    /// Style document offsets back to the composite document.
    pub fn style_from(
        &self,
        virtual_uri: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<SourceHit> {
        self.from_virtual(virtual_uri, query, cap, VirtualDocKind::Style)
    }

    /// Composite markup-region offsets to the markup document.
    pub fn markup_to(
        &self,
        composite: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<VirtualHit> {
        let Some(unit) = self.store.get(composite) else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        if let Some(doc) = unit.markup_doc() {
            forward_hits(doc, unit.markup_map(), query, cap, &mut hits);
        }
        hits
    }

    /// Markup document offsets back to the composite document.
    pub fn markup_from(
        &self,
        virtual_uri: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
    ) -> Vec<SourceHit> {
        self.from_virtual(virtual_uri, query, cap, VirtualDocKind::Markup)
    }

    /// Transitive teleport closure starting at a span in a virtual
    /// document. Empty unless the document carries teleports (only the
    /// template-project document does).
    pub fn teleports(&self, virtual_uri: &Url, start: Span, cap: CapabilityKind) -> Vec<Span> {
        let Some(unit) = self.store.find_by_virtual_uri(virtual_uri) else {
            return Vec::new();
        };
        if unit.template_doc().map(|d| &d.uri) != Some(virtual_uri) {
            return Vec::new();
        }
        expand_teleports(virtual_uri, start, cap, unit.teleports())
    }

    fn from_virtual(
        &self,
        virtual_uri: &Url,
        query: Span,
        cap: Option<CapabilityKind>,
        kind: VirtualDocKind,
    ) -> Vec<SourceHit> {
        let Some(unit) = self.store.find_by_virtual_uri(virtual_uri) else {
            return Vec::new();
        };
        let Some(doc) = unit.doc_for_virtual(virtual_uri) else {
            return Vec::new();
        };
        if doc.kind != kind {
            return Vec::new();
        }
        let Some(map) = unit.map_for_virtual(virtual_uri) else {
            return Vec::new();
        };
        let mapped = match cap {
            Some(cap) => map.mapped_to_source_with(query, cap),
            None => map.mapped_to_source(query),
        };
        mapped
            .into_iter()
            .map(|hit| SourceHit {
                uri: unit.uri().clone(),
                span: hit.span,
                entry: hit.entry.clone(),
            })
            .collect()
    }
}

fn forward_hits(
    doc: &VirtualDocument,
    map: &RangeMap,
    query: Span,
    cap: Option<CapabilityKind>,
    out: &mut Vec<VirtualHit>,
) {
    let mapped = match cap {
        Some(cap) => map.source_to_mapped_with(query, cap),
        None => map.source_to_mapped(query),
    };
    out.extend(mapped.into_iter().map(|hit| VirtualHit {
        uri: doc.uri.clone(),
        project: doc.project,
        span: hit.span,
        entry: hit.entry.clone(),
    }));
}

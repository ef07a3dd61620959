//! Cross-region reference search.
//!
//! Mirrors the rename traversal: run the service query in virtual
//! coordinates, expand every result through teleport links, and translate
//! the final location set back to composite coordinates. Results in plain
//! files pass through unchanged.

use tower_lsp::lsp_types::Url;

use crate::capabilities::CapabilityKind;
use crate::dedupe::{dedupe_doc_spans, VisitedSet};
use crate::mapper::Mapper;
use crate::mapping::Span;
use crate::service::{DocSpan, ScriptService, ServiceResult};

/// All references to the symbol at a composite-document offset, in
/// composite (or plain-file) coordinates.
pub fn find_references(
    mapper: &Mapper,
    composite: &Url,
    offset: usize,
) -> ServiceResult<Vec<DocSpan>> {
    let point = Span::point(offset);
    let mut raw = Vec::new();

    for hit in mapper.script_to(composite, point, Some(CapabilityKind::References)) {
        let service = mapper.script_service(hit.project);
        collect_with_teleports(mapper, service.as_ref(), &hit.uri, hit.span, &mut raw)?;
    }

    for hit in mapper.style_to(composite, point, Some(CapabilityKind::References)) {
        raw.extend(
            mapper
                .style_service()
                .find_references(&hit.uri, hit.span.start)?,
        );
    }

    let translated = raw
        .into_iter()
        .flat_map(|loc| translate_location(mapper, loc))
        .collect();
    Ok(dedupe_doc_spans(translated))
}

/// Query the service at the start location and at every teleport-linked
/// occurrence any result lands on, accumulating raw virtual-coordinate
/// locations. Visited-set keyed by `(document, offset)`.
fn collect_with_teleports(
    mapper: &Mapper,
    service: &dyn ScriptService,
    start_uri: &Url,
    start_span: Span,
    out: &mut Vec<DocSpan>,
) -> ServiceResult<()> {
    let mut visited = VisitedSet::new();
    let mut worklist = vec![(start_uri.clone(), start_span)];

    while let Some((uri, span)) = worklist.pop() {
        if !visited.insert(&uri, span) {
            continue;
        }
        for loc in service.find_references(&uri, span.start)? {
            for hop in mapper.teleports(&loc.uri, loc.span, CapabilityKind::References) {
                if !visited.contains(&loc.uri, hop) {
                    worklist.push((loc.uri.clone(), hop));
                }
            }
            out.push(loc);
        }
    }
    Ok(())
}

/// Map one virtual-coordinate location back to its composite document, or
/// pass it through untouched when no unit owns it (a plain file).
fn translate_location(mapper: &Mapper, loc: DocSpan) -> Vec<DocSpan> {
    let Some(unit) = mapper.store().find_by_virtual_uri(&loc.uri) else {
        return vec![loc];
    };
    let Some(map) = unit.map_for_virtual(&loc.uri) else {
        return Vec::new();
    };
    map.mapped_to_source_with(loc.span, CapabilityKind::References)
        .into_iter()
        .map(|hit| DocSpan::new(unit.uri().clone(), hit.span))
        .collect()
}

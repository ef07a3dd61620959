//! Whole-project diagnostic sweep.
//!
//! Walks every source unit, collects diagnostics from each per-language
//! service, translates them to composite coordinates, and emits them
//! through a sink callback as they arrive. The cancellation token is
//! polled between units: cancelling mid-sweep keeps everything already
//! emitted and reports the sweep as reduced-scope.

use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info};

use crate::capabilities::CapabilityKind;
use crate::document::{SourceUnit, TargetProject, VirtualDocument};
use crate::mapper::Mapper;
use crate::service::{ServiceDiagnostic, ServiceResult};

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VerifySummary {
    pub units_checked: usize,
    pub diagnostics_emitted: usize,
    /// True when cancellation stopped the sweep before every unit was
    /// checked. Emitted diagnostics still stand.
    pub reduced_scope: bool,
}

/// Check every unit in the store, emitting translated diagnostics through
/// `sink` keyed by composite document.
pub fn verify_all<F>(
    mapper: &Mapper,
    cancel: &CancellationToken,
    mut sink: F,
) -> ServiceResult<VerifySummary>
where
    F: FnMut(&Url, ServiceDiagnostic),
{
    let uris = mapper.store().all_uris();
    let total = uris.len();
    let mut summary = VerifySummary::default();

    for uri in uris {
        if cancel.is_cancelled() {
            summary.reduced_scope = true;
            info!(
                checked = summary.units_checked,
                total, "verify cancelled, partial results stand"
            );
            break;
        }
        let Some(unit) = mapper.get_source_unit(&uri) else {
            continue;
        };
        summary.diagnostics_emitted += verify_unit(mapper, &unit, &mut sink)?;
        summary.units_checked += 1;
    }

    debug!(
        units = summary.units_checked,
        diagnostics = summary.diagnostics_emitted,
        reduced_scope = summary.reduced_scope,
        "verify sweep finished"
    );
    Ok(summary)
}

fn verify_unit<F>(mapper: &Mapper, unit: &SourceUnit, sink: &mut F) -> ServiceResult<usize>
where
    F: FnMut(&Url, ServiceDiagnostic),
{
    let mut emitted = 0;

    if let Some(doc) = unit.script_doc() {
        let diags = mapper
            .script_service(TargetProject::Script)
            .diagnostics(&doc.uri)?;
        emitted += emit(unit, doc, diags, sink);
    }
    if let Some(doc) = unit.template_doc() {
        let diags = mapper
            .script_service(TargetProject::Template)
            .diagnostics(&doc.uri)?;
        emitted += emit(unit, doc, diags, sink);
    }
    for doc in unit.style_docs() {
        let diags = mapper.style_service().diagnostics(&doc.uri)?;
        emitted += emit(unit, doc, diags, sink);
    }
    if let Some(doc) = unit.markup_doc() {
        let diags = mapper.markup_service().diagnostics(&doc.uri)?;
        emitted += emit(unit, doc, diags, sink);
    }

    Ok(emitted)
}

/// Translate one document's diagnostics to composite coordinates and hand
/// them to the sink. Diagnostics in spans with no diagnostics-capable
/// mapping are dropped.
fn emit<F>(
    unit: &SourceUnit,
    doc: &VirtualDocument,
    diags: Vec<ServiceDiagnostic>,
    sink: &mut F,
) -> usize
where
    F: FnMut(&Url, ServiceDiagnostic),
{
    let Some(map) = unit.map_for_virtual(&doc.uri) else {
        return 0;
    };
    let mut emitted = 0;
    for diag in diags {
        // An identifier entry and the broad region entry can both contain
        // the span; one diagnostic must not be reported twice.
        let mut seen = std::collections::HashSet::new();
        for hit in map.mapped_to_source_with(diag.span, CapabilityKind::Diagnostics) {
            if !seen.insert(hit.span) {
                continue;
            }
            sink(
                unit.uri(),
                ServiceDiagnostic {
                    span: hit.span,
                    message: diag.message.clone(),
                    code: diag.code.clone(),
                },
            );
            emitted += 1;
        }
    }
    emitted
}

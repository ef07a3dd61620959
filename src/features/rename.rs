//! Cross-region rename.
//!
//! A rename starts at a composite-document offset, runs against the
//! per-language services in virtual coordinates, follows teleport links to
//! structurally linked occurrences, and translates every resulting edit
//! back into composite coordinates. Script analysis is consulted before
//! style analysis; the first non-empty answer wins.

use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::capabilities::CapabilityKind;
use crate::dedupe::{dedupe_text_edits, VisitedSet};
use crate::document::TargetProject;
use crate::mapper::Mapper;
use crate::mapping::Span;
use crate::service::{ScriptService, ServiceResult, TextEdit, WorkspaceEdits};

/// The span the editor should highlight for a rename at `offset`, if the
/// position is renameable at all.
pub fn prepare_rename(mapper: &Mapper, composite: &Url, offset: usize) -> Option<Span> {
    let point = Span::point(offset);
    if let Some(hit) = mapper
        .script_to(composite, point, Some(CapabilityKind::RenameIn))
        .into_iter()
        .next()
    {
        return Some(hit.entry.source);
    }
    mapper
        .style_to(composite, point, Some(CapabilityKind::RenameIn))
        .into_iter()
        .next()
        .map(|hit| hit.entry.source)
}

/// Rename the symbol at a composite-document offset. `Ok(None)` means the
/// position is not renameable; an empty edit set never comes back as
/// `Some`.
pub fn do_rename(
    mapper: &Mapper,
    composite: &Url,
    offset: usize,
    new_name: &str,
) -> ServiceResult<Option<WorkspaceEdits>> {
    let point = Span::point(offset);

    // Both script-project and template-project answers contribute: the
    // script project sees the plain script document, the template project
    // additionally sees the render stub whose teleports reach markup.
    let mut script_merged = WorkspaceEdits::new();
    for hit in mapper.script_to(composite, point, Some(CapabilityKind::RenameIn)) {
        let name = match &hit.entry.before_rename {
            Some(transform) => transform.apply(new_name),
            None => new_name.to_string(),
        };
        let service = mapper.script_service(hit.project);
        if let Some(answer) =
            rename_with_teleports(mapper, service.as_ref(), &hit.uri, hit.span, &name)?
        {
            script_merged.merge(answer);
        }
    }
    if !script_merged.is_empty() {
        let translated = translate_edits(mapper, script_merged);
        if !translated.is_empty() {
            debug!(
                uri = %composite,
                edits = translated.edit_count(),
                "rename resolved through script analysis"
            );
            return Ok(Some(translated));
        }
    }

    for hit in mapper.style_to(composite, point, Some(CapabilityKind::RenameIn)) {
        let answer = mapper
            .style_service()
            .do_rename(&hit.uri, hit.span.start, new_name)?;
        if let Some(answer) = answer {
            let translated = translate_edits(mapper, answer);
            if !translated.is_empty() {
                debug!(
                    uri = %composite,
                    edits = translated.edit_count(),
                    "rename resolved through style analysis"
                );
                return Ok(Some(translated));
            }
        }
    }

    Ok(None)
}

/// Module-specifier edits needed when a composite file itself is renamed.
/// The script service answers for the script-project document; results are
/// translated back like any other edit set.
pub fn edits_for_file_rename(
    mapper: &Mapper,
    old_uri: &Url,
    new_uri: &Url,
) -> ServiceResult<Option<WorkspaceEdits>> {
    let Some(unit) = mapper.get_source_unit(old_uri) else {
        return Ok(None);
    };
    let Some(script_doc) = unit.script_doc() else {
        return Ok(None);
    };
    let Some(suffix) = script_doc.uri.as_str().strip_prefix(old_uri.as_str()) else {
        return Ok(None);
    };
    let Ok(new_virtual) = Url::parse(&format!("{}{suffix}", new_uri.as_str())) else {
        return Ok(None);
    };

    let answer = mapper
        .script_service(TargetProject::Script)
        .edits_for_file_rename(&script_doc.uri, &new_virtual)?;
    Ok(answer
        .map(|edits| translate_edits(mapper, edits))
        .filter(|edits| !edits.is_empty()))
}

/// Run the service rename at the start location, then keep re-running it
/// at every teleport-linked occurrence an edit lands on. The visited set is
/// keyed by `(document, offset)`, so each location is asked exactly once
/// and cyclic teleport graphs terminate.
fn rename_with_teleports(
    mapper: &Mapper,
    service: &dyn ScriptService,
    start_uri: &Url,
    start_span: Span,
    name: &str,
) -> ServiceResult<Option<WorkspaceEdits>> {
    let mut merged = WorkspaceEdits::new();
    let mut visited = VisitedSet::new();
    let mut worklist = vec![(start_uri.clone(), start_span, name.to_string())];

    while let Some((uri, span, name)) = worklist.pop() {
        if !visited.insert(&uri, span) {
            continue;
        }
        let Some(answer) = service.do_rename(&uri, span.start, &name)? else {
            continue;
        };

        for (doc_uri, doc_edits) in &answer.changes {
            let Some(unit) = mapper.store().find_by_virtual_uri(doc_uri) else {
                continue;
            };
            if unit.template_doc().map(|d| &d.uri) != Some(doc_uri) {
                continue;
            }
            for edit in doc_edits {
                for hop in unit
                    .teleports()
                    .find_with(edit.span, CapabilityKind::RenameIn)
                {
                    if visited.contains(doc_uri, hop.span) {
                        continue;
                    }
                    let hop_name = match &hop.entry.rename_transform {
                        Some(transform) => transform.apply(&name),
                        None => name.clone(),
                    };
                    worklist.push((doc_uri.clone(), hop.span, hop_name));
                }
            }
        }

        merged.merge(answer);
    }

    if merged.is_empty() {
        Ok(None)
    } else {
        Ok(Some(merged))
    }
}

/// Translate a service edit set from virtual coordinates back to composite
/// coordinates. Edits in documents no unit owns are plain-file edits and
/// pass through unchanged; edits whose span maps nowhere are dropped.
fn translate_edits(mapper: &Mapper, merged: WorkspaceEdits) -> WorkspaceEdits {
    let mut out = WorkspaceEdits::new();

    for (uri, edits) in merged.changes {
        let Some(unit) = mapper.store().find_by_virtual_uri(&uri) else {
            for edit in edits {
                out.push(uri.clone(), edit);
            }
            continue;
        };
        let Some(map) = unit.map_for_virtual(&uri) else {
            continue;
        };
        for edit in edits {
            for hit in map.mapped_to_source_with(edit.span, CapabilityKind::RenameOut) {
                let text = match &hit.entry.apply_rename {
                    Some(transform) => transform.apply(&edit.new_text),
                    None => edit.new_text.clone(),
                };
                out.push(unit.uri().clone(), TextEdit::new(hit.span, text));
            }
        }
    }

    for edits in out.changes.values_mut() {
        *edits = dedupe_text_edits(std::mem::take(edits));
    }
    out.changes.retain(|_, edits| !edits.is_empty());
    out
}

use std::collections::HashMap;
use std::sync::Arc;

use expect_test::expect;
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::Url;

use polydoc::features::{references, rename, verify};
use polydoc::settings::Settings;
use polydoc::{
    DocSpan, Mapper, MarkupService, ProjectHost, ScriptService, ServiceDiagnostic, ServiceError,
    ServiceResult, SourceUnit, SourceUnitStore, Span, StyleService, TargetProject, TextEdit,
    Workspace, WorkspaceEdits,
};

// ---------------------------------------------------------------------------
// Textual per-language services
// ---------------------------------------------------------------------------
//
// Stand-ins for real language analysis: rename and reference search are
// whole-word textual matches confined to the queried document, which is
// exactly the visibility a single-module analysis would have. Diagnostics
// flag every occurrence of the identifier `oops`.

fn word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn word_at(text: &str, offset: usize) -> Option<(Span, String)> {
    if offset > text.len() {
        return None;
    }
    let mut start = offset;
    while start > 0 && text[..start].chars().next_back().map(word_char) == Some(true) {
        start -= text[..start].chars().next_back().unwrap().len_utf8();
    }
    let mut end = offset;
    while let Some(c) = text[end..].chars().next() {
        if !word_char(c) {
            break;
        }
        end += c.len_utf8();
    }
    if start == end {
        return None;
    }
    Some((Span::new(start, end), text[start..end].to_string()))
}

fn whole_word_occurrences(text: &str, word: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    for (i, _) in text.match_indices(word) {
        let before_ok = text[..i].chars().next_back().map(word_char) != Some(true);
        let after_ok = text[i + word.len()..].chars().next().map(word_char) != Some(true);
        if before_ok && after_ok {
            spans.push(Span::new(i, i + word.len()));
        }
    }
    spans
}

struct TextualScriptService {
    store: Arc<SourceUnitStore>,
    project: TargetProject,
}

impl TextualScriptService {
    fn doc_text(&self, uri: &Url) -> Option<String> {
        let unit = self.store.find_by_virtual_uri(uri)?;
        let doc = unit.doc_for_virtual(uri)?;
        if doc.project != self.project {
            return None;
        }
        Some(doc.text.clone())
    }
}

impl ScriptService for TextualScriptService {
    fn find_references(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(Vec::new());
        };
        let Some((_, word)) = word_at(&text, offset) else {
            return Ok(Vec::new());
        };
        Ok(whole_word_occurrences(&text, &word)
            .into_iter()
            .map(|span| DocSpan::new(uri.clone(), span))
            .collect())
    }

    fn definition_at(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(Vec::new());
        };
        let Some((_, word)) = word_at(&text, offset) else {
            return Ok(Vec::new());
        };
        Ok(whole_word_occurrences(&text, &word)
            .into_iter()
            .take(1)
            .map(|span| DocSpan::new(uri.clone(), span))
            .collect())
    }

    fn do_rename(
        &self,
        uri: &Url,
        offset: usize,
        new_name: &str,
    ) -> ServiceResult<Option<WorkspaceEdits>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(None);
        };
        let Some((_, word)) = word_at(&text, offset) else {
            return Ok(None);
        };
        let mut edits = WorkspaceEdits::new();
        for span in whole_word_occurrences(&text, &word) {
            edits.push(uri.clone(), TextEdit::new(span, new_name));
        }
        Ok(Some(edits))
    }

    fn diagnostics(&self, uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(Vec::new());
        };
        Ok(whole_word_occurrences(&text, "oops")
            .into_iter()
            .map(|span| ServiceDiagnostic {
                span,
                message: "unknown identifier: oops".to_string(),
                code: Some("E001".to_string()),
            })
            .collect())
    }

    fn edits_for_file_rename(
        &self,
        _old_uri: &Url,
        new_uri: &Url,
    ) -> ServiceResult<Option<WorkspaceEdits>> {
        // A module move rewrites the specifier in the (plain) importer.
        let mut edits = WorkspaceEdits::new();
        edits.push(
            Url::parse("file:///importer.ts").unwrap(),
            TextEdit::new(Span::new(20, 40), new_uri.to_string()),
        );
        Ok(Some(edits))
    }
}

struct TextualStyleService {
    store: Arc<SourceUnitStore>,
}

impl TextualStyleService {
    fn doc_text(&self, uri: &Url) -> Option<String> {
        let unit = self.store.find_by_virtual_uri(uri)?;
        Some(unit.doc_for_virtual(uri)?.text.clone())
    }
}

impl StyleService for TextualStyleService {
    fn do_rename(
        &self,
        uri: &Url,
        offset: usize,
        new_name: &str,
    ) -> ServiceResult<Option<WorkspaceEdits>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(None);
        };
        let Some((_, word)) = word_at(&text, offset) else {
            return Ok(None);
        };
        let mut edits = WorkspaceEdits::new();
        for span in whole_word_occurrences(&text, &word) {
            edits.push(uri.clone(), TextEdit::new(span, new_name));
        }
        Ok(Some(edits))
    }

    fn find_references(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>> {
        let Some(text) = self.doc_text(uri) else {
            return Ok(Vec::new());
        };
        let Some((_, word)) = word_at(&text, offset) else {
            return Ok(Vec::new());
        };
        Ok(whole_word_occurrences(&text, &word)
            .into_iter()
            .map(|span| DocSpan::new(uri.clone(), span))
            .collect())
    }

    fn diagnostics(&self, _uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>> {
        Ok(Vec::new())
    }
}

struct SilentMarkupService;

impl MarkupService for SilentMarkupService {
    fn diagnostics(&self, _uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>> {
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DOC_A: &str = "<script>let count = 1;\nlet MyWidget = 0;</script>\n<template><p>{{ count }}</p><my-widget></my-widget></template>\n<style>.primary { color: red; }</style>\n";

fn mapper_with(docs: &[(&str, &str)]) -> Mapper {
    let store = Arc::new(SourceUnitStore::new());
    let settings = Settings::default();
    for (uri, text) in docs {
        store.insert(SourceUnit::new(
            Url::parse(uri).unwrap(),
            text.to_string(),
            &settings.generation,
        ));
    }
    Mapper::new(
        Arc::clone(&store),
        Arc::new(TextualScriptService {
            store: Arc::clone(&store),
            project: TargetProject::Template,
        }),
        Arc::new(TextualScriptService {
            store: Arc::clone(&store),
            project: TargetProject::Script,
        }),
        Arc::new(TextualStyleService {
            store: Arc::clone(&store),
        }),
        Arc::new(SilentMarkupService),
    )
}

/// Render a span as its containing line with the span bracketed, so
/// snapshots stay readable without hand-computed offsets.
fn mark_span(text: &str, span: Span, replacement: Option<&str>) -> String {
    let line_start = text[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[span.end..]
        .find('\n')
        .map(|i| span.end + i)
        .unwrap_or(text.len());
    let marked = match replacement {
        Some(new_text) => format!("[{} -> {}]", &text[span.start..span.end], new_text),
        None => format!("[{}]", &text[span.start..span.end]),
    };
    format!(
        "{}{}{}",
        &text[line_start..span.start],
        marked,
        &text[span.end..line_end]
    )
}

fn short_uri(uri: &Url) -> String {
    uri.as_str().trim_start_matches("file:///").to_string()
}

/// Apply edits to a document, back to front so earlier spans stay valid.
fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut edits = edits.to_vec();
    edits.sort_by_key(|e| std::cmp::Reverse(e.span.start));
    let mut out = text.to_string();
    for edit in edits {
        out.replace_range(edit.span.start..edit.span.end, &edit.new_text);
    }
    out
}

fn format_edits(mapper: &Mapper, edits: &WorkspaceEdits) -> String {
    let mut lines: Vec<String> = Vec::new();
    for (uri, doc_edits) in &edits.changes {
        match mapper.get_source_unit(uri) {
            Some(unit) => {
                for edit in doc_edits {
                    lines.push(format!(
                        "{}: {}",
                        short_uri(uri),
                        mark_span(unit.text(), edit.span, Some(&edit.new_text))
                    ));
                }
            }
            None => {
                for edit in doc_edits {
                    lines.push(format!(
                        "{}: {}..{} -> {}",
                        short_uri(uri),
                        edit.span.start,
                        edit.span.end,
                        edit.new_text
                    ));
                }
            }
        }
    }
    lines.sort();
    lines.join("\n")
}

fn format_locations(mapper: &Mapper, locations: &[DocSpan]) -> String {
    let mut lines: Vec<String> = locations
        .iter()
        .map(|loc| match mapper.get_source_unit(&loc.uri) {
            Some(unit) => format!(
                "{}: {}",
                short_uri(&loc.uri),
                mark_span(unit.text(), loc.span, None)
            ),
            None => format!(
                "{}: {}..{}",
                short_uri(&loc.uri),
                loc.span.start,
                loc.span.end
            ),
        })
        .collect();
    lines.sort();
    lines.dedup();
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Rename
// ---------------------------------------------------------------------------

#[test]
fn rename_crosses_from_script_into_markup() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "total")
        .unwrap()
        .unwrap();

    expect![[r#"
        a.poly: <script>let [count -> total] = 1;
        a.poly: <template><p>{{ [count -> total] }}</p><my-widget></my-widget></template>"#]]
    .assert_eq(&format_edits(&mapper, &edits));
}

#[test]
fn rename_is_confined_to_the_edited_document() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A), ("file:///b.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "total")
        .unwrap()
        .unwrap();

    let b = Url::parse("file:///b.poly").unwrap();
    assert!(!edits.changes.contains_key(&b));
    assert_eq!(edits.changes.len(), 1);
}

#[test]
fn component_tag_rename_converts_case_both_ways() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("my-widget").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "new-widget")
        .unwrap()
        .unwrap();

    expect![[r#"
        a.poly: <template><p>{{ count }}</p><[my-widget -> new-widget]></my-widget></template>
        a.poly: <template><p>{{ count }}</p><my-widget></[my-widget -> new-widget]></template>
        a.poly: let [MyWidget -> NewWidget] = 0;</script>"#]]
    .assert_eq(&format_edits(&mapper, &edits));
}

#[test]
fn component_tag_rename_leaves_no_stale_closing_tag() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("my-widget").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "new-widget")
        .unwrap()
        .unwrap();

    let renamed = apply_edits(DOC_A, &edits.changes[&uri]);
    assert!(!renamed.contains("my-widget"));
    assert!(renamed.contains("<new-widget></new-widget>"));
    assert!(renamed.contains("let NewWidget = 0;"));
}

#[test]
fn rename_started_at_the_closing_tag_works_too() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("</my-widget>").unwrap() + 2;

    let edits = rename::do_rename(&mapper, &uri, offset, "new-widget")
        .unwrap()
        .unwrap();

    let renamed = apply_edits(DOC_A, &edits.changes[&uri]);
    assert!(!renamed.contains("my-widget"));
    assert!(renamed.contains("<new-widget></new-widget>"));
}

#[test]
fn rename_falls_back_to_style_analysis() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("primary").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "accent")
        .unwrap()
        .unwrap();

    expect![[r#"a.poly: <style>.[primary -> accent] { color: red; }</style>"#]]
        .assert_eq(&format_edits(&mapper, &edits));
}

#[test]
fn rename_outside_any_region_is_none() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    // The `<script>` opening tag itself is not a mapped range.
    let result = rename::do_rename(&mapper, &uri, 2, "nope").unwrap();
    assert!(result.is_none());
}

#[test]
fn prepare_rename_reports_the_source_token() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let span = rename::prepare_rename(&mapper, &uri, offset).unwrap();
    assert_eq!(&DOC_A[span.start..span.end], "count");
    assert!(rename::prepare_rename(&mapper, &uri, 2).is_none());
}

#[test]
fn file_rename_edits_pass_through_plain_files() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let old = Url::parse("file:///a.poly").unwrap();
    let new = Url::parse("file:///c.poly").unwrap();

    let edits = rename::edits_for_file_rename(&mapper, &old, &new)
        .unwrap()
        .unwrap();

    expect![[r#"importer.ts: 20..40 -> file:///c.poly.script.ts"#]]
        .assert_eq(&format_edits(&mapper, &edits));
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

#[test]
fn references_cross_regions() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let locations = references::find_references(&mapper, &uri, offset).unwrap();

    expect![[r#"
        a.poly: <script>let [count] = 1;
        a.poly: <template><p>{{ [count] }}</p><my-widget></my-widget></template>"#]]
    .assert_eq(&format_locations(&mapper, &locations));
}

#[test]
fn references_from_markup_side_reach_the_declaration() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.rfind("count").unwrap();

    let locations = references::find_references(&mapper, &uri, offset).unwrap();

    expect![[r#"
        a.poly: <script>let [count] = 1;
        a.poly: <template><p>{{ [count] }}</p><my-widget></my-widget></template>"#]]
    .assert_eq(&format_locations(&mapper, &locations));
}

// ---------------------------------------------------------------------------
// Verify sweep
// ---------------------------------------------------------------------------

const DOC_V: &str = "<script>let oops = 1;</script>\n<template>{{ oops }}</template>\n";

#[test]
fn verify_translates_diagnostics_to_composite_coordinates() {
    let mapper = mapper_with(&[("file:///v.poly", DOC_V)]);
    let cancel = CancellationToken::new();

    let mut reported: Vec<String> = Vec::new();
    let summary = verify::verify_all(&mapper, &cancel, |uri, diag| {
        let unit = mapper.get_source_unit(uri).unwrap();
        reported.push(format!(
            "{}: {}",
            short_uri(uri),
            mark_span(unit.text(), diag.span, None)
        ));
    })
    .unwrap();

    assert_eq!(summary.units_checked, 1);
    assert!(!summary.reduced_scope);
    assert_eq!(summary.diagnostics_emitted, 3);

    reported.sort();
    reported.dedup();
    expect![[r#"
        v.poly: <script>let [oops] = 1;</script>
        v.poly: <template>{{ [oops] }}</template>"#]]
    .assert_eq(&reported.join("\n"));
}

#[test]
fn cancelled_verify_keeps_partial_results() {
    let mapper = mapper_with(&[("file:///v.poly", DOC_V)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut count = 0usize;
    let summary = verify::verify_all(&mapper, &cancel, |_, _| count += 1).unwrap();

    assert!(summary.reduced_scope);
    assert_eq!(summary.units_checked, 0);
    assert_eq!(count, 0);
}

// ---------------------------------------------------------------------------
// Service failure propagation
// ---------------------------------------------------------------------------

/// Answers every request with the same error, the way a crashed analysis
/// backend would. The core must relay it unmodified.
struct FailingScriptService;

const BACKEND_DOWN: &str = "analysis backend unavailable";

impl ScriptService for FailingScriptService {
    fn find_references(&self, _uri: &Url, _offset: usize) -> ServiceResult<Vec<DocSpan>> {
        Err(ServiceError::Script(BACKEND_DOWN.to_string()))
    }

    fn definition_at(&self, _uri: &Url, _offset: usize) -> ServiceResult<Vec<DocSpan>> {
        Err(ServiceError::Script(BACKEND_DOWN.to_string()))
    }

    fn do_rename(
        &self,
        _uri: &Url,
        _offset: usize,
        _new_name: &str,
    ) -> ServiceResult<Option<WorkspaceEdits>> {
        Err(ServiceError::Script(BACKEND_DOWN.to_string()))
    }

    fn diagnostics(&self, _uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>> {
        Err(ServiceError::Script(BACKEND_DOWN.to_string()))
    }

    fn edits_for_file_rename(
        &self,
        _old_uri: &Url,
        _new_uri: &Url,
    ) -> ServiceResult<Option<WorkspaceEdits>> {
        Err(ServiceError::Script(BACKEND_DOWN.to_string()))
    }
}

fn mapper_with_failing_script(docs: &[(&str, &str)]) -> Mapper {
    let store = Arc::new(SourceUnitStore::new());
    let settings = Settings::default();
    for (uri, text) in docs {
        store.insert(SourceUnit::new(
            Url::parse(uri).unwrap(),
            text.to_string(),
            &settings.generation,
        ));
    }
    Mapper::new(
        Arc::clone(&store),
        Arc::new(FailingScriptService),
        Arc::new(FailingScriptService),
        Arc::new(TextualStyleService {
            store: Arc::clone(&store),
        }),
        Arc::new(SilentMarkupService),
    )
}

fn assert_backend_down(err: ServiceError) {
    match err {
        ServiceError::Script(message) => assert_eq!(message, BACKEND_DOWN),
        other => panic!("expected a script service error, got {other:?}"),
    }
}

#[test]
fn rename_surfaces_script_service_errors_unmodified() {
    let mapper = mapper_with_failing_script(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let err = rename::do_rename(&mapper, &uri, offset, "total").unwrap_err();
    assert_backend_down(err);
}

#[test]
fn references_surface_script_service_errors_unmodified() {
    let mapper = mapper_with_failing_script(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();

    let err = references::find_references(&mapper, &uri, offset).unwrap_err();
    assert_backend_down(err);
}

#[test]
fn file_rename_surfaces_script_service_errors_unmodified() {
    let mapper = mapper_with_failing_script(&[("file:///a.poly", DOC_A)]);
    let old = Url::parse("file:///a.poly").unwrap();
    let new = Url::parse("file:///c.poly").unwrap();

    let err = rename::edits_for_file_rename(&mapper, &old, &new).unwrap_err();
    assert_backend_down(err);
}

#[test]
fn verify_aborts_on_service_error_without_emitting() {
    let mapper = mapper_with_failing_script(&[("file:///v.poly", DOC_V)]);
    let cancel = CancellationToken::new();

    let mut emitted = 0usize;
    let err = verify::verify_all(&mapper, &cancel, |_, _| emitted += 1).unwrap_err();

    assert_backend_down(err);
    // The script service fails before anything reaches the sink.
    assert_eq!(emitted, 0);
}

#[test]
fn style_rename_still_works_when_script_analysis_is_down_elsewhere() {
    // A style-region rename never consults the script service, so it is
    // unaffected by a script backend failure.
    let mapper = mapper_with_failing_script(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("primary").unwrap();

    let edits = rename::do_rename(&mapper, &uri, offset, "accent")
        .unwrap()
        .unwrap();
    assert_eq!(edits.edit_count(), 1);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn removed_unit_answers_nothing() {
    let mapper = mapper_with(&[("file:///a.poly", DOC_A)]);
    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();
    assert!(rename::do_rename(&mapper, &uri, offset, "total")
        .unwrap()
        .is_some());

    mapper.store().remove(&uri);

    assert!(rename::do_rename(&mapper, &uri, offset, "total")
        .unwrap()
        .is_none());
    assert!(references::find_references(&mapper, &uri, offset)
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Workspace refresh driving the mapper
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MapHost {
    version: u64,
    files: HashMap<Url, (String, String)>,
}

impl MapHost {
    fn set(&mut self, uri: &str, text: &str) {
        self.version += 1;
        self.files.insert(
            Url::parse(uri).unwrap(),
            (self.version.to_string(), text.to_string()),
        );
    }
}

impl ProjectHost for MapHost {
    fn project_version(&self) -> Option<String> {
        Some(self.version.to_string())
    }

    fn file_uris(&self) -> Vec<Url> {
        let mut uris: Vec<Url> = self.files.keys().cloned().collect();
        uris.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        uris
    }

    fn file_version(&self, uri: &Url) -> Option<String> {
        self.files.get(uri).map(|(v, _)| v.clone())
    }

    fn file_text(&self, uri: &Url) -> Option<String> {
        self.files.get(uri).map(|(_, t)| t.clone())
    }
}

#[test]
fn refreshed_workspace_feeds_the_mapper() {
    let mut host = MapHost::default();
    host.set("file:///a.poly", DOC_A);
    let mut workspace = Workspace::new(host, Settings::default());
    workspace.refresh(true);

    let store = Arc::clone(workspace.store());
    let mapper = Mapper::new(
        Arc::clone(&store),
        Arc::new(TextualScriptService {
            store: Arc::clone(&store),
            project: TargetProject::Template,
        }),
        Arc::new(TextualScriptService {
            store: Arc::clone(&store),
            project: TargetProject::Script,
        }),
        Arc::new(TextualStyleService {
            store: Arc::clone(&store),
        }),
        Arc::new(SilentMarkupService),
    );

    let uri = Url::parse("file:///a.poly").unwrap();
    let offset = DOC_A.find("count").unwrap();
    let edits = rename::do_rename(&mapper, &uri, offset, "total")
        .unwrap()
        .unwrap();
    assert_eq!(edits.changes.len(), 1);

    // Versions moved exactly once per project for the initial batch, and
    // an identical refresh moves nothing.
    let script = workspace.versions().version(TargetProject::Script);
    workspace.refresh(true);
    assert_eq!(workspace.versions().version(TargetProject::Script), script);
}

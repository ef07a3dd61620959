//! One composite document's virtual documents and maps.
//!
//! A `SourceUnit` owns everything derived from a single composite file:
//! the generated per-region virtual documents, the range maps tying their
//! coordinates back to the composite text, and the teleport map linking
//! structurally-related spots inside the generated script. Regeneration is
//! a pure function of the composite text: identical input always produces
//! byte-identical documents and equal maps. Maps are replaced wholesale on
//! every update, never mutated in place.

use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::capabilities::{Capabilities, RenameCapability, RenameTransform};
use crate::document::region::{
    extract_regions, scan_declarations, scan_markup_refs, MarkupRefKind, Region, RegionKind,
};
use crate::document::text::LineIndex;
use crate::mapping::{MappingEntry, MappingMode, RangeMap, Span, TeleportEntry, TeleportMap};
use crate::settings::GenerationSettings;

/// Which analysis project a virtual document feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetProject {
    /// The project that sees generated render stubs (markup-aware).
    Template,
    /// The script-only project.
    Script,
}

/// What a virtual document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualDocKind {
    Script,
    Markup,
    Style,
    GlobalStub,
}

/// Generated text for one embedded region, handed to a per-language
/// service. The version increments only when regenerated content differs.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualDocument {
    pub uri: Url,
    pub kind: VirtualDocKind,
    pub project: TargetProject,
    pub text: String,
    pub version: i32,
}

/// What `SourceUnit::update` observed, used by the caller to decide which
/// project version counters to bump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub script_updated: bool,
    pub markup_updated: bool,
}

/// Everything regenerated from one pass over the composite text.
#[derive(Debug, Default)]
struct Generated {
    script: Option<(String, RangeMap)>,
    template: Option<(String, RangeMap)>,
    markup: Option<(String, String, RangeMap)>, // lang, text, map
    styles: Vec<(String, String, RangeMap)>,    // lang, text, map
    teleports: TeleportMap,
}

#[derive(Debug, Clone)]
pub struct SourceUnit {
    uri: Url,
    text: String,
    line_index: LineIndex,
    script_doc: Option<VirtualDocument>,
    template_doc: Option<VirtualDocument>,
    markup_doc: Option<VirtualDocument>,
    style_docs: Vec<VirtualDocument>,
    script_map: RangeMap,
    template_map: RangeMap,
    markup_map: RangeMap,
    style_maps: Vec<RangeMap>,
    teleports: TeleportMap,
}

impl SourceUnit {
    pub fn new(uri: Url, text: String, settings: &GenerationSettings) -> Self {
        let generated = generate(&text, &settings.default_style_lang);
        let mut unit = Self {
            line_index: LineIndex::new(text.clone()),
            uri,
            text,
            script_doc: None,
            template_doc: None,
            markup_doc: None,
            style_docs: Vec::new(),
            script_map: RangeMap::default(),
            template_map: RangeMap::default(),
            markup_map: RangeMap::default(),
            style_maps: Vec::new(),
            teleports: TeleportMap::default(),
        };
        unit.apply(generated, settings);
        unit
    }

    /// Regenerate from new composite text. The two booleans report whether
    /// the script-region and markup-region virtual documents actually
    /// changed, so unrelated edits don't re-version the other project.
    pub fn update(&mut self, new_text: String, settings: &GenerationSettings) -> UpdateOutcome {
        let generated = generate(&new_text, &settings.default_style_lang);
        self.text = new_text;
        self.line_index = LineIndex::new(self.text.clone());
        let outcome = self.apply(generated, settings);
        debug!(
            uri = %self.uri,
            script_updated = outcome.script_updated,
            markup_updated = outcome.markup_updated,
            "source unit updated"
        );
        outcome
    }

    /// Non-destructive update: regenerate into a fresh unit, carrying
    /// document versions forward. This is how the store path replaces a
    /// unit wholesale so a consumer mid-query never observes a
    /// half-updated map.
    pub fn updated_from(
        &self,
        new_text: String,
        settings: &GenerationSettings,
    ) -> (SourceUnit, UpdateOutcome) {
        let mut next = self.clone();
        let outcome = next.update(new_text, settings);
        (next, outcome)
    }

    fn apply(&mut self, generated: Generated, settings: &GenerationSettings) -> UpdateOutcome {
        let script_lang = &settings.script_lang;
        let script_updated = replace_doc(
            &mut self.script_doc,
            generated.script.as_ref().map(|(text, _)| {
                plain_doc(
                    virtual_uri(&self.uri, &format!("script.{script_lang}")),
                    VirtualDocKind::Script,
                    TargetProject::Script,
                    text.clone(),
                )
            }),
        );
        self.script_map = generated
            .script
            .map(|(_, map)| map)
            .unwrap_or_default();

        let _template_changed = replace_doc(
            &mut self.template_doc,
            generated.template.as_ref().map(|(text, _)| {
                plain_doc(
                    virtual_uri(&self.uri, &format!("template.{script_lang}")),
                    VirtualDocKind::Script,
                    TargetProject::Template,
                    text.clone(),
                )
            }),
        );
        self.template_map = generated
            .template
            .map(|(_, map)| map)
            .unwrap_or_default();

        let markup_updated = replace_doc(
            &mut self.markup_doc,
            generated.markup.as_ref().map(|(lang, text, _)| {
                plain_doc(
                    virtual_uri(&self.uri, &format!("markup.{lang}")),
                    VirtualDocKind::Markup,
                    TargetProject::Template,
                    text.clone(),
                )
            }),
        );
        self.markup_map = generated
            .markup
            .map(|(_, _, map)| map)
            .unwrap_or_default();

        let mut style_docs = Vec::with_capacity(generated.styles.len());
        let mut style_maps = Vec::with_capacity(generated.styles.len());
        for (i, (lang, text, map)) in generated.styles.into_iter().enumerate() {
            let uri = virtual_uri(&self.uri, &format!("style.{i}.{lang}"));
            let prior = self.style_docs.iter().find(|d| d.uri == uri);
            let version = match prior {
                Some(old) if old.text == text => old.version,
                Some(old) => old.version + 1,
                None => 1,
            };
            style_docs.push(VirtualDocument {
                uri,
                kind: VirtualDocKind::Style,
                project: TargetProject::Template,
                text,
                version,
            });
            style_maps.push(map);
        }
        self.style_docs = style_docs;
        self.style_maps = style_maps;
        self.teleports = generated.teleports;

        UpdateOutcome {
            script_updated,
            markup_updated,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn script_doc(&self) -> Option<&VirtualDocument> {
        self.script_doc.as_ref()
    }

    pub fn template_doc(&self) -> Option<&VirtualDocument> {
        self.template_doc.as_ref()
    }

    pub fn markup_doc(&self) -> Option<&VirtualDocument> {
        self.markup_doc.as_ref()
    }

    pub fn style_docs(&self) -> &[VirtualDocument] {
        &self.style_docs
    }

    pub fn script_map(&self) -> &RangeMap {
        &self.script_map
    }

    pub fn template_map(&self) -> &RangeMap {
        &self.template_map
    }

    pub fn markup_map(&self) -> &RangeMap {
        &self.markup_map
    }

    pub fn style_maps(&self) -> &[RangeMap] {
        &self.style_maps
    }

    /// The teleport map for the template-project document.
    pub fn teleports(&self) -> &TeleportMap {
        &self.teleports
    }

    /// All virtual documents this unit owns, script projects first.
    pub fn virtual_documents(&self) -> impl Iterator<Item = &VirtualDocument> {
        self.script_doc
            .iter()
            .chain(self.template_doc.iter())
            .chain(self.markup_doc.iter())
            .chain(self.style_docs.iter())
    }

    /// Whether `uri` names a virtual document owned by this unit.
    pub fn owns_virtual(&self, uri: &Url) -> bool {
        self.virtual_documents().any(|d| &d.uri == uri)
    }

    /// The range map whose mapped side is the given virtual document.
    pub fn map_for_virtual(&self, uri: &Url) -> Option<&RangeMap> {
        if self.script_doc.as_ref().map(|d| &d.uri) == Some(uri) {
            return Some(&self.script_map);
        }
        if self.template_doc.as_ref().map(|d| &d.uri) == Some(uri) {
            return Some(&self.template_map);
        }
        if self.markup_doc.as_ref().map(|d| &d.uri) == Some(uri) {
            return Some(&self.markup_map);
        }
        self.style_docs
            .iter()
            .position(|d| &d.uri == uri)
            .map(|i| &self.style_maps[i])
    }

    pub fn doc_for_virtual(&self, uri: &Url) -> Option<&VirtualDocument> {
        self.virtual_documents().find(|d| &d.uri == uri)
    }
}

fn virtual_uri(composite: &Url, suffix: &str) -> Url {
    Url::parse(&format!("{}.{suffix}", composite.as_str()))
        .unwrap_or_else(|_| composite.clone())
}

fn plain_doc(
    uri: Url,
    kind: VirtualDocKind,
    project: TargetProject,
    text: String,
) -> VirtualDocument {
    VirtualDocument {
        uri,
        kind,
        project,
        text,
        version: 1,
    }
}

/// Swap in a regenerated document, carrying the version forward and
/// bumping it only when the text differs. Returns whether content changed.
fn replace_doc(slot: &mut Option<VirtualDocument>, fresh: Option<VirtualDocument>) -> bool {
    match (slot.as_mut(), fresh) {
        (Some(old), Some(new)) => {
            if old.text == new.text {
                false
            } else {
                old.text = new.text;
                old.version += 1;
                true
            }
        }
        (None, Some(new)) => {
            *slot = Some(new);
            true
        }
        (Some(_), None) => {
            *slot = None;
            true
        }
        (None, None) => false,
    }
}

fn ident_caps() -> Capabilities {
    Capabilities::full()
}

fn link_caps() -> Capabilities {
    Capabilities {
        references: true,
        definitions: true,
        rename: RenameCapability::both(),
        ..Capabilities::none()
    }
}

/// Regenerate every virtual document and map from composite text.
fn generate(text: &str, default_style_lang: &str) -> Generated {
    let regions = extract_regions(text, default_style_lang);
    let script_region = regions.iter().find(|r| r.kind == RegionKind::Script);
    let markup_region = regions.iter().find(|r| r.kind == RegionKind::Markup);
    let style_regions: Vec<&Region> = regions
        .iter()
        .filter(|r| r.kind == RegionKind::Style)
        .collect();

    let mut generated = Generated::default();

    let declarations = script_region
        .map(|r| scan_declarations(&r.text, r.content_span.start))
        .unwrap_or_default();

    if let Some(script) = script_region {
        let mut entries = Vec::new();
        let base = script.content_span.start;
        for decl in &declarations {
            entries.push(MappingEntry::new(
                decl.span,
                Span::new(decl.span.start - base, decl.span.end - base),
                ident_caps(),
                MappingMode::BoundaryInclusive,
            ));
        }
        entries.push(MappingEntry::new(
            script.content_span,
            Span::new(0, script.text.len()),
            Capabilities::full(),
            MappingMode::EndExclusive,
        ));
        generated.script = Some((script.text.clone(), RangeMap::new(entries)));
    }

    if script_region.is_some() || markup_region.is_some() {
        generated.template = Some(generate_template(script_region, markup_region, &declarations));
        generated.teleports = generate_teleports(
            script_region,
            markup_region,
            &declarations,
            generated.template.as_ref().map(|(t, _)| t.as_str()),
        );
    }

    if let Some(markup) = markup_region {
        let map = RangeMap::new(vec![MappingEntry::new(
            markup.content_span,
            Span::new(0, markup.text.len()),
            Capabilities::full(),
            MappingMode::EndExclusive,
        )]);
        generated.markup = Some((markup.lang.clone(), markup.text.clone(), map));
    }

    for style in style_regions {
        let map = RangeMap::new(vec![MappingEntry::new(
            style.content_span,
            Span::new(0, style.text.len()),
            Capabilities::full(),
            MappingMode::EndExclusive,
        )]);
        generated
            .styles
            .push((style.lang.clone(), style.text.clone(), map));
    }

    generated
}

/// Build the template-project document: the script region verbatim,
/// followed by a render stub mentioning every binding the markup refers
/// to. Each mention maps back to its markup occurrence.
fn generate_template(
    script_region: Option<&Region>,
    markup_region: Option<&Region>,
    declarations: &[crate::document::region::Declaration],
) -> (String, RangeMap) {
    let mut text = String::new();
    let mut entries = Vec::new();

    if let Some(script) = script_region {
        text.push_str(&script.text);
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let base = script.content_span.start;
        for decl in declarations {
            entries.push(MappingEntry::new(
                decl.span,
                Span::new(decl.span.start - base, decl.span.end - base),
                ident_caps(),
                MappingMode::BoundaryInclusive,
            ));
        }
    }

    text.push_str("function __render() {\n");
    if let Some(markup) = markup_region {
        let refs = scan_markup_refs(&markup.text, markup.content_span.start);
        for markup_ref in refs {
            text.push_str("    ");
            let start = text.len();
            text.push_str(&markup_ref.ident);
            let stub_span = Span::new(start, text.len());
            text.push_str(";\n");

            let mut entry = MappingEntry::new(
                markup_ref.span,
                stub_span,
                ident_caps(),
                MappingMode::BoundaryInclusive,
            );
            if markup_ref.kind == MarkupRefKind::ComponentTag {
                entry.before_rename = Some(RenameTransform::KebabToPascal);
                entry.apply_rename = Some(RenameTransform::PascalToKebab);
            }
            entries.push(entry);
        }
    }
    text.push_str("}\n");

    // Broad script-region entry comes last so identifier entries win ties.
    if let Some(script) = script_region {
        entries.push(MappingEntry::new(
            script.content_span,
            Span::new(0, script.text.len()),
            Capabilities::full(),
            MappingMode::EndExclusive,
        ));
    }

    (text, RangeMap::new(entries))
}

/// Link every render-stub mention to its declaration in the same
/// template-project document, both directions.
fn generate_teleports(
    script_region: Option<&Region>,
    markup_region: Option<&Region>,
    declarations: &[crate::document::region::Declaration],
    template_text: Option<&str>,
) -> TeleportMap {
    let (Some(script), Some(markup), Some(text)) = (script_region, markup_region, template_text)
    else {
        return TeleportMap::default();
    };

    let base = script.content_span.start;
    let refs = scan_markup_refs(&markup.text, markup.content_span.start);

    // Recompute stub spans the same way generate_template laid them out:
    // scan the render stub section of the finished text.
    let Some(stub_start) = text.find("function __render() {") else {
        return TeleportMap::default();
    };

    let mut entries = Vec::new();
    let mut cursor = stub_start;
    for markup_ref in &refs {
        // Each stub line is "    IDENT;\n" in ref order.
        let Some(line_start) = text[cursor..]
            .find(&format!("    {};", markup_ref.ident))
            .map(|i| cursor + i)
        else {
            continue;
        };
        let ident_start = line_start + 4;
        let stub_span = Span::new(ident_start, ident_start + markup_ref.ident.len());
        cursor = stub_span.end;

        let Some(decl) = declarations.iter().find(|d| d.name == markup_ref.ident) else {
            continue;
        };
        let decl_span = Span::new(decl.span.start - base, decl.span.end - base);

        entries.push(TeleportEntry::new(stub_span, decl_span, link_caps()));
        entries.push(TeleportEntry::new(decl_span, stub_span, link_caps()));
    }

    TeleportMap::new(entries)
}

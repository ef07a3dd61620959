//! Composite-document slicing.
//!
//! A composite document embeds a script block, a markup block and style
//! blocks in one file:
//!
//! ```text
//! <script> let count = 1; </script>
//! <template> <p>{{ count }}</p> </template>
//! <style lang="css"> p { color: red } </style>
//! ```
//!
//! This module extracts those regions and scans them for the identifier
//! spans the generated virtual documents need. Everything here is a pure
//! function of the input text, which is what makes regeneration
//! deterministic.

use std::sync::OnceLock;

use regex::Regex;

use crate::capabilities::RenameTransform;
use crate::mapping::Span;

/// The sub-language a region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Script,
    Markup,
    Style,
}

/// One extracted block. `content_span` addresses the inner content within
/// the composite text; `text` is that same content, owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub kind: RegionKind,
    pub lang: String,
    pub content_span: Span,
    pub text: String,
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<script((?:\s[^>]*)?)>(.*?)</script>").unwrap())
}

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<template((?:\s[^>]*)?)>(.*?)</template>").unwrap())
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<style((?:\s[^>]*)?)>(.*?)</style>").unwrap())
}

fn lang_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"lang\s*=\s*"([A-Za-z0-9-]+)""#).unwrap())
}

/// Extract every region from composite text, ordered by position.
/// Style blocks without a `lang` attribute fall back to
/// `default_style_lang`; script defaults to `ts`, markup to `html`.
pub fn extract_regions(text: &str, default_style_lang: &str) -> Vec<Region> {
    let mut regions = Vec::new();

    for caps in script_re().captures_iter(text) {
        regions.push(make_region(&caps, RegionKind::Script, "ts"));
    }
    for caps in template_re().captures_iter(text) {
        regions.push(make_region(&caps, RegionKind::Markup, "html"));
    }
    for caps in style_re().captures_iter(text) {
        regions.push(make_region(&caps, RegionKind::Style, default_style_lang));
    }

    regions.sort_by_key(|r| r.content_span.start);
    regions
}

fn make_region(caps: &regex::Captures<'_>, kind: RegionKind, default_lang: &str) -> Region {
    let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let content = caps.get(2).expect("content group");
    let lang = lang_attr_re()
        .captures(attrs)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| default_lang.to_string());
    Region {
        kind,
        lang,
        content_span: Span::new(content.start(), content.end()),
        text: content.as_str().to_string(),
    }
}

/// How a markup location refers to a script binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupRefKind {
    /// `{{ identifier }}`
    Interpolation,
    /// `<my-widget>` or `</my-widget>` referring to a `MyWidget` binding.
    /// Opening and closing tags each produce their own reference so a
    /// rename rewrites both.
    ComponentTag,
}

/// One reference to a script binding found in markup. `span` addresses the
/// identifier (or tag name) within the text that was scanned, shifted by
/// the caller-provided base offset; `ident` is the script-side spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupRef {
    pub kind: MarkupRefKind,
    pub span: Span,
    pub ident: String,
}

fn interpolation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

fn component_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([a-z][a-z0-9]*(?:-[a-z0-9]+)+)").unwrap())
}

fn component_close_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</([a-z][a-z0-9]*(?:-[a-z0-9]+)+)").unwrap())
}

/// Scan markup for binding references. Offsets in the result are relative
/// to the composite document when `base` is the markup region's content
/// start. Order is by position, interpolations and tags interleaved.
pub fn scan_markup_refs(markup: &str, base: usize) -> Vec<MarkupRef> {
    let mut refs = Vec::new();

    for caps in interpolation_re().captures_iter(markup) {
        let m = caps.get(1).expect("ident group");
        refs.push(MarkupRef {
            kind: MarkupRefKind::Interpolation,
            span: Span::new(base + m.start(), base + m.end()),
            ident: m.as_str().to_string(),
        });
    }
    for re in [component_tag_re(), component_close_tag_re()] {
        for caps in re.captures_iter(markup) {
            let m = caps.get(1).expect("tag group");
            refs.push(MarkupRef {
                kind: MarkupRefKind::ComponentTag,
                span: Span::new(base + m.start(), base + m.end()),
                ident: RenameTransform::KebabToPascal.apply(m.as_str()),
            });
        }
    }

    refs.sort_by_key(|r| r.span.start);
    refs
}

/// A binding declared in the script region.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    /// The identifier span, shifted by the caller-provided base offset.
    pub span: Span,
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:let|const|var|function|class)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
    })
}

/// Scan script text for declared binding names. The core only needs
/// identifier spans to anchor maps and teleports; real name resolution is
/// the script service's job.
pub fn scan_declarations(script: &str, base: usize) -> Vec<Declaration> {
    declaration_re()
        .captures_iter(script)
        .map(|caps| {
            let m = caps.get(1).expect("name group");
            Declaration {
                name: m.as_str().to_string(),
                span: Span::new(base + m.start(), base + m.end()),
            }
        })
        .collect()
}

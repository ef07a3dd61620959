//! Capability model for mapped ranges.
//!
//! Every mapping entry carries a `Capabilities` record declaring which
//! editor features are valid at that range. Feature implementations filter
//! their queries by one `CapabilityKind` so a range that only exists for,
//! say, diagnostics never answers a rename request.

/// Feature flags for a single mapped range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub hover: bool,
    pub references: bool,
    pub definitions: bool,
    pub diagnostics: bool,
    pub completion: bool,
    pub formatting: bool,
    pub semantic_tokens: bool,
    pub rename: RenameCapability,
}

impl Capabilities {
    /// All features enabled, rename in both directions.
    pub fn full() -> Self {
        Self {
            hover: true,
            references: true,
            definitions: true,
            diagnostics: true,
            completion: true,
            formatting: true,
            semantic_tokens: true,
            rename: RenameCapability::both(),
        }
    }

    /// No features enabled. Useful for ranges that exist only to keep
    /// generated code structurally valid.
    pub fn none() -> Self {
        Self {
            hover: false,
            references: false,
            definitions: false,
            diagnostics: false,
            completion: false,
            formatting: false,
            semantic_tokens: false,
            rename: RenameCapability::none(),
        }
    }

    /// Test a single capability flag.
    pub fn supports(&self, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Hover => self.hover,
            CapabilityKind::References => self.references,
            CapabilityKind::Definitions => self.definitions,
            CapabilityKind::Diagnostics => self.diagnostics,
            CapabilityKind::Completion => self.completion,
            CapabilityKind::Formatting => self.formatting,
            CapabilityKind::SemanticTokens => self.semantic_tokens,
            CapabilityKind::RenameIn => self.rename.apply_in,
            CapabilityKind::RenameOut => self.rename.emit_out,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::none()
    }
}

/// Rename is direction-sensitive: a range may accept rename requests
/// (`apply_in`), emit rename edits (`emit_out`), both, or neither.
///
/// A generated helper that merely mentions an identifier typically emits
/// edits but is not a place the user can start a rename from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameCapability {
    pub apply_in: bool,
    pub emit_out: bool,
}

impl RenameCapability {
    pub fn both() -> Self {
        Self {
            apply_in: true,
            emit_out: true,
        }
    }

    pub fn none() -> Self {
        Self {
            apply_in: false,
            emit_out: false,
        }
    }

    pub fn out_only() -> Self {
        Self {
            apply_in: false,
            emit_out: true,
        }
    }
}

/// One capability flag, used to filter range-map and teleport queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Hover,
    References,
    Definitions,
    Diagnostics,
    Completion,
    Formatting,
    SemanticTokens,
    RenameIn,
    RenameOut,
}

/// Rewrites rename text crossing a mapping or teleport boundary.
///
/// Concrete transform values instead of callbacks keep mapping entries
/// `Clone + PartialEq`, which regeneration comparison relies on. The set
/// covers what the generated code needs: tag-name case conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameTransform {
    /// `my-widget` -> `MyWidget`
    KebabToPascal,
    /// `MyWidget` -> `my-widget`
    PascalToKebab,
}

impl RenameTransform {
    pub fn apply(&self, text: &str) -> String {
        match self {
            RenameTransform::KebabToPascal => kebab_to_pascal(text),
            RenameTransform::PascalToKebab => pascal_to_kebab(text),
        }
    }
}

fn kebab_to_pascal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for part in text.split('-') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn pascal_to_kebab(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for (i, c) in text.char_indices() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_supports_everything() {
        let caps = Capabilities::full();
        assert!(caps.supports(CapabilityKind::Hover));
        assert!(caps.supports(CapabilityKind::RenameIn));
        assert!(caps.supports(CapabilityKind::RenameOut));
    }

    #[test]
    fn none_supports_nothing() {
        let caps = Capabilities::none();
        assert!(!caps.supports(CapabilityKind::References));
        assert!(!caps.supports(CapabilityKind::RenameIn));
    }

    #[test]
    fn rename_out_only() {
        let caps = Capabilities {
            rename: RenameCapability::out_only(),
            ..Capabilities::none()
        };
        assert!(!caps.supports(CapabilityKind::RenameIn));
        assert!(caps.supports(CapabilityKind::RenameOut));
    }

    #[test]
    fn kebab_to_pascal_round_trip() {
        assert_eq!(RenameTransform::KebabToPascal.apply("my-widget"), "MyWidget");
        assert_eq!(RenameTransform::PascalToKebab.apply("MyWidget"), "my-widget");
        assert_eq!(
            RenameTransform::PascalToKebab.apply(&RenameTransform::KebabToPascal.apply("a-b-c")),
            "a-b-c"
        );
    }

    #[test]
    fn pascal_to_kebab_handles_single_word() {
        assert_eq!(RenameTransform::PascalToKebab.apply("Widget"), "widget");
        assert_eq!(RenameTransform::KebabToPascal.apply("widget"), "Widget");
    }
}

//! Interfaces to the per-language analysis services.
//!
//! The core never implements language semantics. Script, style and markup
//! analysis are external collaborators behind these traits: every
//! operation takes a virtual-document URI plus byte offsets and answers in
//! that same coordinate space. The core only relays successful results
//! through coordinate translation; failures propagate unmodified.

use std::collections::HashMap;

use thiserror::Error;
use tower_lsp::lsp_types::Url;

use crate::mapping::Span;

/// Failure reported by a per-language service. The core does not swallow
/// or reinterpret these; they surface to the caller as-is.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("script service: {0}")]
    Script(String),
    #[error("style service: {0}")]
    Style(String),
    #[error("markup service: {0}")]
    Markup(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A location in some document, in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSpan {
    pub uri: Url,
    pub span: Span,
}

impl DocSpan {
    pub fn new(uri: Url, span: Span) -> Self {
        Self { uri, span }
    }
}

/// A single replacement within one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }
}

/// Edits grouped by document, the shape a rename answer takes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceEdits {
    pub changes: HashMap<Url, Vec<TextEdit>>,
}

impl WorkspaceEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, uri: Url, edit: TextEdit) {
        self.changes.entry(uri).or_default().push(edit);
    }

    /// Append every edit from `other`, keeping existing ones.
    pub fn merge(&mut self, other: WorkspaceEdits) {
        for (uri, edits) in other.changes {
            self.changes.entry(uri).or_default().extend(edits);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.values().all(Vec::is_empty)
    }

    pub fn edit_count(&self) -> usize {
        self.changes.values().map(Vec::len).sum()
    }
}

/// A diagnostic reported by a service, offsets relative to the virtual
/// document it was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDiagnostic {
    pub span: Span,
    pub message: String,
    pub code: Option<String>,
}

/// Script-language analysis over virtual script documents. One instance
/// exists per target project (template and script), mirroring the two
/// analysis programs the host runs.
pub trait ScriptService {
    fn find_references(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>>;

    fn definition_at(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>>;

    /// Rename the symbol at `offset` to `new_name`. `Ok(None)` means the
    /// position is not renameable, which is not an error.
    fn do_rename(
        &self,
        uri: &Url,
        offset: usize,
        new_name: &str,
    ) -> ServiceResult<Option<WorkspaceEdits>>;

    fn diagnostics(&self, uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>>;

    /// Module-specifier edits needed when a file moves.
    fn edits_for_file_rename(
        &self,
        old_uri: &Url,
        new_uri: &Url,
    ) -> ServiceResult<Option<WorkspaceEdits>>;
}

/// Style-language analysis over virtual style documents.
pub trait StyleService {
    fn do_rename(
        &self,
        uri: &Url,
        offset: usize,
        new_name: &str,
    ) -> ServiceResult<Option<WorkspaceEdits>>;

    fn find_references(&self, uri: &Url, offset: usize) -> ServiceResult<Vec<DocSpan>>;

    fn diagnostics(&self, uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>>;
}

/// Markup analysis over virtual markup documents.
pub trait MarkupService {
    fn diagnostics(&self, uri: &Url) -> ServiceResult<Vec<ServiceDiagnostic>>;
}

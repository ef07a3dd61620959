//! Source mapping and virtual document core for composite multi-language
//! documents.
//!
//! A composite document holds script, markup and style regions in one
//! file. This crate slices such documents into per-region virtual
//! documents, maintains capability-annotated range maps between composite
//! and virtual coordinates, and propagates editor operations (rename,
//! references, diagnostics) across region boundaries through teleport
//! links. Language semantics live behind the [`service`] traits; the core
//! only generates, maps and translates.

pub mod capabilities;
pub mod dedupe;
pub mod document;
pub mod features;
pub mod mapper;
pub mod mapping;
pub mod project;
pub mod service;
pub mod settings;

pub use capabilities::{Capabilities, CapabilityKind, RenameCapability, RenameTransform};
pub use document::{
    global_stub, LineIndex, SourceUnit, SourceUnitStore, TargetProject, UpdateOutcome,
    VirtualDocKind, VirtualDocument, GLOBAL_STUB_URI,
};
pub use mapper::{Mapper, SourceHit, VirtualHit};
pub use mapping::{MappingEntry, MappingMode, RangeMap, Span, TeleportEntry, TeleportMap};
pub use project::{ChangeDetector, FileChanges, ProjectHost, VersionTracker, Workspace};
pub use service::{
    DocSpan, MarkupService, ScriptService, ServiceDiagnostic, ServiceError, ServiceResult,
    StyleService, TextEdit, WorkspaceEdits,
};
pub use settings::{discover_settings, load_settings, Settings};

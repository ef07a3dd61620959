//! Composite-document slicing and virtual-document lifecycle.
//!
//! This module provides:
//! - `LineIndex` for byte offset <-> LSP position conversion
//! - region extraction and identifier scanning for composite text
//! - `SourceUnit`, owning one composite document's virtual documents and maps
//! - `SourceUnitStore` for unit lifecycle and reverse lookup

pub mod region;
mod source_unit;
mod store;
mod text;

pub use region::{
    extract_regions, scan_declarations, scan_markup_refs, Declaration, MarkupRef, MarkupRefKind,
    Region, RegionKind,
};
pub use source_unit::{
    SourceUnit, TargetProject, UpdateOutcome, VirtualDocKind, VirtualDocument,
};
pub use store::{global_stub, SourceUnitStore, GLOBAL_STUB_URI};
pub use text::LineIndex;

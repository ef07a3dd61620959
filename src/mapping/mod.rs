//! Coordinate mapping primitives.
//!
//! This module provides:
//! - `Span` for byte-offset intervals
//! - `RangeMap` for capability-annotated composite <-> virtual mapping
//! - `TeleportMap` for same-document links between generated locations

mod range_map;
mod teleport;

pub use range_map::{MappedSpan, MappingEntry, MappingMode, RangeMap, Span};
pub use teleport::{expand_teleports, TeleportEntry, TeleportHit, TeleportMap};

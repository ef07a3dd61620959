//! Per-project version counters.
//!
//! Per-language services cache whole-project analysis against these
//! counters, so a counter must move exactly when that project's file set
//! or content moved. Markup-derived changes are tracked separately: the
//! content counter ignores markup-only edits, which is what lets a plain
//! script hover skip the expensive markup refresh.

use std::collections::BTreeSet;

use tower_lsp::lsp_types::Url;

use crate::document::TargetProject;

#[derive(Debug, Default)]
pub struct VersionTracker {
    template: u64,
    script: u64,
    /// Counts content-affecting batches, excluding markup-only edits.
    content: u64,
    /// Units with markup-affecting edits not yet refreshed. BTreeSet keeps
    /// deferred processing order deterministic.
    markup_pending: BTreeSet<Url>,
}

impl VersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self, project: TargetProject) -> u64 {
        match project {
            TargetProject::Template => self.template,
            TargetProject::Script => self.script,
        }
    }

    pub fn content_version(&self) -> u64 {
        self.content
    }

    /// Bump one project's counter. Counters only ever grow.
    pub fn bump(&mut self, project: TargetProject) {
        match project {
            TargetProject::Template => self.template += 1,
            TargetProject::Script => self.script += 1,
        }
    }

    /// Record a content-affecting batch (anything but a markup-only edit).
    pub fn record_content_change(&mut self) {
        self.content += 1;
    }

    /// Remember that a unit has markup-affecting edits awaiting a markup
    /// refresh that the caller skipped.
    pub fn mark_markup_pending(&mut self, uri: Url) {
        self.markup_pending.insert(uri);
    }

    pub fn has_markup_pending(&self) -> bool {
        !self.markup_pending.is_empty()
    }

    /// Drain the deferred-markup set for processing.
    pub fn take_markup_pending(&mut self) -> Vec<Url> {
        std::mem::take(&mut self.markup_pending).into_iter().collect()
    }
}

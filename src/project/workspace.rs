//! Refresh orchestration for one host project.
//!
//! `refresh(markup_needed)` is the explicit first half of every feature
//! call: the feature states up front whether it needs markup-derived
//! analysis, the workspace re-versions whatever actually changed, and only
//! then does the feature run. Markup refresh is the expensive path, so it
//! executes only when requested or when a prior skipped refresh left
//! markup edits pending.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::document::{SourceUnit, SourceUnitStore, TargetProject};
use crate::project::change::{ChangeDetector, ProjectHost};
use crate::project::version::VersionTracker;
use crate::settings::Settings;

pub struct Workspace<H: ProjectHost> {
    host: H,
    settings: Settings,
    store: Arc<SourceUnitStore>,
    detector: ChangeDetector,
    versions: VersionTracker,
}

impl<H: ProjectHost> Workspace<H> {
    pub fn new(host: H, settings: Settings) -> Self {
        Self {
            host,
            settings,
            store: Arc::new(SourceUnitStore::new()),
            detector: ChangeDetector::new(),
            versions: VersionTracker::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn store(&self) -> &Arc<SourceUnitStore> {
        &self.store
    }

    pub fn versions(&self) -> &VersionTracker {
        &self.versions
    }

    /// Bring source units and version counters up to date with the host.
    ///
    /// `markup_needed` is the caller's declaration that the upcoming
    /// feature reads markup-derived analysis. When false, markup-affecting
    /// edits are recorded as pending and paid for on the next refresh that
    /// does need them.
    pub fn refresh(&mut self, markup_needed: bool) {
        let markup_needed = markup_needed || self.settings.refresh.eager_markup;

        if let Some(changes) = self.detector.detect(&self.host) {
            if changes.is_empty() {
                trace!("refresh: project version moved but nothing changed");
            } else {
                debug!(
                    added = changes.added.len(),
                    removed = changes.removed.len(),
                    updated = changes.updated.len(),
                    plain_changed = changes.plain_changed,
                    "refresh: applying host changes"
                );
            }

            // Plain-file changes invalidate cross-file type information, so
            // both projects re-resolve before any composite regeneration.
            if changes.plain_changed {
                self.versions.bump(TargetProject::Script);
                self.versions.bump(TargetProject::Template);
                self.versions.record_content_change();
            }

            let mut removed_any = false;
            for uri in &changes.removed {
                if self.store.remove(uri) {
                    removed_any = true;
                }
            }
            if removed_any {
                self.versions.bump(TargetProject::Script);
                self.versions.bump(TargetProject::Template);
                self.versions.record_content_change();
            }

            let mut script_changed = false;
            for uri in changes.added.iter().chain(&changes.updated) {
                let Some(text) = self.host.file_text(uri) else {
                    continue;
                };
                let generation = &self.settings.generation;
                match self.store.get(uri) {
                    None => {
                        self.store
                            .insert(SourceUnit::new(uri.clone(), text, generation));
                        script_changed = true;
                        self.versions.mark_markup_pending(uri.clone());
                    }
                    Some(old) => {
                        let (next, outcome) = old.updated_from(text, generation);
                        self.store.insert(next);
                        if outcome.script_updated {
                            script_changed = true;
                        }
                        if outcome.markup_updated {
                            self.versions.mark_markup_pending(uri.clone());
                        }
                    }
                }
            }
            if script_changed {
                self.versions.bump(TargetProject::Script);
                self.versions.bump(TargetProject::Template);
                self.versions.record_content_change();
            }
        }

        if markup_needed && self.versions.has_markup_pending() {
            let pending = self.versions.take_markup_pending();
            debug!(units = pending.len(), "refresh: applying deferred markup updates");
            // Markup-only changes re-version the markup-aware project but
            // not the content counter.
            self.versions.bump(TargetProject::Template);
        }
    }
}

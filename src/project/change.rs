//! Host-project snapshot diffing.
//!
//! The host owns the authoritative file list and per-file content
//! versions. `ChangeDetector` compares the current view against the last
//! snapshot and classifies what moved, distinguishing composite documents
//! (which regenerate incrementally) from plain single-language files
//! (whose content the core cannot diff, so any change forces a full
//! project re-resolution).

use std::collections::HashMap;

use tower_lsp::lsp_types::Url;

/// The host project surface the core reads. Implemented by the embedding
/// server; the core never watches the file system itself.
pub trait ProjectHost {
    /// Opaque version string that changes whenever anything in the project
    /// may have changed. `None` means "always re-check".
    fn project_version(&self) -> Option<String>;

    fn file_uris(&self) -> Vec<Url>;

    /// Opaque per-file content version.
    fn file_version(&self, uri: &Url) -> Option<String>;

    fn file_text(&self, uri: &Url) -> Option<String>;

    /// Whether the file is a composite document (script/markup/style
    /// blocks in one file) rather than a plain single-language file.
    fn is_composite(&self, uri: &Url) -> bool {
        uri.path().ends_with(".poly")
    }
}

/// Classified outcome of one snapshot comparison. The URI lists hold only
/// composite documents; plain-file changes collapse into `plain_changed`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileChanges {
    pub added: Vec<Url>,
    pub removed: Vec<Url>,
    pub updated: Vec<Url>,
    pub plain_changed: bool,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && !self.plain_changed
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    project_version: Option<String>,
    file_versions: HashMap<Url, Option<String>>,
}

/// Stateful change detector: each `detect` call diffs against the snapshot
/// taken by the previous call.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Snapshot,
    primed: bool,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare the host against the last snapshot. Returns `None` when the
    /// host's project version is unchanged (nothing to do); otherwise the
    /// classified changes, which may still be empty.
    pub fn detect(&mut self, host: &dyn ProjectHost) -> Option<FileChanges> {
        let project_version = host.project_version();
        if self.primed && project_version.is_some() && project_version == self.last.project_version
        {
            return None;
        }

        let mut changes = FileChanges::default();
        let mut current = HashMap::new();

        for uri in host.file_uris() {
            let version = host.file_version(&uri);
            match self.last.file_versions.get(&uri) {
                None => {
                    if host.is_composite(&uri) {
                        changes.added.push(uri.clone());
                    } else {
                        changes.plain_changed = true;
                    }
                }
                Some(old_version) if *old_version != version => {
                    if host.is_composite(&uri) {
                        changes.updated.push(uri.clone());
                    } else {
                        changes.plain_changed = true;
                    }
                }
                Some(_) => {}
            }
            current.insert(uri, version);
        }

        for uri in self.last.file_versions.keys() {
            if !current.contains_key(uri) {
                if host.is_composite(uri) {
                    changes.removed.push(uri.clone());
                } else {
                    changes.plain_changed = true;
                }
            }
        }

        // Cross-file type information feeds composite regeneration, so a
        // plain-file change invalidates every kept composite file too.
        if changes.plain_changed {
            changes.updated = current
                .keys()
                .filter(|uri| {
                    host.is_composite(uri)
                        && self.last.file_versions.contains_key(*uri)
                        && !changes.added.contains(uri)
                })
                .cloned()
                .collect();
        }

        changes.added.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        changes.removed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        changes.updated.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        self.last = Snapshot {
            project_version,
            file_versions: current,
        };
        self.primed = true;

        Some(changes)
    }
}

//! Project-level state: snapshot diffing against the host, per-project
//! version counters, and the refresh loop that ties them to the unit store.

mod change;
mod version;
mod workspace;

pub use change::{ChangeDetector, FileChanges, ProjectHost};
pub use version::VersionTracker;
pub use workspace::Workspace;

//! Editor features built on coordinate translation: rename and reference
//! propagation across regions, and the cancellable whole-project
//! diagnostic sweep.

pub mod references;
pub mod rename;
pub mod verify;

//! Cross-translation-unit arbitration of header ownership.
//!
//! Many translation units include the same headers. Without arbitration
//! every parse would emit an `IndexFile` for every header it touches,
//! re-indexing shared headers quadratically and racing on the persisted
//! records. This arbiter grants each file to the first worker that asks;
//! everyone else materializes the header for cross-file resolution during
//! the parse and drops it before returning.

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::frontend::{FileUniqueId, SourceFile};

/// Process-wide claim table, the only shared mutable state in the core.
///
/// Keyed on the frontend's inode-like unique id rather than the textual
/// path, so symlink aliases collapse onto one claim. The critical section
/// is a single set insert.
#[derive(Debug, Default)]
pub struct FileConsumerSharedState {
    claimed: Mutex<HashSet<FileUniqueId>>,
}

impl FileConsumerSharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `file` for the calling worker. The first caller for a given
    /// unique id receives `true` and must index the file; every later
    /// caller receives `false` and must drop its in-progress record for the
    /// file at end of parse.
    pub fn mark(&self, file: &SourceFile) -> bool {
        self.claimed.lock().insert(file.unique_id)
    }
}

//! Translation-unit lifecycle.

use std::path::{Path, PathBuf};

use crate::error::{FrontendError, IndexResult};
use crate::frontend::{FrontendEngine, FrontendUnit, IndexSink, UnsavedSnapshot};

/// A parsed translation unit, scoped explicitly because the frontend holds a
/// large in-memory AST behind it. Storage is released on drop, on every exit
/// path.
///
/// State machine: `Create` produces a parsed unit; `reparse` recomputes it
/// in place against a fresh snapshot; drop is terminal. The first parse is
/// coarse and slow, a reparse is cheap, so callers that already hold a unit
/// must reparse rather than recreate. Completion and code-action layers
/// depend on this property.
pub struct TranslationUnit {
    unit: Box<dyn FrontendUnit>,
    path: PathBuf,
}

impl TranslationUnit {
    /// Drive the frontend to produce a parsed unit. The snapshot becomes a
    /// remap set: each overlaid path is replaced by its in-memory buffer for
    /// the duration of the parse.
    pub fn create(
        engine: &dyn FrontendEngine,
        path: &Path,
        args: &[String],
        unsaved: &UnsavedSnapshot,
    ) -> IndexResult<Self> {
        let unit = engine.create_unit(path, args, unsaved)?;
        Ok(Self {
            unit,
            path: path.to_path_buf(),
        })
    }

    /// Recompute the unit against a fresh snapshot. A frontend failure
    /// surfaces as [`FrontendError::Reparse`] with the frontend's code; the
    /// caller may retry or give up.
    pub fn reparse(&mut self, unsaved: &UnsavedSnapshot) -> Result<(), FrontendError> {
        self.unit.reparse(unsaved)
    }

    /// Replay the unit's index events into `sink` in traversal order.
    pub fn index(&mut self, sink: &mut dyn IndexSink) -> Result<(), FrontendError> {
        self.unit.index(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

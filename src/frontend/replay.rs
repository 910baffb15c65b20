//! A scripted frontend.
//!
//! Replays a fixed event list for each registered root file. This is the
//! stand-in engine for tests and offline debugging: scripts are plain data,
//! so a failing projection can be reduced to the minimal event sequence that
//! triggers it. Reparse re-reads the engine's current script for the root,
//! which lets a test swap the script between parses to model edits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    DeclEvent, DiagnosticEvent, FrontendEngine, FrontendUnit, IncludeEvent, IndexSink, RefEvent,
    SkipEvent, SourceFile, UnsavedSnapshot,
};
use crate::error::FrontendError;

/// One event of a replay script, mirroring the callback surface.
#[derive(Debug, Clone)]
pub enum IndexEvent {
    StartedTranslationUnit,
    EnteredMainFile(SourceFile),
    Include(IncludeEvent),
    ImportedAstFile(SourceFile),
    Declaration(DeclEvent),
    Reference(RefEvent),
    Skipped(SkipEvent),
    Diagnostic(DiagnosticEvent),
}

impl IndexEvent {
    fn dispatch(&self, sink: &mut dyn IndexSink) {
        match self {
            IndexEvent::StartedTranslationUnit => sink.started_translation_unit(),
            IndexEvent::EnteredMainFile(file) => sink.entered_main_file(file),
            IndexEvent::Include(include) => sink.pp_included_file(include),
            IndexEvent::ImportedAstFile(file) => sink.imported_ast_file(file),
            IndexEvent::Declaration(decl) => sink.declaration(decl),
            IndexEvent::Reference(reference) => sink.entity_reference(reference),
            IndexEvent::Skipped(skip) => sink.skipped_source_range(skip),
            IndexEvent::Diagnostic(diagnostic) => sink.diagnostic(diagnostic),
        }
    }
}

type ScriptMap = HashMap<PathBuf, Vec<IndexEvent>>;

/// Frontend engine backed by per-root event scripts.
#[derive(Default)]
pub struct ReplayEngine {
    scripts: Arc<Mutex<ScriptMap>>,
}

impl ReplayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the script replayed for `root`.
    pub fn set_script(&self, root: impl Into<PathBuf>, events: Vec<IndexEvent>) {
        self.scripts.lock().insert(root.into(), events);
    }

    /// Drop the script for `root`. Outstanding units for it keep their
    /// captured events but fail to reparse, which is how tests model a
    /// frontend reparse failure.
    pub fn clear_script(&self, root: &Path) {
        self.scripts.lock().remove(root);
    }
}

impl FrontendEngine for ReplayEngine {
    fn create_unit(
        &self,
        path: &Path,
        _args: &[String],
        _unsaved: &UnsavedSnapshot,
    ) -> Result<Box<dyn FrontendUnit>, FrontendError> {
        let events =
            self.scripts
                .lock()
                .get(path)
                .cloned()
                .ok_or_else(|| FrontendError::UnitCreation {
                    path: path.to_path_buf(),
                })?;
        Ok(Box::new(ReplayUnit {
            scripts: Arc::clone(&self.scripts),
            root: path.to_path_buf(),
            events,
        }))
    }
}

/// A "parsed" unit holding the event list captured at creation time.
pub struct ReplayUnit {
    scripts: Arc<Mutex<ScriptMap>>,
    root: PathBuf,
    events: Vec<IndexEvent>,
}

impl FrontendUnit for ReplayUnit {
    fn index(&mut self, sink: &mut dyn IndexSink) -> Result<(), FrontendError> {
        for event in &self.events {
            event.dispatch(sink);
        }
        Ok(())
    }

    fn reparse(&mut self, _unsaved: &UnsavedSnapshot) -> Result<(), FrontendError> {
        match self.scripts.lock().get(&self.root) {
            Some(events) => {
                self.events = events.clone();
                Ok(())
            }
            None => Err(FrontendError::Reparse { code: 1 }),
        }
    }
}

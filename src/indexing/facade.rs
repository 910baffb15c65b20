//! Public entry points of the indexing core.
//!
//! Both entry points compose the translation-unit wrapper, the event
//! adapter, the crash shim and the claim arbiter, returning a vector of
//! owned `IndexFile`s. A fatal frontend fault yields an empty vector, never
//! partial data; structured frontend errors propagate as `Err`.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::IndexingConfig;
use crate::error::IndexResult;
use crate::frontend::{FrontendEngine, UnsavedSnapshot};
use crate::indexing::adapter::IndexBuilder;
use crate::indexing::consumer::FileConsumerSharedState;
use crate::indexing::crash;
use crate::indexing::index_file::IndexFile;
use crate::indexing::unit::TranslationUnit;

/// Wall-clock counters for one parse request.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexPerf {
    /// Time the frontend spent producing the translation unit.
    pub index_parse: Duration,
    /// Time spent projecting events into `IndexFile`s.
    pub index_build: Duration,
}

/// Index `path` with a freshly created translation unit.
pub fn parse(
    config: &IndexingConfig,
    shared: &FileConsumerSharedState,
    engine: &dyn FrontendEngine,
    path: &Path,
    args: &[String],
    unsaved: &UnsavedSnapshot,
    perf: &mut IndexPerf,
) -> IndexResult<Vec<IndexFile>> {
    let start = Instant::now();
    let Some(created) = crash::run_safely(|| TranslationUnit::create(engine, path, args, unsaved))
    else {
        warn!(path = %path.display(), "frontend crashed creating the translation unit");
        return Ok(Vec::new());
    };
    let mut unit = created?;
    perf.index_parse = start.elapsed();

    parse_with_unit(config, shared, perf, &mut unit, path, args, unsaved)
}

/// Index `path` reusing an existing translation unit, typically right after
/// a reparse.
pub fn parse_with_unit(
    config: &IndexingConfig,
    shared: &FileConsumerSharedState,
    perf: &mut IndexPerf,
    unit: &mut TranslationUnit,
    path: &Path,
    args: &[String],
    unsaved: &UnsavedSnapshot,
) -> IndexResult<Vec<IndexFile>> {
    let start = Instant::now();
    let mut builder = IndexBuilder::new(shared, path, args, config.comments);

    let outcome = crash::run_safely(|| unit.index(&mut builder));
    match outcome {
        None => {
            warn!(path = %path.display(), "frontend crashed during indexing");
            return Ok(Vec::new());
        }
        Some(Err(e)) => return Err(e.into()),
        Some(Ok(())) => {}
    }

    let mut files = builder.finish();
    for file in &mut files {
        attach_file_contents(file, unsaved);
    }
    perf.index_build = start.elapsed();
    Ok(files)
}

/// The unsaved snapshot wins over on-disk contents; a file that can be read
/// from neither simply has no contents attached.
fn attach_file_contents(file: &mut IndexFile, unsaved: &UnsavedSnapshot) {
    if let Some(overlay) = unsaved.get(&file.path) {
        file.file_contents = overlay.to_string();
        return;
    }
    match std::fs::read_to_string(&file.path) {
        Ok(contents) => file.file_contents = contents,
        Err(e) => {
            debug!(path = %file.path.display(), error = %e, "could not attach file contents");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrontendError;
    use crate::frontend::replay::{IndexEvent, ReplayEngine};
    use crate::frontend::{FrontendUnit, IndexSink, SourceFile};

    #[test]
    fn test_parse_returns_root_index_file() {
        let engine = ReplayEngine::new();
        engine.set_script(
            "/src/a.cc",
            vec![
                IndexEvent::StartedTranslationUnit,
                IndexEvent::EnteredMainFile(SourceFile::new("/src/a.cc", 1)),
            ],
        );

        let shared = FileConsumerSharedState::new();
        let mut perf = IndexPerf::default();
        let files = parse(
            &IndexingConfig::default(),
            &shared,
            &engine,
            Path::new("/src/a.cc"),
            &["-std=c++17".to_string()],
            &UnsavedSnapshot::new(),
            &mut perf,
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, Path::new("/src/a.cc"));
        assert_eq!(files[0].import_file, files[0].path);
        assert_eq!(files[0].args, vec!["-std=c++17".to_string()]);
    }

    #[test]
    fn test_unsaved_overlay_wins_for_file_contents() {
        let engine = ReplayEngine::new();
        engine.set_script(
            "/src/a.cc",
            vec![IndexEvent::EnteredMainFile(SourceFile::new("/src/a.cc", 1))],
        );

        let shared = FileConsumerSharedState::new();
        let mut perf = IndexPerf::default();
        let unsaved = UnsavedSnapshot::new().with("/src/a.cc", "int edited;\n");
        let files = parse(
            &IndexingConfig::default(),
            &shared,
            &engine,
            Path::new("/src/a.cc"),
            &[],
            &unsaved,
            &mut perf,
        )
        .unwrap();

        assert_eq!(files[0].file_contents, "int edited;\n");
    }

    struct FaultingUnit;

    impl FrontendUnit for FaultingUnit {
        fn index(&mut self, _sink: &mut dyn IndexSink) -> Result<(), FrontendError> {
            panic!("simulated frontend fault");
        }
        fn reparse(&mut self, _unsaved: &UnsavedSnapshot) -> Result<(), FrontendError> {
            Ok(())
        }
    }

    struct FaultingEngine;

    impl FrontendEngine for FaultingEngine {
        fn create_unit(
            &self,
            _path: &Path,
            _args: &[String],
            _unsaved: &UnsavedSnapshot,
        ) -> Result<Box<dyn FrontendUnit>, FrontendError> {
            Ok(Box::new(FaultingUnit))
        }
    }

    #[test]
    fn test_crash_during_indexing_yields_empty_result() {
        let shared = FileConsumerSharedState::new();
        let mut perf = IndexPerf::default();
        let files = parse(
            &IndexingConfig::default(),
            &shared,
            &FaultingEngine,
            Path::new("/src/a.cc"),
            &[],
            &UnsavedSnapshot::new(),
            &mut perf,
        )
        .unwrap();

        assert!(files.is_empty());
    }
}

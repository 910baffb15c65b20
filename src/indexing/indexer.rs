//! The indexer seam consumed by dispatch layers.
//!
//! Dispatchers schedule work against this trait rather than against the
//! façade functions, so they can be exercised without a compiler behind
//! them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::IndexingConfig;
use crate::error::IndexResult;
use crate::frontend::{FrontendEngine, UnsavedSnapshot};
use crate::indexing::consumer::FileConsumerSharedState;
use crate::indexing::facade::{self, IndexPerf};
use crate::indexing::index_file::IndexFile;

pub trait Indexer: Send + Sync {
    fn index(
        &self,
        path: &Path,
        args: &[String],
        unsaved: &UnsavedSnapshot,
        perf: &mut IndexPerf,
    ) -> IndexResult<Vec<IndexFile>>;
}

/// Production indexer: one frontend engine (pooled per worker thread; its
/// construction takes a global lock) plus the process-wide claim table.
pub struct UnitIndexer {
    config: IndexingConfig,
    engine: Arc<dyn FrontendEngine>,
    shared: Arc<FileConsumerSharedState>,
}

impl UnitIndexer {
    pub fn new(
        config: IndexingConfig,
        engine: Arc<dyn FrontendEngine>,
        shared: Arc<FileConsumerSharedState>,
    ) -> Self {
        Self {
            config,
            engine,
            shared,
        }
    }
}

impl Indexer for UnitIndexer {
    fn index(
        &self,
        path: &Path,
        args: &[String],
        unsaved: &UnsavedSnapshot,
        perf: &mut IndexPerf,
    ) -> IndexResult<Vec<IndexFile>> {
        facade::parse(
            &self.config,
            &self.shared,
            self.engine.as_ref(),
            path,
            args,
            unsaved,
            perf,
        )
    }
}

/// An indexer that pretends to index a fixed set of paths, returning the
/// configured number of empty `IndexFile`s per request and counting calls.
pub struct TestIndexer {
    entries: HashMap<PathBuf, usize>,
    calls: AtomicUsize,
}

impl TestIndexer {
    pub fn new(entries: impl IntoIterator<Item = (PathBuf, usize)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Indexer for TestIndexer {
    fn index(
        &self,
        path: &Path,
        _args: &[String],
        _unsaved: &UnsavedSnapshot,
        _perf: &mut IndexPerf,
    ) -> IndexResult<Vec<IndexFile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let count = self.entries.get(path).copied().unwrap_or(0);
        Ok((0..count)
            .map(|_| IndexFile::new(path.to_path_buf(), path.to_path_buf(), Vec::new()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_indexer_counts_calls_and_fakes_results() {
        let indexer = TestIndexer::new([
            (PathBuf::from("/src/a.cc"), 2),
            (PathBuf::from("/src/b.cc"), 1),
        ]);
        let mut perf = IndexPerf::default();

        let a = indexer
            .index(Path::new("/src/a.cc"), &[], &UnsavedSnapshot::new(), &mut perf)
            .unwrap();
        let b = indexer
            .index(Path::new("/src/b.cc"), &[], &UnsavedSnapshot::new(), &mut perf)
            .unwrap();
        let unknown = indexer
            .index(Path::new("/src/c.cc"), &[], &UnsavedSnapshot::new(), &mut perf)
            .unwrap();

        assert_eq!(a.len(), 2);
        assert!(a.iter().all(|f| f.types.is_empty() && f.funcs.is_empty()));
        assert_eq!(b.len(), 1);
        assert!(unknown.is_empty());
        assert_eq!(indexer.call_count(), 3);
    }
}

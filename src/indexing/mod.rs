//! Multi-file indexing.
//!
//! One parse of one translation unit fans out into many `IndexFile`s, one
//! per distinct source file the parse touched. The pieces compose as: the
//! [`facade`] obtains a [`TranslationUnit`], drives it with the
//! [`IndexBuilder`] adapter under the crash shim, filters the working set by
//! the claims held in [`FileConsumerSharedState`], and returns the owned
//! records.

pub mod adapter;
pub mod consumer;
pub mod crash;
pub mod facade;
pub mod index_file;
pub mod indexer;
pub mod namespace;
pub mod unit;

pub use adapter::IndexBuilder;
pub use consumer::FileConsumerSharedState;
pub use crash::{CRASH_RECOVERY_ENV, run_safely};
pub use facade::{IndexPerf, parse, parse_with_unit};
pub use index_file::{Diagnostic, IdCache, IndexFile, IndexInclude, Language};
pub use indexer::{Indexer, TestIndexer, UnitIndexer};
pub use namespace::{NamespaceCache, QualifiedName};
pub use unit::TranslationUnit;

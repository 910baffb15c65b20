//! tucana is the indexing core of a language server for C, C++ and
//! Objective-C.
//!
//! A parse request takes a translation-unit root, an argument vector and a
//! snapshot of unsaved editor buffers, and produces one [`IndexFile`] per
//! distinct source file the parse touched: every declared and referenced
//! entity, its relationships (inheritance, containment, calls, overrides,
//! type-of) and its source positions. Query, persistence and cross-reference
//! layers build on these records.

pub mod config;
pub mod error;
pub mod frontend;
pub mod indexing;
pub mod logging;
pub mod storage;
pub mod symbol;
pub mod types;

pub use config::{IndexingConfig, LoggingConfig, Settings};
pub use error::{CacheError, FrontendError, IndexError, IndexResult};
pub use indexing::{
    FileConsumerSharedState, IndexFile, IndexInclude, IndexPerf, Indexer, Language, TestIndexer,
    TranslationUnit, UnitIndexer, parse, parse_with_unit,
};
pub use symbol::{FuncDeclaration, FuncDef, IndexFunc, IndexType, IndexVar, Names, TypeDef, VarDef};
pub use types::*;

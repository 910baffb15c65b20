//! The compiler-frontend seam.
//!
//! The core never parses source itself: it drives an external frontend that
//! delivers indexing events in traversal order. Any engine exposing an
//! equivalent cursor-based callback surface can back the core. The
//! production build binds a clang-style frontend over FFI, the test-suite
//! uses the [`replay`] engine.

pub mod replay;
pub mod unsaved;

use std::path::{Path, PathBuf};

use crate::error::FrontendError;
use crate::types::{LsSymbolKind, Range, Role, StorageClass, SymbolKind};

pub use unsaved::UnsavedSnapshot;

/// Inode-like identity the frontend assigns to a source file. Two textual
/// paths naming the same on-disk file (symlink aliases) share one unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileUniqueId(pub u64);

/// A source file as reported by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFile {
    /// Absolute, canonical path.
    pub path: PathBuf,
    pub unique_id: FileUniqueId,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, unique_id: u64) -> Self {
        Self {
            path: path.into(),
            unique_id: FileUniqueId(unique_id),
        }
    }
}

/// Opaque handle to a frontend cursor. Used to correlate declarations with
/// the containers that enclose them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorId(pub u64);

/// A file plus a range within it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: SourceFile,
    pub range: Range,
}

impl Location {
    pub fn new(file: SourceFile, range: Range) -> Self {
        Self { file, range }
    }
}

/// Identity of a program entity as named by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityInfo {
    /// Unified symbol name; hashed into a [`crate::types::Usr`] by the core.
    pub usr: String,
    /// Unqualified spelling.
    pub name: String,
    pub kind: SymbolKind,
    pub ls_kind: LsSymbolKind,
}

impl EntityInfo {
    pub fn new(usr: impl Into<String>, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            usr: usr.into(),
            name: name.into(),
            kind,
            ls_kind: LsSymbolKind::Unknown,
        }
    }

    pub fn with_ls_kind(mut self, ls_kind: LsSymbolKind) -> Self {
        self.ls_kind = ls_kind;
        self
    }
}

/// A declaration or definition observed by the frontend.
#[derive(Debug, Clone, Default)]
pub struct DeclEvent {
    pub entity: EntityInfo,
    pub cursor: CursorId,
    /// Scope enclosing the declaration site.
    pub lexical_container: Option<CursorId>,
    /// Scope the entity semantically belongs to. Differs from the lexical
    /// container for out-of-line member definitions.
    pub semantic_container: Option<CursorId>,
    /// Location of the name token.
    pub spell: Location,
    /// Range of the whole declaration, in the same file as `spell`.
    pub extent: Range,
    pub is_definition: bool,
    /// Compiler-generated, e.g. implicit constructors.
    pub is_implicit: bool,
    pub storage: StorageClass,
    /// Text preceding the qualified name in the detailed declaration string
    /// (return type or elaboration keyword), trailing space included.
    pub detail_prefix: String,
    /// Text following the short name (parameter list, cv-qualifiers).
    pub detail_suffix: String,
    /// Parameter-name spellings, for function declarations.
    pub param_spellings: Vec<Range>,
    /// Base classes for types; overridden methods for methods.
    pub bases: Vec<EntityInfo>,
    /// Aliased type, for typedef/using declarations.
    pub alias_of: Option<EntityInfo>,
    /// The declared variable's type, for variables.
    pub var_type: Option<EntityInfo>,
    pub hover: String,
    pub comment: String,
}

/// A reference to an entity from somewhere in the translation unit.
#[derive(Debug, Clone, Default)]
pub struct RefEvent {
    /// The referenced entity.
    pub entity: EntityInfo,
    /// Lexical parent the occurrence lives in.
    pub container: Option<CursorId>,
    /// For macro-expanded references this is the expansion site.
    pub loc: Location,
    pub role: Role,
}

/// An `#include` resolved by the preprocessor.
#[derive(Debug, Clone, Default)]
pub struct IncludeEvent {
    /// The including file.
    pub source: SourceFile,
    /// Line of the directive.
    pub line: u32,
    pub resolved: SourceFile,
}

/// A region the preprocessor elided (inactive `#if` branch).
#[derive(Debug, Clone, Default)]
pub struct SkipEvent {
    pub file: SourceFile,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DiagnosticSeverity {
    #[default]
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

/// A diagnostic emitted during parsing. Diagnostics are data, not errors.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticEvent {
    pub loc: Location,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

/// Receiver of the frontend's event stream. Events arrive serially on the
/// driving thread, so implementations need no internal locking.
pub trait IndexSink {
    fn started_translation_unit(&mut self) {}
    fn entered_main_file(&mut self, _file: &SourceFile) {}
    fn pp_included_file(&mut self, _include: &IncludeEvent) {}
    fn imported_ast_file(&mut self, _file: &SourceFile) {}
    fn declaration(&mut self, decl: &DeclEvent);
    fn entity_reference(&mut self, reference: &RefEvent);
    fn skipped_source_range(&mut self, _skip: &SkipEvent) {}
    fn diagnostic(&mut self, _diagnostic: &DiagnosticEvent) {}
}

/// A parsed translation unit held by the frontend.
pub trait FrontendUnit: Send {
    /// Deliver the unit's index events to `sink` in traversal order.
    fn index(&mut self, sink: &mut dyn IndexSink) -> Result<(), FrontendError>;

    /// Recompute the unit against a fresh snapshot. Much cheaper than a
    /// first parse; callers holding a unit must prefer it.
    fn reparse(&mut self, unsaved: &UnsavedSnapshot) -> Result<(), FrontendError>;
}

/// Factory for translation units. One engine instance per worker thread is
/// the intended pool model: construction is expensive and takes a global
/// lock in FFI-backed implementations.
pub trait FrontendEngine: Send + Sync {
    fn create_unit(
        &self,
        path: &Path,
        args: &[String],
        unsaved: &UnsavedSnapshot,
    ) -> Result<Box<dyn FrontendUnit>, FrontendError>;
}

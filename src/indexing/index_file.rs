//! The per-source-file output record of a parse.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frontend::DiagnosticSeverity;
use crate::symbol::{IndexFunc, IndexType, IndexVar};
use crate::types::{FuncId, Range, TypeId, Usr, VarId};

/// Source language of a file, detected from its extension. Headers default
/// to C++ because they are most often consumed from C++ translation units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    C,
    #[default]
    Cpp,
    ObjC,
    ObjCpp,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") => Language::C,
            Some("m") => Language::ObjC,
            Some("mm") => Language::ObjCpp,
            _ => Language::Cpp,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::ObjC => "objc",
            Language::ObjCpp => "objcpp",
        };
        f.write_str(name)
    }
}

/// One resolved `#include` directive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexInclude {
    /// Line of the directive, 1-based.
    pub line: u32,
    /// Absolute canonical path of the included file.
    pub resolved_path: PathBuf,
}

/// A diagnostic attached to the file it occurred in. Carried alongside
/// results as data; never serialized with the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

/// Bijective USR ↔ id mapping local to one [`IndexFile`].
///
/// The reverse direction is a dense vector because ids are allocated
/// contiguously from zero.
#[derive(Debug, Clone, Default)]
pub struct IdCache {
    usr_to_type_id: HashMap<Usr, TypeId>,
    usr_to_func_id: HashMap<Usr, FuncId>,
    usr_to_var_id: HashMap<Usr, VarId>,
    type_id_to_usr: Vec<Usr>,
    func_id_to_usr: Vec<Usr>,
    var_id_to_usr: Vec<Usr>,
}

impl IdCache {
    pub fn type_id(&self, usr: Usr) -> Option<TypeId> {
        self.usr_to_type_id.get(&usr).copied()
    }

    pub fn func_id(&self, usr: Usr) -> Option<FuncId> {
        self.usr_to_func_id.get(&usr).copied()
    }

    pub fn var_id(&self, usr: Usr) -> Option<VarId> {
        self.usr_to_var_id.get(&usr).copied()
    }

    pub fn type_usr(&self, id: TypeId) -> Option<Usr> {
        self.type_id_to_usr.get(id.raw() as usize).copied()
    }

    pub fn func_usr(&self, id: FuncId) -> Option<Usr> {
        self.func_id_to_usr.get(id.raw() as usize).copied()
    }

    pub fn var_usr(&self, id: VarId) -> Option<Usr> {
        self.var_id_to_usr.get(id.raw() as usize).copied()
    }

    fn insert_type(&mut self, usr: Usr, id: TypeId) {
        self.usr_to_type_id.insert(usr, id);
        debug_assert_eq!(self.type_id_to_usr.len(), id.raw() as usize);
        self.type_id_to_usr.push(usr);
    }

    fn insert_func(&mut self, usr: Usr, id: FuncId) {
        self.usr_to_func_id.insert(usr, id);
        debug_assert_eq!(self.func_id_to_usr.len(), id.raw() as usize);
        self.func_id_to_usr.push(usr);
    }

    fn insert_var(&mut self, usr: Usr, id: VarId) {
        self.usr_to_var_id.insert(usr, id);
        debug_assert_eq!(self.var_id_to_usr.len(), id.raw() as usize);
        self.var_id_to_usr.push(usr);
    }
}

/// Everything one parse learned about one source file.
///
/// Entities live in three dense arenas indexed by their ids. Ids are only
/// meaningful within this file; the USR is the cross-file key. After the
/// parse returns the record is frozen: callers serialize, diff or merge it,
/// never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexFile {
    /// Absolute canonical path of this file.
    pub path: PathBuf,
    /// Arguments the translation unit was parsed with.
    pub args: Vec<String>,
    /// Seconds since the epoch, 0 when the file could not be stat'ed.
    pub last_modification_time: u64,
    pub language: Language,
    /// The translation-unit root that caused this record to be created.
    /// Equals `path` for the root itself.
    pub import_file: PathBuf,
    /// Ranges the preprocessor elided.
    pub skipped_by_preprocessor: Vec<Range>,
    pub includes: Vec<IndexInclude>,
    /// Absolute paths of files contributing to this file's content.
    pub dependencies: Vec<PathBuf>,
    pub types: Vec<IndexType>,
    pub funcs: Vec<IndexFunc>,
    pub vars: Vec<IndexVar>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub file_contents: String,
    #[serde(skip)]
    id_cache: IdCache,
}

impl Default for IndexFile {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            args: Vec::new(),
            last_modification_time: 0,
            language: Language::default(),
            import_file: PathBuf::new(),
            skipped_by_preprocessor: Vec::new(),
            includes: Vec::new(),
            dependencies: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            vars: Vec::new(),
            diagnostics: Vec::new(),
            file_contents: String::new(),
            id_cache: IdCache::default(),
        }
    }
}

impl IndexFile {
    pub fn new(path: PathBuf, import_file: PathBuf, args: Vec<String>) -> Self {
        let language = Language::from_path(&path);
        let last_modification_time = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            path,
            args,
            last_modification_time,
            language,
            import_file,
            ..Self::default()
        }
    }

    pub fn id_cache(&self) -> &IdCache {
        &self.id_cache
    }

    /// Intern a type USR. Total: the first sighting allocates a record with
    /// a default `def`, later sightings return the existing id.
    pub fn type_id(&mut self, usr: Usr) -> TypeId {
        if let Some(id) = self.id_cache.type_id(usr) {
            return id;
        }
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(IndexType::new(usr, id));
        self.id_cache.insert_type(usr, id);
        id
    }

    pub fn func_id(&mut self, usr: Usr) -> FuncId {
        if let Some(id) = self.id_cache.func_id(usr) {
            return id;
        }
        let id = FuncId::new(self.funcs.len() as u32);
        self.funcs.push(IndexFunc::new(usr, id));
        self.id_cache.insert_func(usr, id);
        id
    }

    pub fn var_id(&mut self, usr: Usr) -> VarId {
        if let Some(id) = self.id_cache.var_id(usr) {
            return id;
        }
        let id = VarId::new(self.vars.len() as u32);
        self.vars.push(IndexVar::new(usr, id));
        self.id_cache.insert_var(usr, id);
        id
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut IndexType {
        &mut self.types[id.raw() as usize]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut IndexFunc {
        &mut self.funcs[id.raw() as usize]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut IndexVar {
        &mut self.vars[id.raw() as usize]
    }

    /// Reconstruct the id cache from the entity arenas. Used after
    /// deserialization, where the cache is not part of the wire format.
    pub fn rebuild_id_cache(&mut self) {
        let mut cache = IdCache::default();
        for t in &self.types {
            cache.insert_type(t.usr, t.id);
        }
        for f in &self.funcs {
            cache.insert_func(f.usr, f.id);
        }
        for v in &self.vars {
            cache.insert_var(v.usr, v.id);
        }
        self.id_cache = cache;
    }

    /// Find an entity by USR without interning.
    pub fn find_type(&self, usr: Usr) -> Option<&IndexType> {
        self.id_cache
            .type_id(usr)
            .map(|id| &self.types[id.raw() as usize])
    }

    pub fn find_func(&self, usr: Usr) -> Option<&IndexFunc> {
        self.id_cache
            .func_id(usr)
            .map(|id| &self.funcs[id.raw() as usize])
    }

    pub fn find_var(&self, usr: Usr) -> Option<&IndexVar> {
        self.id_cache
            .var_id(usr)
            .map(|id| &self.vars[id.raw() as usize])
    }
}

/// Equality over the serialized fields only: `diagnostics`, `file_contents`
/// and the rebuildable id cache do not participate.
impl PartialEq for IndexFile {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.args == other.args
            && self.last_modification_time == other.last_modification_time
            && self.language == other.language
            && self.import_file == other.import_file
            && self.skipped_by_preprocessor == other.skipped_by_preprocessor
            && self.includes == other.includes
            && self.dependencies == other.dependencies
            && self.types == other.types
            && self.funcs == other.funcs
            && self.vars == other.vars
    }
}

impl Eq for IndexFile {}

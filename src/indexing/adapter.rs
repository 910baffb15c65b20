//! Projection of the frontend event stream onto the entity model.
//!
//! The builder is installed as the [`IndexSink`] for one parse. Events are
//! delivered serially, so there is no locking here; the only shared state it
//! touches is the claim arbiter. Every event mutates the `IndexFile` of the
//! file the event occurred in, and every entity an edge mentions is interned
//! into that same file, so edges never dangle within a record. Domain
//! anomalies (missing containers, unknown kinds) never fail the parse: they
//! are logged and the event is skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::frontend::{
    CursorId, DeclEvent, DiagnosticEvent, FileUniqueId, IncludeEvent, IndexSink, RefEvent,
    SkipEvent, SourceFile,
};
use crate::indexing::consumer::FileConsumerSharedState;
use crate::indexing::index_file::{Diagnostic, IndexFile, IndexInclude};
use crate::indexing::namespace::NamespaceCache;
use crate::symbol::{FuncDeclaration, Names};
use crate::types::{AnyId, FileId, Role, SymbolKind, SymbolRef, Use, Usr, insert_sorted_unique};

/// What the builder remembers about a container cursor: enough to intern the
/// parent into whichever file a later occurrence lands in.
#[derive(Debug, Clone, Copy)]
struct ContainerInfo {
    usr: Usr,
    kind: SymbolKind,
}

struct FileSlot {
    file: IndexFile,
    claimed: bool,
}

/// Accumulates the working set of one parse and implements the callback
/// surface the translation unit is driven with.
pub struct IndexBuilder<'a> {
    shared: &'a FileConsumerSharedState,
    root: PathBuf,
    args: Vec<String>,
    record_comments: bool,
    slots: Vec<FileSlot>,
    by_unique_id: HashMap<FileUniqueId, usize>,
    containers: HashMap<CursorId, ContainerInfo>,
    namespaces: NamespaceCache,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

fn insert_func_declaration(declarations: &mut Vec<FuncDeclaration>, declaration: FuncDeclaration) {
    let key = declaration.spell.sort_key();
    match declarations.binary_search_by_key(&key, |d| d.spell.sort_key()) {
        Ok(_) => {}
        Err(pos) => declarations.insert(pos, declaration),
    }
}

impl<'a> IndexBuilder<'a> {
    pub fn new(
        shared: &'a FileConsumerSharedState,
        root: &Path,
        args: &[String],
        record_comments: bool,
    ) -> Self {
        Self {
            shared,
            root: root.to_path_buf(),
            args: args.to_vec(),
            record_comments,
            slots: Vec::new(),
            by_unique_id: HashMap::new(),
            containers: HashMap::new(),
            namespaces: NamespaceCache::new(),
        }
    }

    /// Hand over the claimed `IndexFile`s. Files owned by other workers were
    /// materialized so references into them resolve, but are dropped here.
    pub fn finish(self) -> Vec<IndexFile> {
        self.slots
            .into_iter()
            .filter_map(|slot| {
                if slot.claimed {
                    Some(slot.file)
                } else {
                    debug!(
                        path = %slot.file.path.display(),
                        "dropping file claimed by another worker"
                    );
                    None
                }
            })
            .collect()
    }

    /// Look up or lazily materialize the working-set slot for a file. The
    /// translation-unit root is always claimed by its own parse.
    fn slot_for(&mut self, source: &SourceFile) -> usize {
        if let Some(&slot) = self.by_unique_id.get(&source.unique_id) {
            return slot;
        }
        let claimed = self.shared.mark(source) || source.path == self.root;
        let file = IndexFile::new(source.path.clone(), self.root.clone(), self.args.clone());
        let slot = self.slots.len();
        self.slots.push(FileSlot { file, claimed });
        self.by_unique_id.insert(source.unique_id, slot);
        slot
    }

    fn root_slot(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.file.path == self.root)
    }

    /// Resolve a lexical container cursor to `(id, kind)` interned in the
    /// file of slot `slot`. Scope-only containers (namespaces) and unknown
    /// cursors attribute to file scope.
    fn parent_ref(&mut self, slot: usize, container: Option<CursorId>) -> (AnyId, SymbolKind) {
        let Some(cursor) = container else {
            return (AnyId::NONE, SymbolKind::File);
        };
        let Some(info) = self.containers.get(&cursor).copied() else {
            warn!(?cursor, "occurrence names an unknown container, attributing to file scope");
            return (AnyId::NONE, SymbolKind::File);
        };
        let file = &mut self.slots[slot].file;
        match info.kind {
            SymbolKind::Type => (file.type_id(info.usr).erase(), SymbolKind::Type),
            SymbolKind::Func => (file.func_id(info.usr).erase(), SymbolKind::Func),
            SymbolKind::Var => (file.var_id(info.usr).erase(), SymbolKind::Var),
            _ => (AnyId::NONE, SymbolKind::File),
        }
    }

    fn semantic_parent(&self, container: Option<CursorId>) -> Option<ContainerInfo> {
        container.and_then(|cursor| self.containers.get(&cursor).copied())
    }
}

impl IndexSink for IndexBuilder<'_> {
    fn started_translation_unit(&mut self) {
        debug!(root = %self.root.display(), "indexing translation unit");
    }

    fn entered_main_file(&mut self, file: &SourceFile) {
        self.slot_for(file);
    }

    fn pp_included_file(&mut self, include: &IncludeEvent) {
        let slot = self.slot_for(&include.source);
        {
            let file = &mut self.slots[slot].file;
            push_unique(
                &mut file.includes,
                IndexInclude {
                    line: include.line,
                    resolved_path: include.resolved.path.clone(),
                },
            );
            push_unique(&mut file.dependencies, include.resolved.path.clone());
        }
        // Headers with no declarations of their own still get a record, so
        // the arbiter sees them exactly once per parse.
        self.slot_for(&include.resolved);
    }

    fn imported_ast_file(&mut self, file: &SourceFile) {
        match self.root_slot() {
            Some(slot) => {
                push_unique(&mut self.slots[slot].file.dependencies, file.path.clone());
            }
            None => warn!(
                path = %file.path.display(),
                "AST import before the main file was entered"
            ),
        }
    }

    fn declaration(&mut self, decl: &DeclEvent) {
        let slot = self.slot_for(&decl.spell.file);

        self.namespaces.record_scope(
            decl.cursor,
            &decl.entity.name,
            decl.semantic_container,
            decl.entity.ls_kind,
        );

        let usr = Usr::of(&decl.entity.usr);
        if !matches!(
            decl.entity.kind,
            SymbolKind::Type | SymbolKind::Func | SymbolKind::Var
        ) {
            // Scope-only constructs (namespaces, linkage specs) shape
            // qualified names and parent chains but get no entity record.
            self.containers.insert(
                decl.cursor,
                ContainerInfo {
                    usr,
                    kind: SymbolKind::Invalid,
                },
            );
            return;
        }
        self.containers.insert(
            decl.cursor,
            ContainerInfo {
                usr,
                kind: decl.entity.kind,
            },
        );

        let qualified = self.namespaces.qualified(
            decl.semantic_container,
            &decl.entity.name,
            &decl.detail_prefix,
            &decl.detail_suffix,
        );

        let mut role = Role::DECLARATION;
        if decl.is_definition {
            role |= Role::DEFINITION;
        }
        if decl.is_implicit {
            role |= Role::IMPLICIT;
        }

        let (parent_id, parent_kind) = self.parent_ref(slot, decl.lexical_container);
        let spell = Use::new(decl.spell.range, parent_id, parent_kind, role);
        let extent = Use::new(decl.extent, parent_id, parent_kind, role);
        let semantic = self.semantic_parent(decl.semantic_container);

        let names = Names {
            detailed_name: qualified.detailed,
            qual_name_offset: qualified.qual_name_offset,
            short_name_offset: qualified.short_name_offset,
            short_name_size: qualified.short_name_size,
            hover: decl.hover.clone(),
            comments: if self.record_comments {
                decl.comment.clone()
            } else {
                String::new()
            },
        };

        let file_id = FileId::new(slot as u32);
        let file = &mut self.slots[slot].file;

        match decl.entity.kind {
            SymbolKind::Type => {
                let id = file.type_id(usr);
                // A declaration allocates the slot, the definition overwrites
                // the def fields that become known; references held by other
                // records stay valid throughout.
                if decl.is_definition || file.type_mut(id).def.names.detailed_name.is_empty() {
                    let def = &mut file.type_mut(id).def;
                    def.names = names;
                    def.kind = decl.entity.ls_kind;
                    def.file = file_id;
                }
                if decl.is_definition {
                    let def = &mut file.type_mut(id).def;
                    def.spell = Some(spell);
                    def.extent = Some(extent);
                } else {
                    insert_sorted_unique(&mut file.type_mut(id).declarations, spell);
                }
                if let Some(alias) = &decl.alias_of {
                    let target = file.type_id(Usr::of(&alias.usr));
                    file.type_mut(id).def.alias_of = Some(target);
                }
                for base in &decl.bases {
                    let base_id = file.type_id(Usr::of(&base.usr));
                    if base_id == id {
                        continue;
                    }
                    push_unique(&mut file.type_mut(id).def.bases, base_id);
                    push_unique(&mut file.type_mut(base_id).derived, id);
                }
                if let Some(parent) = semantic {
                    if parent.kind == SymbolKind::Type {
                        let parent_id = file.type_id(parent.usr);
                        if parent_id != id {
                            push_unique(&mut file.type_mut(parent_id).def.types, id);
                        }
                    }
                }
            }
            SymbolKind::Func => {
                let id = file.func_id(usr);
                if decl.is_definition || file.func_mut(id).def.names.detailed_name.is_empty() {
                    let def = &mut file.func_mut(id).def;
                    def.names = names;
                    def.kind = decl.entity.ls_kind;
                    def.storage = decl.storage;
                    def.file = file_id;
                }
                if decl.is_definition {
                    let def = &mut file.func_mut(id).def;
                    def.spell = Some(spell);
                    def.extent = Some(extent);
                } else {
                    insert_func_declaration(
                        &mut file.func_mut(id).declarations,
                        FuncDeclaration {
                            spell,
                            param_spellings: decl.param_spellings.clone(),
                        },
                    );
                }
                for base in &decl.bases {
                    let base_id = file.func_id(Usr::of(&base.usr));
                    if base_id == id {
                        continue;
                    }
                    push_unique(&mut file.func_mut(id).def.bases, base_id);
                    push_unique(&mut file.func_mut(base_id).derived, id);
                }
                if let Some(parent) = semantic {
                    if parent.kind == SymbolKind::Type {
                        let declaring = file.type_id(parent.usr);
                        file.func_mut(id).def.declaring_type = Some(declaring);
                        push_unique(&mut file.type_mut(declaring).def.funcs, id);
                    }
                }
            }
            SymbolKind::Var => {
                let id = file.var_id(usr);
                if decl.is_definition || file.var_mut(id).def.names.detailed_name.is_empty() {
                    let def = &mut file.var_mut(id).def;
                    def.names = names;
                    def.kind = decl.entity.ls_kind;
                    def.storage = decl.storage;
                    def.file = file_id;
                }
                if decl.is_definition {
                    let def = &mut file.var_mut(id).def;
                    def.spell = Some(spell);
                    def.extent = Some(extent);
                } else {
                    insert_sorted_unique(&mut file.var_mut(id).declarations, spell);
                }
                if let Some(var_type) = &decl.var_type {
                    let ty = file.type_id(Usr::of(&var_type.usr));
                    file.var_mut(id).def.ty = Some(ty);
                    push_unique(&mut file.type_mut(ty).instances, id);
                }
                if let Some(parent) = semantic {
                    match parent.kind {
                        SymbolKind::Type => {
                            let owner = file.type_id(parent.usr);
                            push_unique(&mut file.type_mut(owner).def.vars, id);
                        }
                        SymbolKind::Func => {
                            let owner = file.func_id(parent.usr);
                            push_unique(&mut file.func_mut(owner).def.vars, id);
                        }
                        _ => {}
                    }
                }
            }
            SymbolKind::Invalid | SymbolKind::File => unreachable!(),
        }
    }

    fn entity_reference(&mut self, reference: &RefEvent) {
        if !matches!(
            reference.entity.kind,
            SymbolKind::Type | SymbolKind::Func | SymbolKind::Var
        ) {
            warn!(kind = ?reference.entity.kind, "skipping reference to unindexable entity");
            return;
        }

        let slot = self.slot_for(&reference.loc.file);
        let usr = Usr::of(&reference.entity.usr);
        let (parent_id, parent_kind) = self.parent_ref(slot, reference.container);
        let occurrence = Use::new(reference.loc.range, parent_id, parent_kind, reference.role);
        let file = &mut self.slots[slot].file;

        match reference.entity.kind {
            SymbolKind::Type => {
                let id = file.type_id(usr);
                insert_sorted_unique(&mut file.type_mut(id).uses, occurrence);
            }
            SymbolKind::Func => {
                let id = file.func_id(usr);
                insert_sorted_unique(&mut file.func_mut(id).uses, occurrence);
                // A call additionally lands as a callee edge on the caller.
                let call_in_func = reference.role.contains(Role::CALL)
                    && parent_kind == SymbolKind::Func
                    && parent_id.is_valid();
                if call_in_func {
                    let callee =
                        SymbolRef::new(reference.loc.range, id.erase(), SymbolKind::Func, reference.role);
                    let caller = parent_id.cast();
                    insert_sorted_unique(&mut file.func_mut(caller).def.callees, callee);
                }
            }
            SymbolKind::Var => {
                let id = file.var_id(usr);
                insert_sorted_unique(&mut file.var_mut(id).uses, occurrence);
            }
            SymbolKind::Invalid | SymbolKind::File => unreachable!(),
        }
    }

    fn skipped_source_range(&mut self, skip: &SkipEvent) {
        let slot = self.slot_for(&skip.file);
        let ranges = &mut self.slots[slot].file.skipped_by_preprocessor;
        push_unique(ranges, skip.range);
    }

    fn diagnostic(&mut self, diagnostic: &DiagnosticEvent) {
        let slot = self.slot_for(&diagnostic.loc.file);
        self.slots[slot].file.diagnostics.push(Diagnostic {
            range: diagnostic.loc.range,
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
        });
    }
}

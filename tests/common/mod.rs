//! Shared helpers for driving the indexing core from replay scripts.

#![allow(dead_code)]

use std::path::Path;

use tucana::frontend::replay::ReplayEngine;
use tucana::frontend::{CursorId, DeclEvent, EntityInfo, Location, SourceFile, UnsavedSnapshot};
use tucana::{
    FileConsumerSharedState, IndexFile, IndexPerf, IndexingConfig, LsSymbolKind, Range, SymbolKind,
};

pub fn src(path: &str, uid: u64) -> SourceFile {
    SourceFile::new(path, uid)
}

pub fn class(usr: &str, name: &str) -> EntityInfo {
    EntityInfo::new(usr, name, SymbolKind::Type).with_ls_kind(LsSymbolKind::Class)
}

pub fn func(usr: &str, name: &str, ls_kind: LsSymbolKind) -> EntityInfo {
    EntityInfo::new(usr, name, SymbolKind::Func).with_ls_kind(ls_kind)
}

pub fn var(usr: &str, name: &str, ls_kind: LsSymbolKind) -> EntityInfo {
    EntityInfo::new(usr, name, SymbolKind::Var).with_ls_kind(ls_kind)
}

pub fn namespace(usr: &str, name: &str) -> EntityInfo {
    EntityInfo::new(usr, name, SymbolKind::Invalid).with_ls_kind(LsSymbolKind::Namespace)
}

/// A definition event with spell on `line` at columns [5, 5+name) and an
/// extent spanning the whole line.
pub fn definition(entity: EntityInfo, cursor: u64, file: &SourceFile, line: u32) -> DeclEvent {
    let name_len = entity.name.len() as u16;
    DeclEvent {
        entity,
        cursor: CursorId(cursor),
        spell: Location::new(
            file.clone(),
            Range::from_coords(line, 5, line, 5 + name_len),
        ),
        extent: Range::from_coords(line, 1, line, 80),
        is_definition: true,
        ..Default::default()
    }
}

pub fn declaration(entity: EntityInfo, cursor: u64, file: &SourceFile, line: u32) -> DeclEvent {
    DeclEvent {
        is_definition: false,
        ..definition(entity, cursor, file, line)
    }
}

pub fn parse_root(
    engine: &ReplayEngine,
    shared: &FileConsumerSharedState,
    root: &str,
) -> Vec<IndexFile> {
    let mut perf = IndexPerf::default();
    tucana::parse(
        &IndexingConfig::default(),
        shared,
        engine,
        Path::new(root),
        &[],
        &UnsavedSnapshot::new(),
        &mut perf,
    )
    .expect("replay parse should not fail")
}

/// Invariant: the id cache maps every entity's USR to its id and back.
pub fn assert_id_cache_bijective(file: &IndexFile) {
    for t in &file.types {
        assert_eq!(file.id_cache().type_id(t.usr), Some(t.id));
        assert_eq!(file.id_cache().type_usr(t.id), Some(t.usr));
    }
    for f in &file.funcs {
        assert_eq!(file.id_cache().func_id(f.usr), Some(f.id));
        assert_eq!(file.id_cache().func_usr(f.id), Some(f.usr));
    }
    for v in &file.vars {
        assert_eq!(file.id_cache().var_id(v.usr), Some(v.id));
        assert_eq!(file.id_cache().var_usr(v.id), Some(v.usr));
    }
}

/// Invariant: wherever both are set, the spell lies inside the extent.
pub fn assert_spells_within_extents(file: &IndexFile) {
    let pairs = file
        .types
        .iter()
        .map(|t| (&t.def.spell, &t.def.extent))
        .chain(file.funcs.iter().map(|f| (&f.def.spell, &f.def.extent)))
        .chain(file.vars.iter().map(|v| (&v.def.spell, &v.def.extent)));
    for (spell, extent) in pairs {
        if let (Some(spell), Some(extent)) = (spell, extent) {
            assert!(
                extent.range.contains_range(spell.range),
                "spell {} outside extent {}",
                spell.range,
                extent.range
            );
        }
    }
}

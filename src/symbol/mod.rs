//! Entity records produced by indexing: types, functions, variables.
//!
//! Each record splits into a kind-specific `*Def` (what the declaration says)
//! and occurrence lists (where it is declared, derived, instantiated, used).
//! The `Def` records share a [`Names`] header by composition; the kind
//! specific tail carries the edges that only make sense for that kind. All
//! cross-entity links are ids, never owning pointers, so cyclic graphs stay
//! cycles only in the logical graph.

use serde::{Deserialize, Serialize};

use crate::types::{
    FileId, FuncId, LsSymbolKind, Range, StorageClass, SymbolRef, TypeId, Use, Usr, VarId,
};

/// Shared name header of every entity definition.
///
/// `detailed_name` is the fully qualified declaration string, e.g.
/// `int ns::Counter::add(int) const`. The three 16-bit offsets carve out two
/// substrings: the qualified name starts after any pure-namespace prefix
/// (`Counter::add`), the short name is the unqualified token (`add`). Names
/// are computed once during indexing and never rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Names {
    pub detailed_name: String,
    pub qual_name_offset: u16,
    pub short_name_offset: u16,
    pub short_name_size: u16,
    pub hover: String,
    pub comments: String,
}

impl Names {
    pub fn qualified_name(&self) -> &str {
        let start = usize::from(self.qual_name_offset);
        let end = usize::from(self.short_name_offset) + usize::from(self.short_name_size);
        &self.detailed_name[start..end]
    }

    pub fn short_name(&self) -> &str {
        let start = usize::from(self.short_name_offset);
        &self.detailed_name[start..start + usize::from(self.short_name_size)]
    }
}

/// Definition data for a type. Classes collapse forward declarations and the
/// definition into this single record; navigation always targets the
/// definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDef {
    pub names: Names,
    pub kind: LsSymbolKind,
    pub spell: Option<Use>,
    pub extent: Option<Use>,
    pub file: FileId,
    /// Direct parents.
    pub bases: Vec<TypeId>,
    /// Types, functions and variables declared inside this type.
    pub types: Vec<TypeId>,
    pub funcs: Vec<FuncId>,
    pub vars: Vec<VarId>,
    /// Aliased type, non-empty iff this is a typedef/using.
    pub alias_of: Option<TypeId>,
}

/// Definition data for a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FuncDef {
    pub names: Names,
    pub kind: LsSymbolKind,
    pub storage: StorageClass,
    pub spell: Option<Use>,
    pub extent: Option<Use>,
    pub file: FileId,
    /// Methods this method overrides.
    pub bases: Vec<FuncId>,
    /// Locals and parameters.
    pub vars: Vec<VarId>,
    pub callees: Vec<SymbolRef>,
    /// Enclosing type, non-empty iff this is a method.
    pub declaring_type: Option<TypeId>,
}

/// Definition data for a variable, field, parameter or enum member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VarDef {
    pub names: Names,
    pub kind: LsSymbolKind,
    pub storage: StorageClass,
    pub spell: Option<Use>,
    pub extent: Option<Use>,
    pub file: FileId,
    /// The variable's type, if known.
    pub ty: Option<TypeId>,
}

impl VarDef {
    /// Locals are plain `Variable`s, as opposed to fields, parameters and
    /// enum members.
    pub fn is_local(&self) -> bool {
        self.kind == LsSymbolKind::Variable
    }
}

/// One declaration site of a function: the name spelling plus the spellings
/// of its parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FuncDeclaration {
    pub spell: Use,
    pub param_spellings: Vec<Range>,
}

/// A type entity within one `IndexFile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexType {
    pub usr: Usr,
    pub id: TypeId,
    #[serde(default)]
    pub def: TypeDef,
    #[serde(default)]
    pub declarations: Vec<Use>,
    /// Direct subclasses observed in this translation unit.
    #[serde(default)]
    pub derived: Vec<TypeId>,
    /// Variables of this type.
    #[serde(default)]
    pub instances: Vec<VarId>,
    #[serde(default)]
    pub uses: Vec<Use>,
}

impl IndexType {
    pub fn new(usr: Usr, id: TypeId) -> Self {
        Self {
            usr,
            id,
            def: TypeDef::default(),
            declarations: Vec::new(),
            derived: Vec::new(),
            instances: Vec::new(),
            uses: Vec::new(),
        }
    }
}

/// A function entity within one `IndexFile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFunc {
    pub usr: Usr,
    pub id: FuncId,
    #[serde(default)]
    pub def: FuncDef,
    #[serde(default)]
    pub declarations: Vec<FuncDeclaration>,
    /// Direct overrides observed in this translation unit.
    #[serde(default)]
    pub derived: Vec<FuncId>,
    /// References, call sites included; calls also appear as callee edges
    /// on the caller.
    #[serde(default)]
    pub uses: Vec<Use>,
}

impl IndexFunc {
    pub fn new(usr: Usr, id: FuncId) -> Self {
        Self {
            usr,
            id,
            def: FuncDef::default(),
            declarations: Vec::new(),
            derived: Vec::new(),
            uses: Vec::new(),
        }
    }
}

/// A variable entity within one `IndexFile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexVar {
    pub usr: Usr,
    pub id: VarId,
    #[serde(default)]
    pub def: VarDef,
    #[serde(default)]
    pub declarations: Vec<Use>,
    #[serde(default)]
    pub uses: Vec<Use>,
}

impl IndexVar {
    pub fn new(usr: Usr, id: VarId) -> Self {
        Self {
            usr,
            id,
            def: VarDef::default(),
            declarations: Vec::new(),
            uses: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(detailed: &str, qual: u16, short: u16, size: u16) -> Names {
        Names {
            detailed_name: detailed.to_string(),
            qual_name_offset: qual,
            short_name_offset: short,
            short_name_size: size,
            hover: String::new(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_name_offsets_slice_qualified_and_short() {
        // "int ns::Counter::add(int) const"
        // qual=8 skips "int ns::", short=17 is "add"
        let n = names("int ns::Counter::add(int) const", 8, 17, 3);
        assert_eq!(n.qualified_name(), "Counter::add");
        assert_eq!(n.short_name(), "add");
    }

    #[test]
    fn test_name_offsets_without_any_prefix() {
        let n = names("main()", 0, 0, 4);
        assert_eq!(n.qualified_name(), "main");
        assert_eq!(n.short_name(), "main");
    }

    #[test]
    fn test_var_is_local() {
        let mut def = VarDef {
            kind: LsSymbolKind::Variable,
            ..Default::default()
        };
        assert!(def.is_local());

        for kind in [
            LsSymbolKind::Field,
            LsSymbolKind::Parameter,
            LsSymbolKind::EnumMember,
        ] {
            def.kind = kind;
            assert!(!def.is_local());
        }
    }

    #[test]
    fn test_fresh_entities_have_default_defs() {
        let ty = IndexType::new(Usr(1), TypeId::new(0));
        assert_eq!(ty.def, TypeDef::default());
        assert!(ty.def.spell.is_none());
        assert!(!ty.def.file.is_valid());

        let func = IndexFunc::new(Usr(2), FuncId::new(0));
        assert!(func.def.declaring_type.is_none());
        assert_eq!(func.def.storage, StorageClass::Invalid);
    }
}

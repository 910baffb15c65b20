//! Core value types shared across the indexing pipeline.
//!
//! Everything here is small, `Copy` where possible, and serializable. Ids are
//! compact 32-bit handles that are only meaningful inside the `IndexFile`
//! that allocated them; the cross-file identifier is [`Usr`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A source coordinate. Both `line` and `column` are 1-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u16,
}

impl Position {
    pub fn new(line: u32, column: u16) -> Self {
        Self { line, column }
    }

    /// Pack into a single unsigned value for compact storage.
    pub fn to_packed(self) -> u64 {
        (u64::from(self.line) << 16) | u64::from(self.column)
    }

    pub fn from_packed(packed: u64) -> Self {
        Self {
            line: (packed >> 16) as u32,
            column: (packed & 0xffff) as u16,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open `[start, end)` span of positions within one file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Convenience constructor from raw coordinates.
    pub fn from_coords(start_line: u32, start_column: u16, end_line: u32, end_column: u16) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains_range(&self, other: Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Universal Symbol Reference: a fixed-width hash of the frontend's unified
/// symbol name. The only identifier that survives across translation units.
/// Collisions are treated as identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Usr(pub u64);

impl Usr {
    /// Hash a frontend unified symbol name into a stable 64-bit value.
    pub fn of(unified_name: &str) -> Self {
        let digest = Sha256::digest(unified_name.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for Usr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Usr({:016x})", self.0)
    }
}

/// Marker for ids that index files within a parse.
pub enum File {}
/// Marker for ids that index [`crate::symbol::IndexType`] records.
pub enum Ty {}
/// Marker for ids that index [`crate::symbol::IndexFunc`] records.
pub enum Func {}
/// Marker for ids that index [`crate::symbol::IndexVar`] records.
pub enum Var {}
/// Kind-erased marker for heterogeneous id storage.
pub enum Any {}

/// A compact 32-bit handle tagged with a compile-time entity kind.
///
/// Ids are dense indices into the entity vectors of one `IndexFile` and are
/// meaningless outside it. `u32::MAX` is the invalid sentinel. Equality,
/// ordering and hashing use only the raw value; the kind tag has no runtime
/// cost.
pub struct Id<K> {
    raw: u32,
    _kind: PhantomData<fn() -> K>,
}

pub type FileId = Id<File>;
pub type TypeId = Id<Ty>;
pub type FuncId = Id<Func>;
pub type VarId = Id<Var>;
pub type AnyId = Id<Any>;

impl<K> Id<K> {
    pub const NONE: Self = Self {
        raw: u32::MAX,
        _kind: PhantomData,
    };

    pub const fn new(raw: u32) -> Self {
        Self {
            raw,
            _kind: PhantomData,
        }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }

    pub const fn is_valid(self) -> bool {
        self.raw != u32::MAX
    }

    /// Widen to the kind-erased id. Free.
    pub const fn erase(self) -> AnyId {
        AnyId::new(self.raw)
    }
}

impl AnyId {
    /// Narrow to a concrete kind. Explicit and unchecked: the caller must
    /// know the kind from an accompanying [`SymbolKind`] discriminant.
    pub const fn cast<K>(self) -> Id<K> {
        Id::new(self.raw)
    }
}

impl From<TypeId> for AnyId {
    fn from(id: TypeId) -> Self {
        id.erase()
    }
}

impl From<FuncId> for AnyId {
    fn from(id: FuncId) -> Self {
        id.erase()
    }
}

impl From<VarId> for AnyId {
    fn from(id: VarId) -> Self {
        id.erase()
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Id<K> {}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K> Default for Id<K> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<K> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Id({})", self.raw)
        } else {
            write!(f, "Id(none)")
        }
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.raw)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}

/// Coarse entity taxonomy used as the discriminant next to kind-erased ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum SymbolKind {
    #[default]
    Invalid,
    File,
    Type,
    Func,
    Var,
}

/// The richer editor-facing taxonomy reported per declaration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum LsSymbolKind {
    #[default]
    Unknown,
    File,
    Module,
    Namespace,
    Class,
    Struct,
    Union,
    Interface,
    Method,
    Constructor,
    Destructor,
    Function,
    Field,
    Variable,
    Parameter,
    Constant,
    Enum,
    EnumMember,
    TypeAlias,
    TypeParameter,
    Macro,
}

/// Storage class reported by the frontend for functions and variables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum StorageClass {
    #[default]
    Invalid,
    None,
    Extern,
    Static,
    PrivateExtern,
    Auto,
    Register,
}

bitflags! {
    /// What kind of occurrence a reference is. Multiple bits compose, e.g. a
    /// definition is also a declaration, a call is also a reference.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Role: u16 {
        const DECLARATION = 1 << 0;
        const DEFINITION  = 1 << 1;
        const REFERENCE   = 1 << 2;
        const READ        = 1 << 3;
        const WRITE       = 1 << 4;
        const CALL        = 1 << 5;
        const DYNAMIC     = 1 << 6;
        const ADDRESS     = 1 << 7;
        const IMPLICIT    = 1 << 8;
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::empty()
    }
}

/// Roles serialize as their raw bits; unknown bits from newer writers are
/// preserved rather than rejected.
impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(Role::from_bits_retain)
    }
}

/// An occurrence of an entity at a source range.
///
/// Two refinements share this layout and differ only in what `id`/`kind`
/// denote: in a [`SymbolRef`] they name the *referenced* entity (callee
/// edges); in a [`Use`] they name the *lexical parent* enclosing the
/// occurrence. The owning file is implicit inside an `IndexFile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    pub range: Range,
    pub id: AnyId,
    pub kind: SymbolKind,
    pub role: Role,
}

impl Reference {
    pub fn new(range: Range, id: AnyId, kind: SymbolKind, role: Role) -> Self {
        Self {
            range,
            id,
            kind,
            role,
        }
    }

    /// Sort key for deterministic sorted-unique storage: range first, then
    /// role bits, then the referenced id.
    pub fn sort_key(&self) -> (Range, u16, u32) {
        (self.range, self.role.bits(), self.id.raw())
    }
}

/// Occurrence whose id/kind denote the referenced entity.
pub type SymbolRef = Reference;
/// Occurrence whose id/kind denote the lexical parent.
pub type Use = Reference;

/// Insert into a range-sorted vector, dropping exact duplicates.
pub fn insert_sorted_unique(refs: &mut Vec<Reference>, r: Reference) {
    match refs.binary_search_by_key(&r.sort_key(), Reference::sort_key) {
        Ok(_) => {}
        Err(pos) => refs.insert(pos, r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering_is_lexicographic() {
        let a = Position::new(3, 7);
        let b = Position::new(3, 9);
        let c = Position::new(4, 1);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, Position::new(3, 7));
    }

    #[test]
    fn test_position_packing_roundtrip() {
        let p = Position::new(120_003, 451);
        assert_eq!(Position::from_packed(p.to_packed()), p);
    }

    #[test]
    fn test_range_contains_is_half_open() {
        let range = Range::from_coords(10, 5, 12, 3);

        assert!(range.contains(Position::new(10, 5)));
        assert!(range.contains(Position::new(11, 1)));
        assert!(!range.contains(Position::new(12, 3))); // end is exclusive
        assert!(!range.contains(Position::new(10, 4)));
    }

    #[test]
    fn test_range_containment() {
        let extent = Range::from_coords(1, 1, 10, 1);
        let spell = Range::from_coords(1, 6, 1, 9);

        assert!(extent.contains_range(spell));
        assert!(!spell.contains_range(extent));
        assert!(extent.contains_range(extent));
    }

    #[test]
    fn test_id_sentinel_and_widening() {
        let id = TypeId::new(4);
        assert!(id.is_valid());
        assert_eq!(id.erase().raw(), 4);
        assert_eq!(id.erase().cast::<Ty>(), id);

        assert!(!TypeId::NONE.is_valid());
        assert_eq!(TypeId::default(), TypeId::NONE);
    }

    #[test]
    fn test_id_equality_ignores_kind_at_runtime() {
        let a: AnyId = FuncId::new(9).into();
        let b: AnyId = VarId::new(9).into();
        assert_eq!(a, b);

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(TypeId::new(1));
        assert!(set.contains(&TypeId::new(1)));
        assert!(!set.contains(&TypeId::new(2)));
    }

    #[test]
    fn test_usr_is_stable_and_distinct() {
        let a = Usr::of("c:@N@ns@S@C@F@m#I#");
        let b = Usr::of("c:@N@ns@S@C@F@m#I#");
        let c = Usr::of("c:@N@ns@S@C");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, Usr::default());
    }

    #[test]
    fn test_role_composition() {
        let role = Role::DEFINITION | Role::DECLARATION;
        assert!(role.contains(Role::DECLARATION));
        assert!(!role.contains(Role::CALL));
    }

    #[test]
    fn test_insert_sorted_unique_orders_and_dedups() {
        let mut refs = Vec::new();
        let early = Reference::new(
            Range::from_coords(1, 1, 1, 4),
            AnyId::new(0),
            SymbolKind::Func,
            Role::REFERENCE,
        );
        let late = Reference::new(
            Range::from_coords(5, 1, 5, 4),
            AnyId::new(0),
            SymbolKind::Func,
            Role::CALL,
        );

        insert_sorted_unique(&mut refs, late);
        insert_sorted_unique(&mut refs, early);
        insert_sorted_unique(&mut refs, late); // duplicate

        assert_eq!(refs, vec![early, late]);
    }
}

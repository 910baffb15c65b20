//! Qualified-name synthesis.
//!
//! The frontend does not store qualified names; they are rebuilt by walking
//! the chain of enclosing containers (namespaces, classes, functions for
//! local types) and memoized per container cursor. Inline namespaces only
//! appear in the chain if the frontend reports them as visible containers.

use std::collections::HashMap;

use crate::frontend::CursorId;
use crate::types::LsSymbolKind;

/// A composed detailed name plus the offsets carving out its qualified and
/// short substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub detailed: String,
    pub qual_name_offset: u16,
    pub short_name_offset: u16,
    pub short_name_size: u16,
}

#[derive(Debug, Clone)]
struct ScopeEntry {
    name: String,
    parent: Option<CursorId>,
    kind: LsSymbolKind,
}

/// Cumulative prefix of a container chain, e.g. `ns::Widget::`.
/// `namespace_len` is the byte length of the leading pure-namespace portion
/// (`ns::`); it stops growing at the first non-namespace container.
#[derive(Debug, Clone, Default)]
struct Prefix {
    text: String,
    namespace_len: u16,
}

/// Memoizing cache of container scopes seen during one parse.
#[derive(Debug, Default)]
pub struct NamespaceCache {
    scopes: HashMap<CursorId, ScopeEntry>,
    resolved: HashMap<CursorId, Prefix>,
}

impl NamespaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a container declaration. Safe to call for every declaration;
    /// only cursors later named as containers are ever walked.
    pub fn record_scope(
        &mut self,
        cursor: CursorId,
        name: &str,
        parent: Option<CursorId>,
        kind: LsSymbolKind,
    ) {
        self.scopes.entry(cursor).or_insert_with(|| ScopeEntry {
            name: name.to_string(),
            parent,
            kind,
        });
    }

    fn prefix(&mut self, cursor: CursorId) -> Prefix {
        if let Some(prefix) = self.resolved.get(&cursor) {
            return prefix.clone();
        }
        let Some(entry) = self.scopes.get(&cursor).cloned() else {
            return Prefix::default();
        };

        let parent = match entry.parent {
            Some(parent) => self.prefix(parent),
            None => Prefix::default(),
        };

        let segment = if !entry.name.is_empty() {
            entry.name.as_str()
        } else if entry.kind == LsSymbolKind::Namespace {
            "(anonymous namespace)"
        } else {
            "(anonymous)"
        };

        let mut text = parent.text.clone();
        text.push_str(segment);
        text.push_str("::");

        // The pure-namespace head extends only while the whole chain so far
        // is namespaces.
        let namespace_len = if entry.kind == LsSymbolKind::Namespace
            && usize::from(parent.namespace_len) == parent.text.len()
        {
            text.len() as u16
        } else {
            parent.namespace_len
        };

        let prefix = Prefix {
            text,
            namespace_len,
        };
        self.resolved.insert(cursor, prefix.clone());
        prefix
    }

    /// Compose the detailed declaration string for `short_name` declared in
    /// `container`, surrounded by the frontend-provided detail texts.
    pub fn qualified(
        &mut self,
        container: Option<CursorId>,
        short_name: &str,
        detail_prefix: &str,
        detail_suffix: &str,
    ) -> QualifiedName {
        let scope = match container {
            Some(cursor) => self.prefix(cursor),
            None => Prefix::default(),
        };

        let detailed = format!("{detail_prefix}{}{short_name}{detail_suffix}", scope.text);
        QualifiedName {
            detailed,
            qual_name_offset: detail_prefix.len() as u16 + scope.namespace_len,
            short_name_offset: (detail_prefix.len() + scope.text.len()) as u16,
            short_name_size: short_name.len() as u16,
        }
    }
}

//! Serialized cache formats for `IndexFile`.
//!
//! Two wire formats share one version policy:
//!
//! * **Text**: JSON. Forward- and backward-compatible across field
//!   additions: unknown fields are ignored, missing fields default. Only a
//!   major-version mismatch rejects.
//! * **Binary**: bincode behind a `(major, minor)` header. Any version
//!   mismatch rejects; the format trades compatibility for compactness.
//!
//! `diagnostics` and `file_contents` never serialize, and the id cache is
//! rebuilt on load.

pub mod persistence;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::indexing::IndexFile;

pub use persistence::CacheStore;

/// Bumped on breaking changes to the entity model.
pub const MAJOR_VERSION: u32 = 1;
/// Bumped when the compact binary layout changes without a model change.
pub const MINOR_VERSION: u32 = 0;

#[derive(Serialize)]
struct TextCacheOut<'a> {
    major_version: u32,
    #[serde(flatten)]
    file: &'a IndexFile,
}

#[derive(Deserialize)]
struct TextCacheIn {
    #[serde(default)]
    major_version: u32,
    #[serde(flatten)]
    file: IndexFile,
}

pub fn to_text(file: &IndexFile) -> Result<String, CacheError> {
    Ok(serde_json::to_string_pretty(&TextCacheOut {
        major_version: MAJOR_VERSION,
        file,
    })?)
}

pub fn from_text(text: &str) -> Result<IndexFile, CacheError> {
    let cache: TextCacheIn = serde_json::from_str(text)?;
    if cache.major_version != MAJOR_VERSION {
        return Err(CacheError::MajorVersion {
            found: cache.major_version,
            expected: MAJOR_VERSION,
        });
    }
    let mut file = cache.file;
    file.rebuild_id_cache();
    Ok(file)
}

pub fn to_binary(file: &IndexFile) -> Result<Vec<u8>, CacheError> {
    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(&MAJOR_VERSION.to_le_bytes());
    out.extend_from_slice(&MINOR_VERSION.to_le_bytes());
    out.extend(bincode::serialize(file)?);
    Ok(out)
}

pub fn from_binary(bytes: &[u8]) -> Result<IndexFile, CacheError> {
    if bytes.len() < 8 {
        return Err(CacheError::Truncated);
    }
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[0..4]);
    let major = u32::from_le_bytes(word);
    word.copy_from_slice(&bytes[4..8]);
    let minor = u32::from_le_bytes(word);

    if major != MAJOR_VERSION {
        return Err(CacheError::MajorVersion {
            found: major,
            expected: MAJOR_VERSION,
        });
    }
    if minor != MINOR_VERSION {
        return Err(CacheError::MinorVersion {
            found: minor,
            expected: MINOR_VERSION,
        });
    }

    let mut file: IndexFile = bincode::deserialize(&bytes[8..])?;
    file.rebuild_id_cache();
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::DiagnosticSeverity;
    use crate::indexing::{Diagnostic, IndexInclude};
    use crate::types::{LsSymbolKind, Range, Usr};
    use std::path::PathBuf;

    fn sample_file() -> IndexFile {
        let mut file = IndexFile::new(
            PathBuf::from("/proj/widget.cc"),
            PathBuf::from("/proj/widget.cc"),
            vec!["-std=c++17".to_string()],
        );
        let ty = file.type_id(Usr::of("c:@S@Widget"));
        file.type_mut(ty).def.names.detailed_name = "Widget".to_string();
        file.type_mut(ty).def.names.short_name_size = 6;
        file.type_mut(ty).def.kind = LsSymbolKind::Class;
        let func = file.func_id(Usr::of("c:@S@Widget@F@draw#"));
        file.func_mut(func).def.declaring_type = Some(ty);
        file.type_mut(ty).def.funcs.push(func);
        file.includes.push(IndexInclude {
            line: 2,
            resolved_path: PathBuf::from("/proj/widget.h"),
        });
        file.dependencies.push(PathBuf::from("/proj/widget.h"));
        file.skipped_by_preprocessor
            .push(Range::from_coords(20, 1, 24, 7));
        file
    }

    #[test]
    fn test_text_roundtrip_preserves_equality() {
        let original = sample_file();
        let text = to_text(&original).unwrap();
        let restored = from_text(&text).unwrap();

        assert_eq!(original, restored);
        // The id cache is rebuilt, not deserialized.
        assert_eq!(
            restored.id_cache().type_id(Usr::of("c:@S@Widget")),
            original.id_cache().type_id(Usr::of("c:@S@Widget")),
        );
    }

    #[test]
    fn test_binary_roundtrip_preserves_equality() {
        let original = sample_file();
        let bytes = to_binary(&original).unwrap();
        let restored = from_binary(&bytes).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_diagnostics_and_contents_do_not_serialize() {
        let mut original = sample_file();
        original.file_contents = "class Widget {};".to_string();
        original.diagnostics.push(Diagnostic {
            range: Range::default(),
            severity: DiagnosticSeverity::Error,
            message: "boom".to_string(),
        });

        let restored = from_text(&to_text(&original).unwrap()).unwrap();
        assert!(restored.diagnostics.is_empty());
        assert!(restored.file_contents.is_empty());
        assert_eq!(original, restored);
    }

    #[test]
    fn test_text_ignores_unknown_and_defaults_missing_fields() {
        let text = format!(
            "{{\"major_version\":{MAJOR_VERSION},\"path\":\"/proj/x.cc\",\"new_field\":[1,2,3]}}"
        );
        let file = from_text(&text).unwrap();
        assert_eq!(file.path, PathBuf::from("/proj/x.cc"));
        assert!(file.types.is_empty());
        assert!(file.args.is_empty());
    }

    #[test]
    fn test_major_version_mismatch_rejects_both_formats() {
        let text = format!("{{\"major_version\":{},\"path\":\"/p\"}}", MAJOR_VERSION + 1);
        assert!(matches!(
            from_text(&text),
            Err(CacheError::MajorVersion { .. })
        ));

        let mut bytes = to_binary(&sample_file()).unwrap();
        bytes[0..4].copy_from_slice(&(MAJOR_VERSION + 1).to_le_bytes());
        assert!(matches!(
            from_binary(&bytes),
            Err(CacheError::MajorVersion { .. })
        ));
    }

    #[test]
    fn test_binary_minor_version_mismatch_rejects() {
        let mut bytes = to_binary(&sample_file()).unwrap();
        bytes[4..8].copy_from_slice(&(MINOR_VERSION + 1).to_le_bytes());
        assert!(matches!(
            from_binary(&bytes),
            Err(CacheError::MinorVersion { .. })
        ));
    }

    #[test]
    fn test_truncated_binary_rejects() {
        assert!(matches!(from_binary(&[1, 0, 0]), Err(CacheError::Truncated)));
    }
}

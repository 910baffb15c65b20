//! On-disk cache of serialized `IndexFile`s.
//!
//! One cache entry per indexed source file, written atomically (temp file,
//! then rename) so a crashed writer never leaves a torn entry behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IndexError, IndexResult};
use crate::indexing::IndexFile;
use crate::storage::{from_binary, from_text, to_binary, to_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFormat {
    Text,
    Binary,
}

/// Manages the cache directory for one project.
pub struct CacheStore {
    base_path: PathBuf,
    format: CacheFormat,
}

impl CacheStore {
    pub fn new(base_path: PathBuf, format: CacheFormat) -> Self {
        Self { base_path, format }
    }

    /// Cache entry path for a source file: the absolute source path with
    /// separators flattened, so one directory holds the whole project.
    fn entry_path(&self, source: &Path) -> PathBuf {
        let mut name = String::new();
        for ch in source.to_string_lossy().chars() {
            name.push(match ch {
                '/' | '\\' | ':' => '@',
                other => other,
            });
        }
        name.push_str(match self.format {
            CacheFormat::Text => ".json",
            CacheFormat::Binary => ".blob",
        });
        self.base_path.join(name)
    }

    #[must_use = "save errors should be handled to ensure the cache is persisted"]
    pub fn save(&self, file: &IndexFile) -> IndexResult<()> {
        fs::create_dir_all(&self.base_path).map_err(|e| IndexError::FileWrite {
            path: self.base_path.clone(),
            source: e,
        })?;

        let bytes = match self.format {
            CacheFormat::Text => to_text(file)?.into_bytes(),
            CacheFormat::Binary => to_binary(file)?,
        };

        let entry = self.entry_path(&file.path);
        let temp = entry.with_extension("tmp");
        fs::write(&temp, bytes).map_err(|e| IndexError::FileWrite {
            path: temp.clone(),
            source: e,
        })?;
        fs::rename(&temp, &entry).map_err(|e| IndexError::FileWrite {
            path: entry,
            source: e,
        })?;
        Ok(())
    }

    pub fn load(&self, source: &Path) -> IndexResult<IndexFile> {
        let entry = self.entry_path(source);
        let bytes = fs::read(&entry).map_err(|e| IndexError::FileRead {
            path: entry,
            source: e,
        })?;
        let file = match self.format {
            CacheFormat::Text => from_text(&String::from_utf8_lossy(&bytes))?,
            CacheFormat::Binary => from_binary(&bytes)?,
        };
        Ok(file)
    }

    pub fn exists(&self, source: &Path) -> bool {
        self.entry_path(source).exists()
    }

    pub fn clear(&self, source: &Path) -> std::io::Result<()> {
        let entry = self.entry_path(source);
        if entry.exists() {
            fs::remove_file(entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Usr;
    use tempfile::TempDir;

    fn sample() -> IndexFile {
        let mut file = IndexFile::new(
            PathBuf::from("/proj/a.cc"),
            PathBuf::from("/proj/a.cc"),
            Vec::new(),
        );
        file.func_id(Usr::of("c:@F@main#"));
        file
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        for format in [CacheFormat::Text, CacheFormat::Binary] {
            let dir = TempDir::new().unwrap();
            let store = CacheStore::new(dir.path().to_path_buf(), format);
            let file = sample();

            store.save(&file).unwrap();
            assert!(store.exists(Path::new("/proj/a.cc")));

            let loaded = store.load(Path::new("/proj/a.cc")).unwrap();
            assert_eq!(file, loaded);
        }
    }

    #[test]
    fn test_clear_removes_the_entry() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf(), CacheFormat::Text);
        store.save(&sample()).unwrap();

        store.clear(Path::new("/proj/a.cc")).unwrap();
        assert!(!store.exists(Path::new("/proj/a.cc")));
        assert!(store.load(Path::new("/proj/a.cc")).is_err());
    }

    #[test]
    fn test_entries_for_distinct_sources_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf(), CacheFormat::Text);

        let a = sample();
        let mut b = sample();
        b.path = PathBuf::from("/proj/b.cc");

        store.save(&a).unwrap();
        store.save(&b).unwrap();

        assert_eq!(store.load(Path::new("/proj/a.cc")).unwrap(), a);
        assert_eq!(store.load(Path::new("/proj/b.cc")).unwrap(), b);
    }
}

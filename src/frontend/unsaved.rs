//! Unsaved-buffer snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable bundle of `(path, contents)` overlays taken at parse start.
///
/// During the parse the frontend sees these buffers in place of the on-disk
/// contents. Paths must be absolute; the snapshot never changes once built,
/// so it can be shared freely across a reparse boundary.
#[derive(Debug, Clone, Default)]
pub struct UnsavedSnapshot {
    overlays: HashMap<PathBuf, Arc<str>>,
}

impl UnsavedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style addition of one overlay.
    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<Arc<str>>) -> Self {
        self.overlays.insert(path.into(), contents.into());
        self
    }

    /// The overlay for `path`, if one was captured.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.overlays.get(path).map(|s| s.as_ref())
    }

    pub fn overlays(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.overlays.iter().map(|(p, s)| (p.as_path(), s.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl<P: Into<PathBuf>, S: Into<Arc<str>>> FromIterator<(P, S)> for UnsavedSnapshot {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        Self {
            overlays: iter
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_lookup() {
        let snapshot = UnsavedSnapshot::new().with("/tmp/a.cc", "int main() {}");

        assert_eq!(snapshot.get(Path::new("/tmp/a.cc")), Some("int main() {}"));
        assert_eq!(snapshot.get(Path::new("/tmp/b.cc")), None);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_clone_shares_buffers() {
        let snapshot = UnsavedSnapshot::new().with("/tmp/a.cc", "x");
        let copy = snapshot.clone();

        assert_eq!(copy.get(Path::new("/tmp/a.cc")), Some("x"));
        assert!(!copy.is_empty());
    }
}

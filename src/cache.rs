//! Single-entry source file cache
//!
//! The source pane only ever shows the file the selected frame points at, so
//! the cache holds exactly one file's lines. Asking for a different path
//! replaces the entry wholesale; asking for the same path is free. A file
//! that cannot be read caches as "no source" so a frame sitting in a
//! stripped library does not hit the filesystem on every render.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct SourceCache {
    path: Option<PathBuf>,
    lines: Option<Vec<String>>,
}

impl SourceCache {
    pub fn new() -> Self {
        SourceCache::default()
    }

    /// Lines of `path`, loading on first access or path change.
    /// `None` when the file is missing or unreadable.
    pub fn lines(&mut self, path: &Path) -> Option<&[String]> {
        if self.path.as_deref() != Some(path) {
            self.path = Some(path.to_path_buf());
            self.lines = fs::read_to_string(path)
                .ok()
                .map(|text| text.lines().map(str::to_string).collect());
        }
        self.lines.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_loads_and_splits_lines() {
        let path = temp_file("tdbg_cache_basic.txt", "one\ntwo\nthree\n");
        let mut cache = SourceCache::new();
        let lines = cache.lines(&path).unwrap();
        assert_eq!(lines, ["one", "two", "three"]);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_no_source() {
        let mut cache = SourceCache::new();
        assert!(cache
            .lines(Path::new("/definitely/not/here.c"))
            .is_none());
    }

    #[test]
    fn test_path_change_replaces_entry() {
        let a = temp_file("tdbg_cache_a.txt", "aaa\n");
        let b = temp_file("tdbg_cache_b.txt", "bbb\nccc\n");
        let mut cache = SourceCache::new();
        assert_eq!(cache.lines(&a).unwrap().len(), 1);
        assert_eq!(cache.lines(&b).unwrap().len(), 2);
        assert_eq!(cache.lines(&b).unwrap()[0], "bbb");
        fs::remove_file(&a).ok();
        fs::remove_file(&b).ok();
    }
}

// src/cache/mod.rs

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};
use tracing::{debug, info};

use crate::process::canonical::CanonicalTable;

/// Identity of a source file's contents as far as reloading is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceFingerprint {
    pub modified: SystemTime,
    pub len: u64,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta =
            fs::metadata(path).with_context(|| format!("reading metadata of {:?}", path))?;
        Ok(Self {
            modified: meta
                .modified()
                .with_context(|| format!("reading mtime of {:?}", path))?,
            len: meta.len(),
        })
    }
}

struct CacheEntry {
    fingerprint: SourceFingerprint,
    table: Arc<CanonicalTable>,
}

/// Canonical tables keyed by source path, rebuilt whenever the file's
/// fingerprint changes. Owned by the caller; nothing is process-global.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached table for `path`, or build it with `load` when the
    /// path is new or its fingerprint changed. A failed load leaves any
    /// previous entry untouched.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<CanonicalTable>>
    where
        F: FnOnce(&Path) -> Result<CanonicalTable>,
    {
        let fingerprint = SourceFingerprint::of(path)?;
        if let Some(entry) = self.entries.get(path) {
            if entry.fingerprint == fingerprint {
                debug!(path = %path.display(), "cache hit");
                return Ok(Arc::clone(&entry.table));
            }
            info!(path = %path.display(), "source changed; rebuilding");
        }

        let table = Arc::new(load(path)?);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                fingerprint,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `path`. Returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{
        load_raw_csv,
        normalize::{normalize, NormalizeOptions},
    };
    use std::cell::Cell;
    use std::time::Duration;
    use tempfile::tempdir;

    fn loader(calls: &Cell<u32>) -> impl FnOnce(&Path) -> Result<CanonicalTable> + '_ {
        move |p: &Path| {
            calls.set(calls.get() + 1);
            Ok(normalize(&load_raw_csv(p)?, &NormalizeOptions::default())?)
        }
    }

    #[test]
    fn hit_miss_and_invalidate() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("trips.csv");
        fs::write(&path, "date\n2022-01-01\n")?;

        let calls = Cell::new(0);
        let mut cache = TableCache::new();

        let a = cache.get_or_load(&path, loader(&calls))?;
        let b = cache.get_or_load(&path, loader(&calls))?;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);

        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        let c = cache.get_or_load(&path, loader(&calls))?;
        assert_eq!(calls.get(), 2);
        assert_eq!(*a, *c);
        Ok(())
    }

    #[test]
    fn rewritten_file_is_reloaded() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("trips.csv");
        fs::write(&path, "date\n2022-01-01\n")?;

        let calls = Cell::new(0);
        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path, loader(&calls))?;
        assert_eq!(first.num_rows(), 1);

        // Different length, so the fingerprint changes even on coarse mtimes.
        fs::write(&path, "date\n2022-01-01\n2022-01-02\n")?;
        let f = fs::File::options().write(true).open(&path)?;
        f.set_modified(SystemTime::now() + Duration::from_secs(5))?;

        let second = cache.get_or_load(&path, loader(&calls))?;
        assert_eq!(calls.get(), 2);
        assert_eq!(second.num_rows(), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        Ok(())
    }

    #[test]
    fn missing_source_is_an_error() {
        let mut cache = TableCache::new();
        let res = cache.get_or_load(Path::new("/no/such/trips.csv"), |_| {
            unreachable!("loader must not run")
        });
        assert!(res.is_err());
    }
}

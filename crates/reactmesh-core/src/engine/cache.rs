use super::error::CacheError;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

type Index = BTreeMap<String, String>;

pub const BROKEN_SUFFIX: &str = ".broken";

/// Persistent map from cache key to public asset path.
///
/// The JSON index is read lazily on first access and rewritten atomically after every
/// change. A single mutex covers each read-modify-write, so concurrent writers never
/// lose each other's entries within one process. An unreadable index is moved aside
/// to `<index>.broken` and replaced by an empty one.
#[derive(Debug)]
pub struct ArtifactCache {
    path: PathBuf,
    state: Mutex<Option<Index>>,
}

impl ArtifactCache {
    pub fn open(index_path: impl Into<PathBuf>) -> Self {
        Self {
            path: index_path.into(),
            state: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<Index>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hydrated<'a>(&self, slot: &'a mut Option<Index>) -> &'a mut Index {
        slot.get_or_insert_with(|| load_index(&self.path))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let mut slot = self.lock();
        self.hydrated(&mut slot).get(key).cloned()
    }

    pub fn set(&self, key: &str, public_path: &str) -> Result<(), CacheError> {
        let mut slot = self.lock();
        let index = self.hydrated(&mut slot);
        let previous = index.insert(key.to_string(), public_path.to_string());
        if let Err(err) = persist_index(&self.path, index) {
            // Keep the mirror identical to what is on disk.
            match previous {
                Some(old) => index.insert(key.to_string(), old),
                None => index.remove(key),
            };
            return Err(err);
        }
        debug!(key, public_path, "Cache index updated.");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut slot = self.lock();
        let index = self.hydrated(&mut slot);
        let Some(previous) = index.remove(key) else {
            return Ok(None);
        };
        if let Err(err) = persist_index(&self.path, index) {
            index.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(Some(previous))
    }

    /// Snapshot of every entry, ordered by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut slot = self.lock();
        self.hydrated(&mut slot)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        let mut slot = self.lock();
        self.hydrated(&mut slot).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn broken_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BROKEN_SUFFIX);
    PathBuf::from(name)
}

fn load_index(path: &Path) -> Index {
    let parsed = match fs::read(path) {
        Ok(bytes) => serde_json::from_slice::<Index>(&bytes).map_err(|err| err.to_string()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No cache index yet, starting empty.");
            return Index::new();
        }
        Err(err) => Err(err.to_string()),
    };

    match parsed {
        Ok(index) => {
            debug!(path = %path.display(), entries = index.len(), "Cache index loaded.");
            index
        }
        Err(reason) => {
            move_aside(path, &reason);
            Index::new()
        }
    }
}

/// Renames an unusable index to `<index>.broken` so the next write cannot clobber it.
fn move_aside(path: &Path, reason: &str) {
    let broken = broken_path(path);
    match fs::rename(path, &broken) {
        Ok(()) => warn!(
            path = %path.display(),
            moved_to = %broken.display(),
            error = %reason,
            "Cache index is unusable; moved aside and starting empty."
        ),
        Err(rename_err) => warn!(
            path = %path.display(),
            error = %reason,
            rename_error = %rename_err,
            "Cache index is unusable and could not be moved aside; starting empty."
        ),
    }
}

fn persist_index(path: &Path, index: &Index) -> Result<(), CacheError> {
    let fail = |source: io::Error| CacheError::Persist {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(fail)?;

    // Dropping the temp file without persisting removes it.
    let mut tmp = NamedTempFile::new_in(dir).map_err(fail)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, index).map_err(|e| fail(io::Error::other(e)))?;
        writer.write_all(b"\n").map_err(fail)?;
        writer.flush().map_err(fail)?;
    }
    tmp.as_file().sync_all().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn missing_index_reads_as_empty() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::open(dir.path().join("models/cache_index.json"));
        assert_eq!(cache.get("water"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_survive_a_new_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models/cache_index.json");
        {
            let cache = ArtifactCache::open(&path);
            cache.set("water", "/media/models/water.glb").unwrap();
            cache.set("ethanol", "/media/models/ethanol.glb").unwrap();
        }
        let reopened = ArtifactCache::open(&path);
        assert_eq!(reopened.get("water").as_deref(), Some("/media/models/water.glb"));
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn set_overwrites_existing_entry() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::open(dir.path().join("idx.json"));
        cache.set("k", "/media/models/a.glb").unwrap();
        cache.set("k", "/media/models/b.glb").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("/media/models/b.glb"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn corrupt_index_is_moved_aside_and_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        fs::write(&path, "{ this is not json").unwrap();

        let cache = ArtifactCache::open(&path);
        assert_eq!(cache.get("anything"), None);

        let broken = dir.path().join("cache_index.json.broken");
        assert_eq!(fs::read_to_string(&broken).unwrap(), "{ this is not json");
        assert!(!path.exists());

        cache.set("water", "/media/models/water.glb").unwrap();
        let on_disk: Index = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("water").map(String::as_str), Some("/media/models/water.glb"));
    }

    #[test]
    fn non_utf8_index_is_moved_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        let garbage = [0xff, 0xfe, 0x00, 0x9c, 0x80];
        fs::write(&path, garbage).unwrap();

        let cache = ArtifactCache::open(&path);
        assert_eq!(cache.get("water"), None);
        let broken = dir.path().join("cache_index.json.broken");
        assert!(!path.exists());

        cache.set("water", "/media/models/water.glb").unwrap();
        assert_eq!(fs::read(&broken).unwrap(), garbage);
        assert_eq!(
            ArtifactCache::open(&path).get("water").as_deref(),
            Some("/media/models/water.glb")
        );
    }

    #[test]
    fn index_path_that_is_a_directory_is_moved_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        fs::create_dir(&path).unwrap();

        let cache = ArtifactCache::open(&path);
        assert!(cache.is_empty());
        assert!(dir.path().join("cache_index.json.broken").is_dir());
        cache.set("water", "/media/models/water.glb").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn non_string_values_count_as_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        fs::write(&path, r#"{"water": 3}"#).unwrap();
        let cache = ArtifactCache::open(&path);
        assert!(cache.is_empty());
        assert!(dir.path().join("cache_index.json.broken").exists());
    }

    #[test]
    fn remove_deletes_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        let cache = ArtifactCache::open(&path);
        cache.set("a", "/media/models/a.glb").unwrap();
        assert_eq!(cache.remove("a").unwrap().as_deref(), Some("/media/models/a.glb"));
        assert_eq!(cache.remove("a").unwrap(), None);
        assert!(ArtifactCache::open(&path).is_empty());
    }

    #[test]
    fn concurrent_writers_do_not_lose_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache_index.json");
        let cache = Arc::new(ArtifactCache::open(&path));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .set(&format!("k{i}"), &format!("/media/models/k{i}.glb"))
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ArtifactCache::open(&path).len(), 8);
    }

    #[test]
    fn no_temp_files_are_left_behind() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::open(dir.path().join("cache_index.json"));
        cache.set("a", "/media/models/a.glb").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("cache_index.json")]);
    }
}

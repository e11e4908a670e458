//! Document cache keyed by canonical reference.
//!
//! Records live in memory and, when enabled, are mirrored under the cache
//! directory as JSON files named by a hash of the reference. Disk errors are
//! ignored so a broken cache never blocks reading.

use crate::config::AppConfig;
use crate::document::DocumentRecord;
use crate::reference::Reference;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: HashMap<String, DocumentRecord>,
    prefetching: HashSet<String>,
    disk_dir: Option<PathBuf>,
}

impl DocumentCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_disk(dir: impl Into<PathBuf>) -> Self {
        Self {
            disk_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        if config.persist_cache {
            Self::with_disk(Path::new(&config.cache_dir).join("texts"))
        } else {
            Self::in_memory()
        }
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.entries.contains_key(&cache_key(reference))
    }

    /// Cached record for `reference`, consulting the disk mirror on a miss.
    pub fn get(&mut self, reference: &Reference) -> Option<DocumentRecord> {
        let key = cache_key(reference);
        if let Some(record) = self.entries.get(&key) {
            return Some(record.clone());
        }
        let dir = self.disk_dir.as_ref()?;
        let data = fs::read_to_string(record_path(dir, &key)).ok()?;
        let record: DocumentRecord = serde_json::from_str(&data).ok()?;
        debug!(%key, "Loaded document from disk cache");
        self.entries.insert(key, record.clone());
        Some(record)
    }

    pub fn save(&mut self, reference: &Reference, record: &DocumentRecord) {
        let key = cache_key(reference);
        self.prefetching.remove(&key);
        if let Some(dir) = &self.disk_dir {
            let _ = fs::create_dir_all(dir);
            if let Ok(contents) = serde_json::to_string(record) {
                let _ = fs::write(record_path(dir, &key), contents);
            }
        }
        self.entries.insert(key, record.clone());
    }

    /// Mark `reference` for prefetch. Returns true when a fetch is needed,
    /// i.e. it is neither cached nor already being prefetched.
    pub fn prefetch(&mut self, reference: &Reference) -> bool {
        if self.get(reference).is_some() {
            return false;
        }
        self.prefetching.insert(cache_key(reference))
    }

    /// Forget a prefetch that failed so a later attempt can retry.
    pub fn abandon_prefetch(&mut self, reference: &Reference) {
        self.prefetching.remove(&cache_key(reference));
    }

    /// Drop `reference` from memory and the disk mirror.
    pub fn invalidate(&mut self, reference: &Reference) {
        let key = cache_key(reference);
        self.entries.remove(&key);
        self.prefetching.remove(&key);
        if let Some(dir) = &self.disk_dir {
            let _ = fs::remove_file(record_path(dir, &key));
        }
        debug!(%key, "Invalidated cached document");
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.prefetching.clear();
        if let Some(dir) = &self.disk_dir {
            let _ = fs::remove_dir_all(dir);
        }
        debug!("Invalidated document cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cache_key(reference: &Reference) -> String {
    reference.url()
}

fn record_path(dir: &Path, key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    dir.join(format!("{:x}.json", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("layered_reader_test_{name}_{nanos}"))
    }

    fn record(reference: &str) -> DocumentRecord {
        DocumentRecord {
            reference: reference.to_string(),
            ..DocumentRecord::default()
        }
    }

    #[test]
    fn save_then_get_in_memory() {
        let mut cache = DocumentCache::in_memory();
        let reference = Reference::parse_loose("Genesis 1").unwrap();
        assert!(cache.get(&reference).is_none());
        cache.save(&reference, &record("Genesis.1"));
        assert_eq!(
            cache.get(&reference).map(|r| r.reference),
            Some("Genesis.1".to_string())
        );
    }

    #[test]
    fn prefetch_is_requested_once() {
        let mut cache = DocumentCache::in_memory();
        let reference = Reference::parse_loose("Genesis 2").unwrap();
        assert!(cache.prefetch(&reference));
        assert!(!cache.prefetch(&reference));
        cache.abandon_prefetch(&reference);
        assert!(cache.prefetch(&reference));
        cache.save(&reference, &record("Genesis.2"));
        assert!(!cache.prefetch(&reference));
    }

    #[test]
    fn disk_mirror_survives_a_new_cache() {
        let dir = unique_temp_dir("mirror");
        let reference = Reference::parse_loose("Exodus 3").unwrap();
        {
            let mut cache = DocumentCache::with_disk(&dir);
            cache.save(&reference, &record("Exodus.3"));
        }
        let mut reopened = DocumentCache::with_disk(&dir);
        assert!(!reopened.contains(&reference));
        assert!(reopened.get(&reference).is_some());

        reopened.invalidate_all();
        assert!(reopened.is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn invalidating_one_reference_keeps_the_rest() {
        let dir = unique_temp_dir("single");
        let first = Reference::parse_loose("Exodus 3").unwrap();
        let second = Reference::parse_loose("Exodus 4").unwrap();
        let mut cache = DocumentCache::with_disk(&dir);
        cache.save(&first, &record("Exodus.3"));
        cache.save(&second, &record("Exodus.4"));

        cache.invalidate(&first);
        assert!(cache.get(&first).is_none());
        assert!(cache.get(&second).is_some());

        let mut reopened = DocumentCache::with_disk(&dir);
        assert!(reopened.get(&first).is_none());
        reopened.invalidate_all();
    }
}

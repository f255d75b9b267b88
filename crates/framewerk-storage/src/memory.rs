// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory object store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use framewerk_core::error::{FramewerkError, Result};
use tracing::debug;

use crate::ObjectStore;

/// A stored object with the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

type Objects = HashMap<(String, String), StoredObject>;

/// Object store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Objects>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (content type `application/octet-stream`).
    pub fn insert(&self, bucket: &str, key: &str, data: Vec<u8>) {
        self.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: "application/octet-stream".into(),
            },
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Sorted keys of every object in `bucket`.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-written, so a
    // poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Objects> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectStore for MemoryObjectStore {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.get(bucket, key)
            .map(|object| object.data)
            .ok_or_else(|| FramewerkError::NotFound(format!("{bucket}/{key}")))
    }

    fn store(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        debug!(bucket, key, bytes = data.len(), content_type, "object stored in memory");
        self.lock().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_records_content_type() {
        let store = MemoryObjectStore::new();
        let key = store.store("out", "a.jpg", b"abc", "image/jpeg").expect("store");
        assert_eq!(key, "a.jpg");
        assert_eq!(
            store.get("out", "a.jpg"),
            Some(StoredObject {
                data: b"abc".to_vec(),
                content_type: "image/jpeg".into()
            })
        );
    }

    #[test]
    fn buckets_are_separate() {
        let store = MemoryObjectStore::new();
        store.insert("in", "a.png", vec![1]);
        assert!(store.fetch("out", "a.png").is_err());
        assert_eq!(store.fetch("in", "a.png").expect("fetch"), vec![1]);
        assert_eq!(store.keys("in"), ["a.png"]);
        assert!(store.keys("out").is_empty());
    }
}

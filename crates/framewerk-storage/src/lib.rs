// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// framewerk-storage — object storage collaborator for the Framewerk services.
//
// The services only ever read a source object and write one result, so the
// store surface is two calls. `FsObjectStore` maps buckets to directories;
// `MemoryObjectStore` keeps everything in a map for tests and embedding.

pub mod fs;
pub mod memory;

use framewerk_core::error::Result;

pub use fs::FsObjectStore;
pub use memory::{MemoryObjectStore, StoredObject};

/// Bucket/key object storage.
///
/// Implementations are shared across request tasks and must be thread-safe.
pub trait ObjectStore: Send + Sync {
    /// Read the full contents of `bucket/key`.
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write `data` to `bucket/key` and return the key it was stored under.
    fn store(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> Result<String>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        (**self).fetch(bucket, key)
    }

    fn store(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        (**self).store(bucket, key, data, content_type)
    }
}

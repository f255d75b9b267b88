// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem-backed object store: `<root>/<bucket>/<key>`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use framewerk_core::error::{FramewerkError, Result};
use tracing::{debug, info, instrument};

use crate::ObjectStore;

/// Buckets are directories directly under `root`; keys are relative paths
/// inside them. Keys may contain `.` segments (result keys at a bucket root
/// start with `./`) but never `..` or a leading `/`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `bucket/key` to a path under the root, rejecting anything that
    /// could escape it.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(FramewerkError::Storage(format!("invalid bucket name: {bucket:?}")));
        }

        let mut path = self.root.join(bucket);
        let mut has_file = false;
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => {
                    path.push(part);
                    has_file = true;
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FramewerkError::Storage(format!(
                        "object key escapes its bucket: {key:?}"
                    )));
                }
            }
        }
        if !has_file {
            return Err(FramewerkError::Storage(format!("empty object key: {key:?}")));
        }
        Ok(path)
    }
}

impl ObjectStore for FsObjectStore {
    #[instrument(skip(self))]
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        let data = std::fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => FramewerkError::NotFound(format!("{bucket}/{key}")),
            _ => FramewerkError::Storage(format!("read {}: {err}", path.display())),
        })?;
        debug!(bytes = data.len(), "object read");
        Ok(data)
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    fn store(&self, bucket: &str, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                FramewerkError::Storage(format!("create {}: {err}", parent.display()))
            })?;
        }
        std::fs::write(&path, data)
            .map_err(|err| FramewerkError::Storage(format!("write {}: {err}", path.display())))?;
        info!(bucket, key, content_type, "Uploaded");
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_fetch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());

        let key = store
            .store("edited", "2024/out/cat_Grayscale.jpg", b"jpeg-bytes", "image/jpeg")
            .expect("store");
        assert_eq!(key, "2024/out/cat_Grayscale.jpg");
        assert!(dir.path().join("edited/2024/out/cat_Grayscale.jpg").is_file());

        let data = store.fetch("edited", &key).expect("fetch");
        assert_eq!(data, b"jpeg-bytes");
    }

    #[test]
    fn dot_prefixed_keys_stay_inside_bucket() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());
        store
            .store("out", "./thumbs/a_Blur.jpg", b"x", "image/jpeg")
            .expect("store");
        assert!(dir.path().join("out/thumbs/a_Blur.jpg").is_file());
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());
        let err = store.fetch("uploads", "nope.png").expect_err("missing");
        assert!(matches!(err, FramewerkError::NotFound(_)));
    }

    #[test]
    fn traversal_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());
        for key in ["../secret", "a/../../b", "/etc/passwd", "", "./"] {
            let err = store.fetch("uploads", key).expect_err(key);
            assert!(matches!(err, FramewerkError::Storage(_)), "{key}: {err}");
        }
    }

    #[test]
    fn bad_bucket_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());
        for bucket in ["", "..", "a/b"] {
            assert!(store.store(bucket, "k.jpg", b"x", "image/jpeg").is_err(), "{bucket}");
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request handlers behind the HTTP routes: edit (validate chain, fetch,
// decode, run pipeline, encode once, store) and resize.
//
// Handlers are synchronous and CPU-bound; the server runs them on the
// blocking pool. A failure at any point returns before `store`, so a failed
// request never leaves a partial result behind.

use framewerk_core::config::ServiceConfig;
use framewerk_core::error::{FramewerkError, Result};
use framewerk_core::naming;
use framewerk_core::types::{EditRequest, ObjectRef, ResizeRequest};
use framewerk_pipeline::{JPEG_CONTENT_TYPE, Pipeline, codec, resize_to_width};
use framewerk_storage::ObjectStore;
use tracing::{info, instrument};

/// Editor and resize handlers over an object store.
pub struct EditorService<S> {
    store: S,
    jpeg_quality: u8,
    max_output_pixels: u64,
}

impl<S: ObjectStore> EditorService<S> {
    pub fn new(store: S, config: &ServiceConfig) -> Self {
        Self {
            store,
            jpeg_quality: config.jpeg_quality,
            max_output_pixels: config.max_output_pixels,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply `request.chain` to the source object and store the JPEG result.
    ///
    /// The chain is validated before the source is fetched.
    #[instrument(skip_all, fields(bucket = %request.bucket, object = %request.object, steps = request.chain.len()))]
    pub fn edit(&self, request: &EditRequest) -> Result<ObjectRef> {
        require("bucket", &request.bucket)?;
        require("object", &request.object)?;
        require("output", &request.output)?;
        let pipeline = Pipeline::new(&request.chain)?;

        let source = self.store.fetch(&request.bucket, &request.object)?;
        let image = codec::decode(&source)?;
        let edited = pipeline.execute(image)?;
        let encoded = codec::encode_jpeg(&edited, self.jpeg_quality)?;

        let key = naming::edit_output_key(
            &request.object,
            &request.output_path,
            pipeline.operation_names(),
        );
        let object = self
            .store
            .store(&request.output, &key, &encoded, JPEG_CONTENT_TYPE)?;

        info!(output = %request.output, key = %object, bytes = encoded.len(), "edit stored");
        Ok(ObjectRef {
            object,
            bucket: request.output.clone(),
        })
    }

    /// Resize the source object to `request.width` and store the JPEG result.
    #[instrument(skip_all, fields(bucket = %request.bucket, object = %request.object, width = request.width))]
    pub fn resize(&self, request: &ResizeRequest) -> Result<ObjectRef> {
        require("bucket", &request.bucket)?;
        require("object", &request.object)?;
        require("output", &request.output)?;
        if request.width == 0 {
            return Err(FramewerkError::InvalidRequest(
                "width must be greater than zero".into(),
            ));
        }

        let source = self.store.fetch(&request.bucket, &request.object)?;
        let image = codec::decode(&source)?;
        let resized = resize_to_width(image, request.width, self.max_output_pixels)?;
        let encoded = codec::encode_jpeg(&resized, self.jpeg_quality)?;

        let key = naming::resize_output_key(&request.object, &request.output_path, request.width);
        let object = self
            .store
            .store(&request.output, &key, &encoded, JPEG_CONTENT_TYPE)?;

        info!(output = %request.output, key = %object, "resize stored");
        Ok(ObjectRef {
            object,
            bucket: request.output.clone(),
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FramewerkError::InvalidRequest(format!("missing {field}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewerk_core::error::{ExecutionError, ValidationError};
    use framewerk_core::types::{Chain, Operation};
    use framewerk_storage::MemoryObjectStore;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
        let mut buffer = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("encode png");
        buffer
    }

    fn service() -> EditorService<MemoryObjectStore> {
        let store = MemoryObjectStore::new();
        store.insert("uploads", "2024/cat.png", png(16, 8));
        EditorService::new(store, &ServiceConfig::default())
    }

    fn edit_request(chain: &str) -> EditRequest {
        EditRequest {
            bucket: "uploads".into(),
            object: "2024/cat.png".into(),
            chain: serde_json::from_str::<Chain>(chain).expect("parse chain"),
            output: "edited".into(),
            output_path: "out".into(),
        }
    }

    #[test]
    fn edit_stores_jpeg_under_derived_name() {
        let service = service();
        let result = service
            .edit(&edit_request(r#"[{"AdjustBrightness": 20}, {"Grayscale": null}]"#))
            .expect("edit");

        assert_eq!(
            result,
            ObjectRef {
                object: "2024/out/cat_AdjustBrightness_Grayscale.jpg".into(),
                bucket: "edited".into(),
            }
        );
        let stored = service
            .store()
            .get("edited", &result.object)
            .expect("result stored");
        assert_eq!(stored.content_type, "image/jpeg");
        let decoded = codec::decode(&stored.data).expect("stored jpeg decodes");
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn unknown_operation_is_rejected_before_fetch() {
        // No source object exists: a fetch would fail with NotFound instead.
        let service = EditorService::new(MemoryObjectStore::new(), &ServiceConfig::default());
        let err = service
            .edit(&edit_request(r#"[{"Grayscale": null}, {"Sepia": null}]"#))
            .expect_err("unknown op");
        assert!(matches!(
            err,
            FramewerkError::Validation(ValidationError::UnknownOperation(ref name)) if name == "Sepia"
        ));
        assert!(service.store().is_empty());
    }

    #[test]
    fn failed_step_stores_nothing() {
        let service = service();
        let mut request = edit_request("[]");
        request.chain = Chain::new(vec![
            Operation::bare("Grayscale"),
            Operation::with_param("Blur", f64::NAN),
        ]);

        let err = service.edit(&request).expect_err("blur must fail");
        assert!(matches!(
            err,
            FramewerkError::Execution(ExecutionError::StepFailed { index: 1, ref name, .. }) if name == "Blur"
        ));
        assert!(service.store().keys("edited").is_empty());
    }

    #[test]
    fn undecodable_source_is_decode_error() {
        let store = MemoryObjectStore::new();
        store.insert("uploads", "2024/cat.png", b"not a png".to_vec());
        let service = EditorService::new(store, &ServiceConfig::default());
        let err = service
            .edit(&edit_request(r#"[{"Grayscale": null}]"#))
            .expect_err("decode");
        assert!(matches!(err, FramewerkError::Decode(_)));
        assert!(service.store().keys("edited").is_empty());
    }

    #[test]
    fn missing_source_is_not_found() {
        let service = EditorService::new(MemoryObjectStore::new(), &ServiceConfig::default());
        let err = service.edit(&edit_request("[]")).expect_err("missing");
        assert!(matches!(err, FramewerkError::NotFound(_)));
    }

    #[test]
    fn empty_output_bucket_is_invalid() {
        let service = service();
        let mut request = edit_request("[]");
        request.output.clear();
        assert!(matches!(
            service.edit(&request),
            Err(FramewerkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn resize_stores_scaled_copy() {
        let service = service();
        let result = service
            .resize(&ResizeRequest {
                bucket: "uploads".into(),
                object: "2024/cat.png".into(),
                width: 8,
                output: "small".into(),
                output_path: "thumbs".into(),
            })
            .expect("resize");
        assert_eq!(result.object, "thumbs/2024/cat_resize_w8.jpg");
        assert_eq!(result.bucket, "small");

        let stored = service.store().get("small", &result.object).expect("stored");
        let decoded = codec::decode(&stored.data).expect("decodes");
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn edit_against_filesystem_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = framewerk_storage::FsObjectStore::new(dir.path());
        store
            .store("uploads", "beach.png", &png(6, 6), "image/png")
            .expect("seed");
        let service = EditorService::new(store, &ServiceConfig::default());

        let result = service
            .edit(&EditRequest {
                bucket: "uploads".into(),
                object: "beach.png".into(),
                chain: serde_json::from_str(r#"{"AdjustGamma": 1.8, "Blur": 0.5}"#)
                    .expect("parse chain"),
                output: "edited".into(),
                output_path: "warm".into(),
            })
            .expect("edit");

        assert_eq!(result.object, "./warm/beach_AdjustGamma_Blur.jpg");
        assert!(dir.path().join("edited/warm/beach_AdjustGamma_Blur.jpg").is_file());
    }

    #[test]
    fn resize_beyond_pixel_budget_is_invalid() {
        let service = service();
        let err = service
            .resize(&ResizeRequest {
                bucket: "uploads".into(),
                object: "2024/cat.png".into(),
                width: 4_000_000_000,
                output: "small".into(),
                output_path: String::new(),
            })
            .expect_err("oversized");
        assert!(matches!(err, FramewerkError::InvalidRequest(_)));
        assert!(service.store().keys("small").is_empty());
    }

    #[test]
    fn resize_to_zero_is_invalid() {
        let service = service();
        let err = service
            .resize(&ResizeRequest {
                bucket: "uploads".into(),
                object: "2024/cat.png".into(),
                width: 0,
                output: "small".into(),
                output_path: String::new(),
            })
            .expect_err("zero width");
        assert!(matches!(err, FramewerkError::InvalidRequest(_)));
    }
}

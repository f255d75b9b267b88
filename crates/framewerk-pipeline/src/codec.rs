// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decode/encode at the pipeline boundary. Pipelines work on decoded
// rasters only; encoding happens once, after the last step.

use framewerk_core::error::{FramewerkError, Result};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};

/// Content type of everything [`encode_jpeg`] produces.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Decode raw bytes (JPEG, PNG, GIF, WebP, ...) into a raster.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| FramewerkError::Decode(err.to_string()))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    Ok(img)
}

/// Encode as baseline JPEG at `quality` (1-100). Alpha is discarded.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| FramewerkError::Encode(format!("JPEG encoding failed: {err}")))?;
    debug!(bytes = buffer.len(), "Image encoded as JPEG");
    Ok(buffer)
}

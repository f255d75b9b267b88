// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Width-driven resize used by the resize endpoint.

use framewerk_core::error::{FramewerkError, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use tracing::{debug, info, instrument};

/// Resize to `width` pixels wide, preserving the aspect ratio. Uses Lanczos3
/// filtering; the derived height is rounded and never below 1.
///
/// Targets of more than `max_pixels` pixels are refused before anything is
/// allocated.
#[instrument(skip(image))]
pub fn resize_to_width(image: DynamicImage, width: u32, max_pixels: u64) -> Result<DynamicImage> {
    if width == 0 {
        return Err(FramewerkError::InvalidRequest(
            "resize width must be greater than zero".into(),
        ));
    }
    let (from_w, from_h) = (image.width(), image.height());
    if from_w == 0 || from_h == 0 {
        return Err(FramewerkError::InvalidRequest(format!(
            "cannot resize an empty image ({from_w}x{from_h})"
        )));
    }

    let height = ((u64::from(from_h) * u64::from(width) + u64::from(from_w) / 2)
        / u64::from(from_w))
    .max(1);
    let pixels = u64::from(width).saturating_mul(height);
    if height > u64::from(u32::MAX) || pixels > max_pixels {
        return Err(FramewerkError::InvalidRequest(format!(
            "resize target {width}x{height} exceeds the {max_pixels} pixel limit"
        )));
    }
    let height = height as u32;

    info!(from_w, from_h, width, height, "Resizing image");
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);
    debug!(
        new_w = resized.width(),
        new_h = resized.height(),
        "Resize complete"
    );
    Ok(resized)
}

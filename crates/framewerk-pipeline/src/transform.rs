// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The builtin transforms: grayscale, brightness, saturation, contrast, blur
// and gamma. Each is a pure function from an image (plus its parameter) to a
// new RGBA image; alpha is carried through untouched except by `blur`.

use framewerk_core::error::TransformFault;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::filter::gaussian_blur_f32;

use crate::registry::TransformKind;

/// A transform bound to its typed parameter.
///
/// Dispatch is a single exhaustive `match` in [`Transform::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Grayscale,
    /// Percentage in -100..=100.
    AdjustBrightness { percentage: f64 },
    /// Percentage in -100..=500.
    AdjustSaturation { percentage: f64 },
    /// Percentage in -100..=100.
    AdjustContrast { percentage: f64 },
    /// Gaussian sigma in pixels; non-positive values leave the image as is.
    Blur { sigma: f64 },
    /// Gamma correction; 1.0 is the identity.
    AdjustGamma { gamma: f64 },
}

impl Transform {
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Grayscale => TransformKind::Grayscale,
            Transform::AdjustBrightness { .. } => TransformKind::AdjustBrightness,
            Transform::AdjustSaturation { .. } => TransformKind::AdjustSaturation,
            Transform::AdjustContrast { .. } => TransformKind::AdjustContrast,
            Transform::Blur { .. } => TransformKind::Blur,
            Transform::AdjustGamma { .. } => TransformKind::AdjustGamma,
        }
    }

    pub fn apply(self, image: DynamicImage) -> Result<DynamicImage, TransformFault> {
        match self {
            Transform::Grayscale => grayscale(image),
            Transform::AdjustBrightness { percentage } => adjust_brightness(image, percentage),
            Transform::AdjustSaturation { percentage } => adjust_saturation(image, percentage),
            Transform::AdjustContrast { percentage } => adjust_contrast(image, percentage),
            Transform::Blur { sigma } => blur(image, sigma),
            Transform::AdjustGamma { gamma } => adjust_gamma(image, gamma),
        }
    }
}

// -- Transforms ---------------------------------------------------------------

/// Replace each colour with its Rec. 601 luma, keeping alpha.
pub fn grayscale(image: DynamicImage) -> Result<DynamicImage, TransformFault> {
    let mut rgba = into_rgba(image)?;
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let luma = clamp_channel(0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b));
        *pixel = Rgba([luma, luma, luma, a]);
    }
    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Shift every colour channel by `percentage` of full scale.
pub fn adjust_brightness(
    image: DynamicImage,
    percentage: f64,
) -> Result<DynamicImage, TransformFault> {
    let percentage = finite(percentage)?.clamp(-100.0, 100.0);
    let rgba = into_rgba(image)?;
    let shift = 255.0 * percentage / 100.0;
    let lut = build_lut(|c| c + shift);
    Ok(DynamicImage::ImageRgba8(apply_lut(rgba, &lut)))
}

/// Scale HSL saturation by `1 + percentage / 100`.
pub fn adjust_saturation(
    image: DynamicImage,
    percentage: f64,
) -> Result<DynamicImage, TransformFault> {
    let percentage = finite(percentage)?.clamp(-100.0, 500.0);
    let mut rgba = into_rgba(image)?;
    let multiplier = 1.0 + percentage / 100.0;

    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let (r, g, b) = hsl_to_rgb(h, (s * multiplier).min(1.0), l);
        *pixel = Rgba([r, g, b, a]);
    }
    Ok(DynamicImage::ImageRgba8(rgba))
}

/// Stretch (positive) or flatten (negative) channel values around mid-grey.
pub fn adjust_contrast(
    image: DynamicImage,
    percentage: f64,
) -> Result<DynamicImage, TransformFault> {
    let percentage = finite(percentage)?.clamp(-100.0, 100.0);
    let rgba = into_rgba(image)?;
    let factor = (100.0 + percentage) / 100.0;
    let lut = build_lut(|c| ((c / 255.0 - 0.5) * factor + 0.5) * 255.0);
    Ok(DynamicImage::ImageRgba8(apply_lut(rgba, &lut)))
}

/// Gaussian blur over all four channels.
///
/// Sigma is clamped to the longer image side; the kernel grows with sigma and
/// a wider kernel than that only flattens the image further.
pub fn blur(image: DynamicImage, sigma: f64) -> Result<DynamicImage, TransformFault> {
    let sigma = finite(sigma)?;
    let rgba = into_rgba(image)?;
    // imageproc panics on sigma <= 0.
    if sigma <= 0.0 {
        return Ok(DynamicImage::ImageRgba8(rgba));
    }
    let sigma = sigma.min(f64::from(rgba.width().max(rgba.height())));
    Ok(DynamicImage::ImageRgba8(gaussian_blur_f32(&rgba, sigma as f32)))
}

/// Gamma correction: `255 * (c / 255) ^ (1 / gamma)`.
pub fn adjust_gamma(image: DynamicImage, gamma: f64) -> Result<DynamicImage, TransformFault> {
    let gamma = finite(gamma)?.max(1e-4);
    let rgba = into_rgba(image)?;
    let exponent = 1.0 / gamma;
    let lut = build_lut(|c| (c / 255.0).powf(exponent) * 255.0);
    Ok(DynamicImage::ImageRgba8(apply_lut(rgba, &lut)))
}

// -- Helpers ------------------------------------------------------------------

fn finite(value: f64) -> Result<f64, TransformFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TransformFault::NonFiniteParameter(value))
    }
}

/// Convert to RGBA8, refusing rasters with a zero dimension.
fn into_rgba(image: DynamicImage) -> Result<RgbaImage, TransformFault> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(TransformFault::EmptyImage { width, height });
    }
    Ok(image.into_rgba8())
}

/// Round to the nearest channel value, saturating at 0 and 255.
fn clamp_channel(value: f64) -> u8 {
    (value + 0.5).clamp(0.0, 255.0) as u8
}

fn build_lut(f: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = clamp_channel(f(i as f64));
    }
    lut
}

/// Map R, G and B through `lut`; alpha is left alone.
fn apply_lut(mut rgba: RgbaImage, lut: &[u8; 256]) -> RgbaImage {
    for pixel in rgba.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            lut[usize::from(r)],
            lut[usize::from(g)],
            lut[usize::from(b)],
            a,
        ]);
    }
    rgba
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s == 0.0 {
        let v = clamp_channel(l * 255.0);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        clamp_channel(hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0),
        clamp_channel(hue_to_channel(p, q, h) * 255.0),
        clamp_channel(hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn solid(rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba(rgba)))
    }

    fn first_pixel(image: &DynamicImage) -> [u8; 4] {
        image.to_rgba8().get_pixel(0, 0).0
    }

    #[test]
    fn grayscale_equalises_channels_and_keeps_alpha() {
        let out = grayscale(solid([200, 40, 90, 128])).expect("grayscale");
        let [r, g, b, a] = first_pixel(&out);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 128);
    }

    #[test]
    fn grayscale_of_pure_red_uses_luma_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0])));
        let out = grayscale(img).expect("grayscale");
        assert_eq!(first_pixel(&out), [76, 76, 76, 255]);
    }

    #[test]
    fn brightness_clamps_percentage_and_channels() {
        let out = adjust_brightness(solid([10, 128, 250, 255]), 500.0).expect("brightness");
        assert_eq!(first_pixel(&out), [255, 255, 255, 255]);

        let out = adjust_brightness(solid([10, 128, 250, 255]), -20.0).expect("darken");
        assert_eq!(first_pixel(&out), [0, 77, 199, 255]);
    }

    #[test]
    fn zero_brightness_is_identity() {
        let out = adjust_brightness(solid([12, 34, 56, 78]), 0.0).expect("brightness");
        assert_eq!(first_pixel(&out), [12, 34, 56, 78]);
    }

    #[test]
    fn full_desaturation_gives_grey() {
        let out = adjust_saturation(solid([220, 30, 30, 255]), -100.0).expect("saturation");
        let [r, g, b, _] = first_pixel(&out);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn saturation_zero_keeps_colour() {
        let out = adjust_saturation(solid([220, 30, 30, 255]), 0.0).expect("saturation");
        assert_eq!(first_pixel(&out), [220, 30, 30, 255]);
    }

    #[test]
    fn contrast_minus_hundred_flattens_to_mid_grey() {
        let out = adjust_contrast(solid([0, 90, 255, 255]), -100.0).expect("contrast");
        assert_eq!(first_pixel(&out), [128, 128, 128, 255]);
    }

    #[test]
    fn contrast_pushes_values_away_from_middle() {
        let out = adjust_contrast(solid([100, 160, 128, 255]), 50.0).expect("contrast");
        let [r, g, _, _] = first_pixel(&out);
        assert!(r < 100);
        assert!(g > 160);
    }

    #[test]
    fn gamma_one_is_identity_and_above_one_brightens() {
        let base = solid([64, 128, 192, 255]);
        assert_eq!(
            first_pixel(&adjust_gamma(base.clone(), 1.0).expect("gamma")),
            [64, 128, 192, 255]
        );
        let [r, g, b, _] = first_pixel(&adjust_gamma(base, 2.2).expect("gamma"));
        assert!(r > 64 && g > 128 && b > 192);
    }

    #[test]
    fn blur_smooths_a_hard_edge() {
        let mut img = RgbaImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let out = blur(DynamicImage::ImageRgba8(img), 1.5).expect("blur");
        let centre = out.to_rgba8().get_pixel(4, 4).0[0];
        let neighbour = out.to_rgba8().get_pixel(5, 4).0[0];
        assert!(centre < 255);
        assert!(neighbour > 0);
    }

    #[test]
    fn huge_sigma_is_clamped_to_image_size() {
        let out = blur(solid([40, 80, 120, 255]), 1e12).expect("blur");
        assert_eq!((out.width(), out.height()), (4, 4));
        let [r, g, b, a] = first_pixel(&out);
        assert!(r.abs_diff(40) <= 1 && g.abs_diff(80) <= 1 && b.abs_diff(120) <= 1);
        assert!(a.abs_diff(255) <= 1);
    }

    #[test]
    fn non_positive_blur_is_identity() {
        let out = blur(solid([1, 2, 3, 4]), 0.0).expect("blur");
        assert_eq!(first_pixel(&out), [1, 2, 3, 4]);
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = DynamicImage::ImageRgba8(RgbaImage::new(0, 3));
        assert_eq!(
            grayscale(empty),
            Err(TransformFault::EmptyImage {
                width: 0,
                height: 3
            })
        );
    }

    #[test]
    fn nan_parameter_is_rejected() {
        let result = adjust_gamma(solid([0, 0, 0, 255]), f64::NAN);
        assert!(matches!(result, Err(TransformFault::NonFiniteParameter(_))));
    }

    #[test]
    fn hsl_round_trip_on_primary_colours() {
        for (r, g, b) in [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 0), (12, 200, 99)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            assert_eq!(hsl_to_rgb(h, s, l), (r, g, b));
        }
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Transform::Blur { sigma: 1.0 }.kind(), TransformKind::Blur);
        assert_eq!(Transform::Grayscale.kind(), TransformKind::Grayscale);
    }
}

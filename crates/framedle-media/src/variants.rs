//! Deterministic image variants derived from one extracted frame.

use std::collections::{BTreeMap, HashSet};

use framedle_models::{EncodedImage, Quadrant, VariantKind, VariantSpec};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use tracing::debug;

use crate::encode::encode_webp;
use crate::error::{MediaError, MediaResult};

/// Renders the variant taxonomy for a single source frame.
///
/// Holds no per-image state; the same generator can be shared across
/// moments and threads.
#[derive(Debug, Clone, Copy)]
pub struct VariantGenerator {
    /// Width that crop and pixelate variants are scaled back to
    frame_width: u32,
}

impl VariantGenerator {
    pub fn new(frame_width: u32) -> Self {
        Self { frame_width }
    }

    /// Render and encode every variant of `taxonomy`.
    ///
    /// Either every name is present in the result or an error is returned.
    pub fn generate(
        &self,
        source: &RgbImage,
        taxonomy: &[VariantSpec],
    ) -> MediaResult<BTreeMap<String, EncodedImage>> {
        let mut seen = HashSet::with_capacity(taxonomy.len());
        for spec in taxonomy {
            if !seen.insert(spec.name) {
                return Err(MediaError::invalid_input(format!(
                    "duplicate variant name: {}",
                    spec.name
                )));
            }
        }

        let rendered: Vec<(String, EncodedImage)> = taxonomy
            .par_iter()
            .map(|spec| {
                let image = self.render(source, spec)?;
                let encoded = encode_webp(&image).map_err(|e| {
                    MediaError::encoding_failed(format!("variant {}: {}", spec.name, e))
                })?;
                Ok((spec.name.to_string(), encoded))
            })
            .collect::<MediaResult<_>>()?;

        debug!(
            "Generated {} variants from {}x{} source",
            rendered.len(),
            source.width(),
            source.height()
        );

        Ok(rendered.into_iter().collect())
    }

    /// Render one variant without encoding it.
    pub fn render(&self, source: &RgbImage, spec: &VariantSpec) -> MediaResult<RgbImage> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(MediaError::invalid_input("source image has no pixels"));
        }

        match spec.kind {
            VariantKind::Resize { width: target } => {
                if target == 0 {
                    return Err(invalid_param(spec, "width must be positive"));
                }
                Ok(resize_to_width(source, target))
            }
            VariantKind::CenterCrop { fraction } => {
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(invalid_param(spec, "fraction must be in (0, 1]"));
                }
                let crop_w = scaled(width, fraction);
                let crop_h = scaled(height, fraction);
                let x = (width - crop_w) / 2;
                let y = (height - crop_h) / 2;
                let cropped = imageops::crop_imm(source, x, y, crop_w, crop_h).to_image();
                Ok(resize_to_width(&cropped, self.frame_width))
            }
            VariantKind::Desaturate => Ok(desaturate(source)),
            VariantKind::Pixelate { blocks } => {
                if blocks == 0 {
                    return Err(invalid_param(spec, "block count must be positive"));
                }
                let small = imageops::resize(source, blocks, blocks, FilterType::Triangle);
                let out_h = proportional_height(width, height, self.frame_width);
                Ok(upscale_nearest(&small, self.frame_width, out_h))
            }
            VariantKind::Quadrant { corner } => Ok(quadrant(source, corner)),
        }
    }
}

fn invalid_param(spec: &VariantSpec, message: &str) -> MediaError {
    MediaError::invalid_input(format!("variant {}: {}", spec.name, message))
}

/// `floor(value * fraction)`, at least 1 and at most `value`.
fn scaled(value: u32, fraction: f64) -> u32 {
    ((value as f64 * fraction).floor() as u32).clamp(1, value)
}

/// `floor(height * target_width / width)`, at least 1.
fn proportional_height(width: u32, height: u32, target_width: u32) -> u32 {
    let h = height as u64 * target_width as u64 / width as u64;
    u32::try_from(h).unwrap_or(u32::MAX).max(1)
}

fn resize_to_width(source: &RgbImage, target_width: u32) -> RgbImage {
    let (width, height) = source.dimensions();
    let target_height = proportional_height(width, height, target_width);
    if (width, height) == (target_width, target_height) {
        return source.clone();
    }
    imageops::resize(source, target_width, target_height, FilterType::Lanczos3)
}

/// BT.601 integer luma, rounded to nearest, replicated to all channels.
fn desaturate(source: &RgbImage) -> RgbImage {
    let mut out = source.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b] = pixel.0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        let luma = luma as u8;
        *pixel = Rgb([luma, luma, luma]);
    }
    out
}

/// Nearest-neighbor upscale: every output pixel copies exactly one source
/// pixel, so each source pixel becomes a solid block.
fn upscale_nearest(source: &RgbImage, out_w: u32, out_h: u32) -> RgbImage {
    let (src_w, src_h) = source.dimensions();
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let sx = (x as u64 * src_w as u64 / out_w as u64) as u32;
        let sy = (y as u64 * src_h as u64 / out_h as u64) as u32;
        *source.get_pixel(sx, sy)
    })
}

fn quadrant(source: &RgbImage, corner: Quadrant) -> RgbImage {
    let (width, height) = source.dimensions();
    let split_x = width / 2;
    let split_y = height / 2;

    let (x, w) = if corner.is_right() {
        (split_x, width - split_x)
    } else {
        (0, split_x)
    };
    let (y, h) = if corner.is_bottom() {
        (split_y, height - split_y)
    } else {
        (0, split_y)
    };

    imageops::crop_imm(source, x, y, w.max(1), h.max(1)).to_image()
}

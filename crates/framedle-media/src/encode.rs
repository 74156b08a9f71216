//! Image decode/encode helpers.

use framedle_models::EncodedImage;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, RgbImage};

use crate::error::{MediaError, MediaResult};

/// Decode a grabbed frame (any format the `image` crate recognizes) to RGB.
pub fn decode_frame(bytes: &[u8]) -> MediaResult<RgbImage> {
    let image = image::load_from_memory(bytes).map_err(|e| MediaError::DecodeFailed(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Encode as lossless WebP.
///
/// Lossless output is a pure function of the pixels, which keeps the
/// published bytes stable across runs.
pub fn encode_webp(image: &RgbImage) -> MediaResult<EncodedImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::encoding_failed("cannot encode an empty image"));
    }

    let mut bytes = Vec::new();
    WebPEncoder::new_lossless(&mut bytes)
        .encode(image.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| MediaError::encoding_failed(e.to_string()))?;

    Ok(EncodedImage {
        width,
        height,
        bytes,
    })
}

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::GenericImageView;

/// Edge length of the square thumbnail images are reduced to before hashing.
pub const THUMBNAIL_EDGE: u32 = 32;

/// Decode `image_bytes` and return the RGBA pixels of a fixed-size thumbnail,
/// prefixed with the source dimensions.
///
/// Resizing bounds hashing cost for large screenshots. The dimensions are
/// mixed in so that two images sharing a thumbnail but not a size still
/// differ. Equality is only as good as the decoder: lossy re-encodes will
/// usually produce a different thumbnail.
pub(crate) fn thumbnail_pixels(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(image_bytes).context("decode image bytes for fingerprint")?;
    let (width, height) = decoded.dimensions();

    let thumbnail = image::imageops::resize(
        &decoded.to_rgba8(),
        THUMBNAIL_EDGE,
        THUMBNAIL_EDGE,
        FilterType::Triangle,
    );

    let mut pixels = Vec::with_capacity(8 + thumbnail.as_raw().len());
    pixels.extend_from_slice(&width.to_le_bytes());
    pixels.extend_from_slice(&height.to_le_bytes());
    pixels.extend_from_slice(thumbnail.as_raw());
    Ok(pixels)
}

use image::{GenericImageView, ImageFormat};
use ndarray::Array4;

use crate::error::ImageError;

/// Height and width the model was trained on.
pub const INPUT_SIZE: u32 = 256;
pub const INPUT_CHANNELS: u8 = 3;

/// Decodes an encoded image into a `(1, 256, 256, 3)` batch.
///
/// Channel values are kept at the scale the file format yields: PNG samples
/// are read as floats in `[0, 1]`, every other format as raw 8-bit values.
/// No further normalization is applied.
pub fn decode_image(data: &[u8]) -> Result<Array4<f32>, ImageError> {
    let format = image::guess_format(data)?;
    if format == ImageFormat::Png && is_palette_png(data) {
        return Err(ImageError::PalettePng);
    }
    let image = image::load_from_memory_with_format(data, format)?;

    let (width, height) = image.dimensions();
    let channels = image.color().channel_count();
    if width != INPUT_SIZE || height != INPUT_SIZE || channels != INPUT_CHANNELS {
        return Err(ImageError::ShapeMismatch {
            width,
            height,
            channels,
        });
    }

    let pixels: Vec<f32> = match format {
        ImageFormat::Png => image.into_rgb32f().into_raw(),
        _ => image.into_rgb8().into_raw().into_iter().map(f32::from).collect(),
    };

    let size = INPUT_SIZE as usize;
    let batch = Array4::from_shape_vec((1, size, size, INPUT_CHANNELS as usize), pixels)?;
    Ok(batch)
}

/// Palette PNGs would be expanded to RGB by the decoder. They are rejected
/// instead, the same as any image that does not carry three channels itself.
fn is_palette_png(data: &[u8]) -> bool {
    // Signature (8), then the IHDR chunk: length (4), type (4), width (4),
    // height (4), bit depth (1), color type (1).
    const PALETTE: u8 = 3;
    data.get(12..16) == Some(b"IHDR".as_slice()) && data.get(25) == Some(&PALETTE)
}

//! Raster image measurement via the `image` crate.

use std::io::Cursor;

use image::ImageReader;

use super::{Measured, ResolveError, SizeSource};

/// Read the pixel dimensions of a raster image.
///
/// The format is sniffed from the bytes, not taken from the URL or headers.
/// Only the header is parsed; pixel data is never decoded.
pub fn measure(bytes: Vec<u8>) -> Result<Measured, ResolveError> {
    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| ResolveError::Decode(e.to_string()))?;
    let Some(format) = reader.format() else {
        return Err(ResolveError::Decode("unrecognized image format".to_string()));
    };
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ResolveError::Decode(e.to_string()))?;

    Ok(Measured {
        width,
        height,
        payload: bytes,
        mime_type: format.to_mime_type().to_string(),
        size_source: SizeSource::Decoded,
    })
}

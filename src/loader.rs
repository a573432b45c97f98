use crate::error::{Error, Result};
use image::RgbImage;

/// Decode raw image bytes into an 8-bit RGB grid.
///
/// Any container format the `image` crate recognises is accepted. Alpha channels are dropped and other pixel formats
/// are converted to RGB. Bytes that are empty, match no known container, or hold broken pixel data all fail with
/// [`Error::Decode`].
pub fn load_image(bytes: &[u8]) -> Result<RgbImage> {
    let format = image::guess_format(bytes).map_err(Error::Decode)?;
    let image = image::load_from_memory_with_format(bytes, format).map_err(Error::Decode)?;

    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb};
    use std::io::Cursor;

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_to_rgb() {
        let image = RgbImage::from_fn(4, 2, |x, _| if x < 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) });
        let decoded = load_image(&encode_png(&image)).unwrap();

        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(decoded.get_pixel(3, 1), &Rgb([0, 0, 255]));
    }

    #[test]
    fn drops_alpha_channel() {
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 0]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();

        let decoded = load_image(&bytes).unwrap();
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn empty_input_fails_to_decode() {
        assert!(matches!(load_image(&[]), Err(Error::Decode(_))));
    }

    #[test]
    fn unknown_container_fails_to_decode() {
        assert!(matches!(load_image(b"hello"), Err(Error::Decode(_))));
        assert!(matches!(load_image(b"definitely not an image"), Err(Error::Decode(_))));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let image = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let bytes = encode_png(&image);

        assert!(matches!(load_image(&bytes[..bytes.len() / 2]), Err(Error::Decode(_))));
    }
}

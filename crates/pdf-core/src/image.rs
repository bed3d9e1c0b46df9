//! Image decoding and XObject encoding
//!
//! JPEG files are embedded untouched with `DCTDecode`. Everything else the
//! `image` crate can read is decoded to 8-bit gray or RGB samples, with any
//! alpha channel flattened onto white, and stored with `FlateDecode`.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Object, Stream};

use crate::{PdfError, Result};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static [u8] {
        match self {
            ColorSpace::Gray => b"DeviceGray",
            ColorSpace::Rgb => b"DeviceRGB",
            ColorSpace::Cmyk => b"DeviceCMYK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    /// JPEG bytes as found in the file
    Dct,
    /// zlib-compressed 8-bit samples
    Flate,
}

/// A picture ready to be written as an image XObject
#[derive(Debug, Clone)]
pub(crate) struct RasterImage {
    pub width: u32,
    pub height: u32,
    color: ColorSpace,
    encoding: Encoding,
    data: Vec<u8>,
}

impl RasterImage {
    /// Decode image file bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        match image::guess_format(data)? {
            ImageFormat::Jpeg => Self::passthrough_jpeg(data),
            format => Self::decode_samples(data, format),
        }
    }

    fn passthrough_jpeg(data: &[u8]) -> Result<Self> {
        let frame = JpegFrame::find(data)
            .ok_or_else(|| PdfError::ImageError("JPEG has no usable frame header".to_string()))?;

        let color = match frame.components {
            1 => ColorSpace::Gray,
            4 => ColorSpace::Cmyk,
            _ => ColorSpace::Rgb,
        };

        Ok(Self {
            width: frame.width,
            height: frame.height,
            color,
            encoding: Encoding::Dct,
            data: data.to_vec(),
        })
    }

    fn decode_samples(data: &[u8], format: ImageFormat) -> Result<Self> {
        let image = image::load_from_memory_with_format(data, format)?;
        let (width, height) = (image.width(), image.height());
        let (samples, color) = flatten(&image);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&samples)?;

        Ok(Self {
            width,
            height,
            color,
            encoding: Encoding::Flate,
            data: encoder.finish()?,
        })
    }

    /// Build the XObject stream
    pub fn into_stream(self) -> Stream {
        let filter: &[u8] = match self.encoding {
            Encoding::Dct => b"DCTDecode",
            Encoding::Flate => b"FlateDecode",
        };

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", i64::from(self.width));
        dict.set("Height", i64::from(self.height));
        dict.set("ColorSpace", Object::Name(self.color.pdf_name().to_vec()));
        dict.set("BitsPerComponent", 8_i64);
        dict.set("Filter", Object::Name(filter.to_vec()));

        Stream::new(dict, self.data)
    }
}

/// 8-bit samples without alpha
fn flatten(image: &DynamicImage) -> (Vec<u8>, ColorSpace) {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (false, false) => (image.to_luma8().into_raw(), ColorSpace::Gray),
        (false, true) => {
            let gray = image
                .to_luma_alpha8()
                .pixels()
                .map(|p| blend_on_white(p[0], p[1]))
                .collect();
            (gray, ColorSpace::Gray)
        }
        (true, false) => (image.to_rgb8().into_raw(), ColorSpace::Rgb),
        (true, true) => {
            let rgb = image
                .to_rgba8()
                .pixels()
                .flat_map(|p| {
                    let [r, g, b, a] = p.0;
                    [r, g, b].map(|c| blend_on_white(c, a))
                })
                .collect();
            (rgb, ColorSpace::Rgb)
        }
    }
}

fn blend_on_white(value: u8, alpha: u8) -> u8 {
    let (value, alpha) = (u16::from(value), u16::from(alpha));
    ((value * alpha + 255 * (255 - alpha)) / 255) as u8
}

/// Size and component count from a JPEG start-of-frame segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u32,
    height: u32,
    components: u8,
}

impl JpegFrame {
    fn find(data: &[u8]) -> Option<Self> {
        // Skip SOI
        let mut rest = data.get(2..)?;

        loop {
            let [0xFF, marker, len_hi, len_lo, ..] = *rest else {
                return None;
            };
            if marker == 0xFF {
                // Fill byte
                rest = &rest[1..];
                continue;
            }
            // Entropy-coded data starts before any frame header was seen
            if marker == 0xDA {
                return None;
            }

            if is_start_of_frame(marker) {
                // precision (1), height (2), width (2), components (1)
                let frame = rest.get(4..10)?;
                let height = u32::from(u16::from_be_bytes([frame[1], frame[2]]));
                let width = u32::from(u16::from_be_bytes([frame[3], frame[4]]));
                return (width > 0 && height > 0).then_some(Self {
                    width,
                    height,
                    components: frame[5],
                });
            }

            let length = usize::from(u16::from_be_bytes([len_hi, len_lo]));
            if length < 2 {
                return None;
            }
            rest = rest.get(2 + length..)?;
        }
    }
}

/// SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
fn is_start_of_frame(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

/// Largest size with the picture's aspect ratio that fits in the box
pub fn fit_in_box(width: u32, height: u32, box_width: f64, box_height: f64) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let (width, height) = (f64::from(width), f64::from(height));
    let scale = (box_width / width).min(box_height / height);
    (width * scale, height * scale)
}

/// Paint an image XObject into a rectangle given in PDF coordinates
pub(crate) fn image_operators(resource: &str, x: f64, y: f64, width: f64, height: f64) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{resource} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    const TINY_JPEG: [u8; 23] = [
        0xFF, 0xD8, // SOI
        0xFF, 0xC0, 0x00, 0x11, // SOF0, length 17
        0x08, // precision
        0x00, 0x20, // height 32
        0x00, 0x40, // width 64
        0x03, // components
        0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, //
        0xFF, 0xD9, // EOI
    ];

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_jpeg_is_passed_through() {
        let image = RasterImage::decode(&TINY_JPEG).unwrap();
        assert_eq!((image.width, image.height), (64, 32));
        assert_eq!(image.color, ColorSpace::Rgb);
        assert_eq!(image.encoding, Encoding::Dct);
        assert_eq!(image.data, TINY_JPEG.to_vec());
    }

    #[test]
    fn test_jpeg_frame_after_app_segment() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0xAA, 0xBB];
        jpeg.extend_from_slice(&TINY_JPEG[2..]);
        jpeg[17] = 0x04; // CMYK

        let frame = JpegFrame::find(&jpeg).unwrap();
        assert_eq!(
            frame,
            JpegFrame {
                width: 64,
                height: 32,
                components: 4
            }
        );
    }

    #[test]
    fn test_jpeg_without_frame_is_rejected() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xD9];
        assert!(JpegFrame::find(&jpeg).is_none());
        assert!(RasterImage::decode(&jpeg).is_err());
    }

    #[test]
    fn test_rgba_png_flattened_to_rgb() {
        let png = encode(
            DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 0]))),
            ImageFormat::Png,
        );
        let image = RasterImage::decode(&png).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.color, ColorSpace::Rgb);
        assert_eq!(image.encoding, Encoding::Flate);
    }

    #[test]
    fn test_gray_png_stays_gray() {
        let png = encode(
            DynamicImage::ImageLuma8(image::GrayImage::new(3, 3)),
            ImageFormat::Png,
        );
        assert_eq!(RasterImage::decode(&png).unwrap().color, ColorSpace::Gray);
    }

    #[test]
    fn test_unreadable_data_is_rejected() {
        assert!(matches!(
            RasterImage::decode(b"not an image at all"),
            Err(PdfError::ImageError(_))
        ));

        let mut png = encode(
            DynamicImage::ImageRgb8(image::RgbImage::new(4, 4)),
            ImageFormat::Png,
        );
        png.truncate(20);
        assert!(RasterImage::decode(&png).is_err());
    }

    #[test]
    fn test_blend_on_white() {
        assert_eq!(blend_on_white(0, 255), 0);
        assert_eq!(blend_on_white(0, 0), 255);
        assert_eq!(blend_on_white(200, 255), 200);
    }

    #[test]
    fn test_stream_dictionary() {
        let stream = RasterImage::decode(&TINY_JPEG).unwrap().into_stream();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 64);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 32);
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(stream.content, TINY_JPEG.to_vec());
    }

    #[test]
    fn test_image_operators() {
        let ops = image_operators("Im1", 430.0, 300.0, 50.0, 25.0);
        assert_eq!(
            String::from_utf8(ops).unwrap(),
            "q\n50 0 0 25 430 300 cm\n/Im1 Do\nQ\n"
        );
    }

    #[test]
    fn test_fit_in_box() {
        assert_eq!(fit_in_box(200, 100, 50.0, 50.0), (50.0, 25.0));
        assert_eq!(fit_in_box(100, 400, 50.0, 50.0), (12.5, 50.0));
        assert_eq!(fit_in_box(0, 10, 50.0, 50.0), (0.0, 0.0));
    }
}

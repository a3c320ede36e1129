//! Texture images.
//!
//! Maps are binary PPM (`P6`, 8 bits per sample). Pixels are stored bottom
//! row first, which is the order GPU texture uploads expect for OBJ texture
//! coordinates.

use std::path::Path;

use image::ImageFormat;

use crate::assets::AssetSource;
use crate::error::TextureError;
use crate::level::{Channel, TextureMap};

/// Decoded RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGB, `width * height * 3` bytes, bottom row first.
    pub pixels: Vec<u8>,
    placeholder: bool,
}

/// Header fields of a binary PPM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PpmHeader {
    width: u32,
    height: u32,
    maxval: u32,
    /// Offset of the first pixel byte.
    data_offset: usize,
}

impl PpmHeader {
    /// Read `P6 <width> <height> <maxval>` and the single whitespace byte
    /// that ends the header. `#` comments run to the end of the line.
    fn parse(bytes: &[u8]) -> Result<Self, &'static str> {
        if !bytes.starts_with(b"P6") || !bytes.get(2).is_some_and(u8::is_ascii_whitespace) {
            return Err("expected binary PPM (P6)");
        }

        let mut pos = 2;
        let mut fields = [0u32; 3];
        for field in &mut fields {
            loop {
                match bytes.get(pos) {
                    Some(b'#') => {
                        while !matches!(bytes.get(pos), None | Some(b'\n')) {
                            pos += 1;
                        }
                    }
                    Some(b) if b.is_ascii_whitespace() => pos += 1,
                    _ => break,
                }
            }

            let start = pos;
            while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                pos += 1;
            }
            *field = std::str::from_utf8(&bytes[start..pos])
                .ok()
                .and_then(|digits| digits.parse().ok())
                .ok_or("expected width, height and maxval")?;
        }

        if !bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            return Err("expected whitespace after maxval");
        }

        let [width, height, maxval] = fields;
        Ok(Self {
            width,
            height,
            maxval,
            data_offset: pos + 1,
        })
    }

    fn payload_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl TextureImage {
    /// Single black pixel, bound when a material has no map in a slot.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0; 3],
            placeholder: true,
        }
    }

    /// Whether this is the stand-in for an empty slot, not a loaded map.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Load the image for a material slot, or the placeholder if it is empty.
    pub fn load_map<A: AssetSource + ?Sized>(
        assets: &A,
        map: Option<&TextureMap>,
    ) -> Result<Self, TextureError> {
        match map {
            Some(map) => Self::load(assets, &map.path, map.channel),
            None => Ok(Self::placeholder()),
        }
    }

    pub fn load<A: AssetSource + ?Sized>(
        assets: &A,
        path: &Path,
        channel: Option<Channel>,
    ) -> Result<Self, TextureError> {
        let bytes = assets.read(path).map_err(|source| TextureError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let image = Self::decode_ppm(&bytes, path, channel)?;
        log::debug!("texture {}: {}x{}", path.display(), image.width, image.height);
        Ok(image)
    }

    /// Decode PPM bytes. `path` is only used in errors.
    pub fn decode_ppm(
        bytes: &[u8],
        path: &Path,
        channel: Option<Channel>,
    ) -> Result<Self, TextureError> {
        let malformed = |reason: &str| TextureError::MalformedHeader {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let header = PpmHeader::parse(bytes).map_err(malformed)?;
        if header.maxval != 255 {
            return Err(malformed(&format!("maxval {}, expected 255", header.maxval)));
        }
        let payload = bytes.len() - header.data_offset;
        if payload != header.payload_len() {
            return Err(malformed(&format!(
                "{payload} pixel bytes for {}x{}, expected {}",
                header.width,
                header.height,
                header.payload_len()
            )));
        }

        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Pnm).map_err(
            |source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            },
        )?;

        let mut rgb = decoded.into_rgb8();
        image::imageops::flip_vertical_in_place(&mut rgb);
        let (width, height) = rgb.dimensions();
        let mut pixels = rgb.into_raw();

        if let Some(channel) = channel {
            for pixel in pixels.chunks_exact_mut(3) {
                let value = pixel[channel.index()];
                pixel.fill(value);
            }
        }

        Ok(Self {
            width,
            height,
            pixels,
            placeholder: false,
        })
    }

    /// RGB at column `x`, row `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * 3) as usize;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use std::path::PathBuf;

    /// 2x2 PPM, top row red/green, bottom row blue/white.
    fn ppm() -> Vec<u8> {
        let mut bytes = b"P6\n# test\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]);
        bytes
    }

    #[test]
    fn test_rows_are_flipped() {
        let image = TextureImage::decode_ppm(&ppm(), Path::new("t.ppm"), None).unwrap();

        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.pixel(0, 0), [0, 0, 255]);
        assert_eq!(image.pixel(1, 0), [255, 255, 255]);
        assert_eq!(image.pixel(0, 1), [255, 0, 0]);
        assert_eq!(image.pixel(1, 1), [0, 255, 0]);
    }

    #[test]
    fn test_channel_replicated() {
        let image =
            TextureImage::decode_ppm(&ppm(), Path::new("t.ppm"), Some(Channel::Green)).unwrap();

        assert_eq!(image.pixel(0, 1), [0, 0, 0]);
        assert_eq!(image.pixel(1, 1), [255, 255, 255]);
        assert_eq!(image.pixel(1, 0), [255, 255, 255]);
    }

    #[test]
    fn test_wrong_magic() {
        let err = TextureImage::decode_ppm(b"P3\n1 1\n255\n0 0 0\n", Path::new("t.ppm"), None)
            .unwrap_err();
        assert!(matches!(err, TextureError::MalformedHeader { .. }));
    }

    #[test]
    fn test_maxval_not_255_rejected() {
        let mut bytes = b"P6\n1 1\n100\n".to_vec();
        bytes.extend_from_slice(&[50, 50, 50]);

        let err = TextureImage::decode_ppm(&bytes, Path::new("t.ppm"), None).unwrap_err();
        assert!(matches!(err, TextureError::MalformedHeader { .. }));
    }

    #[test]
    fn test_payload_size_mismatch_rejected() {
        let mut trailing = b"P6\n1 1\n255\n".to_vec();
        trailing.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7]);
        let err = TextureImage::decode_ppm(&trailing, Path::new("t.ppm"), None).unwrap_err();
        assert!(matches!(err, TextureError::MalformedHeader { .. }));

        let short = b"P6\n2 2\n255\n\x01\x02\x03";
        let err = TextureImage::decode_ppm(short, Path::new("t.ppm"), None).unwrap_err();
        assert!(matches!(err, TextureError::MalformedHeader { .. }));
    }

    #[test]
    fn test_header_comments_and_whitespace() {
        let mut bytes = b"P6\n# made by hand\n1\t1\n255\n".to_vec();
        bytes.extend_from_slice(&[7, 8, 9]);

        let image = TextureImage::decode_ppm(&bytes, Path::new("t.ppm"), None).unwrap();
        assert_eq!(image.pixel(0, 0), [7, 8, 9]);
    }

    #[test]
    fn test_decoded_single_pixel_is_not_placeholder() {
        let mut bytes = b"P6\n1 1\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 0, 0]);

        let image = TextureImage::decode_ppm(&bytes, Path::new("t.ppm"), None).unwrap();
        assert_eq!(image.pixels, TextureImage::placeholder().pixels);
        assert!(!image.is_placeholder());
        assert!(TextureImage::placeholder().is_placeholder());
    }

    #[test]
    fn test_load_map() {
        let assets = MemoryAssets::new().with_file("tex/wall.ppm", ppm());

        let placeholder = TextureImage::load_map(&assets, None).unwrap();
        assert!(placeholder.is_placeholder());

        let map = TextureMap {
            path: PathBuf::from("tex/wall.ppm"),
            channel: None,
        };
        let image = TextureImage::load_map(&assets, Some(&map)).unwrap();
        assert_eq!(image.pixels.len(), 12);

        let missing = TextureMap {
            path: PathBuf::from("tex/missing.ppm"),
            channel: None,
        };
        let err = TextureImage::load_map(&assets, Some(&missing)).unwrap_err();
        assert!(matches!(err, TextureError::FileNotFound { .. }));
    }
}

use crate::refs::{ObjectReferences, RefType};
use crate::InvoiceError;
use image::{ColorType, DynamicImage, GenericImageView};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::Path;

pub enum RasterImageType {
    /// Baseline RGB JPEG bytes, embedded as they are
    DirectlyEmbeddableJpeg(Vec<u8>),
    Image(DynamicImage),
}

/// A raster image (typically the seller's logo) ready to be embedded
pub struct Image {
    pub image: RasterImageType,
    pub width: f32,
    pub height: f32,
}

struct EncodeOutput {
    filter: Filter,
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl Image {
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Image, InvoiceError> {
        let data = std::fs::read(path.as_ref())?;
        Self::new_from_bytes(data)
    }

    /// Decode an image in any format the `image` crate can guess
    pub fn new_from_bytes(data: Vec<u8>) -> Result<Image, InvoiceError> {
        let format = image::guess_format(&data)?;
        let decoded = image::load_from_memory_with_format(&data, format)?;

        match (format, decoded.color()) {
            (image::ImageFormat::Jpeg, ColorType::Rgb8) => Ok(Image {
                width: decoded.width() as f32,
                height: decoded.height() as f32,
                image: RasterImageType::DirectlyEmbeddableJpeg(data),
            }),
            _ => Ok(Self::new_raster(decoded)),
        }
    }

    pub fn new_raster(image: DynamicImage) -> Image {
        Image {
            width: image.width() as f32,
            height: image.height() as f32,
            image: RasterImageType::Image(image),
        }
    }

    fn encode(&self) -> EncodeOutput {
        match &self.image {
            RasterImageType::DirectlyEmbeddableJpeg(bytes) => EncodeOutput {
                filter: Filter::DctDecode,
                bytes: bytes.clone(),
                mask: None,
            },
            RasterImageType::Image(image) => {
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = image.color().has_alpha().then(|| {
                    let alphas: Vec<_> = image.pixels().map(|p| (p.2).0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });

                let bytes = compress_to_vec_zlib(image.to_rgb8().as_raw(), level);

                EncodeOutput {
                    filter: Filter::FlateDecode,
                    bytes,
                    mask,
                }
            }
        }
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, image_index: usize, writer: &mut Pdf) {
        let id = refs.gen(RefType::Image(image_index));
        let encoded = self.encode();

        let mut image = writer.image_xobject(id, encoded.bytes.as_slice());
        image.filter(encoded.filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);

        let mask_id = encoded
            .mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(image_index)));
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        // add a transparency mask if we have one
        if let (Some(mask_id), Some(mask)) = (mask_id, encoded.mask.as_ref()) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.image {
            RasterImageType::DirectlyEmbeddableJpeg(_) => "jpeg",
            RasterImageType::Image(_) => "raster",
        };
        f.debug_struct("Image")
            .field("kind", &kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn png_with_alpha_gets_a_soft_mask() {
        let logo = RgbaImage::from_pixel(4, 3, Rgba([200, 10, 10, 128]));
        let image = Image::new_raster(DynamicImage::ImageRgba8(logo));
        assert_eq!((image.width, image.height), (4.0, 3.0));

        let encoded = image.encode();
        assert!(encoded.mask.is_some());
        assert!(matches!(encoded.filter, Filter::FlateDecode));
    }

    #[test]
    fn garbage_is_not_an_image() {
        assert!(Image::new_from_bytes(b"not an image".to_vec()).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Image::new_from_disk("does/not/exist.png").unwrap_err();
        assert!(matches!(err, InvoiceError::Io(_)));
    }
}

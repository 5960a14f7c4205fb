use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::error::PreprocessError;

/// In-memory bitmap moving through the pipeline.
///
/// Binary images are `Gray` frames that only hold 0 and 255.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Color(RgbImage),
    Gray(GrayImage),
}

/// Apply the same generic expression to either variant, keeping the variant.
macro_rules! each_frame {
    ($frame:expr, $img:ident => $body:expr) => {
        match $frame {
            $crate::frame::Frame::Gray($img) => $crate::frame::Frame::Gray($body),
            $crate::frame::Frame::Color($img) => $crate::frame::Frame::Color($body),
        }
    };
}

pub(crate) use each_frame;

impl Frame {
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Frame::Gray(gray),
            other if !other.color().has_color() => Frame::Gray(other.to_luma8()),
            other => Frame::Color(other.to_rgb8()),
        }
    }

    pub fn open(path: &Path) -> Result<Self, PreprocessError> {
        Ok(Self::from_dynamic(image::open(path)?))
    }

    /// Encode to `path`, format chosen from the extension (PNG if unknown).
    pub fn save(&self, path: &Path) -> Result<(), PreprocessError> {
        let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
        match self {
            Frame::Color(img) => img.save_with_format(path, format)?,
            Frame::Gray(img) => img.save_with_format(path, format)?,
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Frame::Color(img) => img.dimensions(),
            Frame::Gray(img) => img.dimensions(),
        }
    }

    pub fn is_gray(&self) -> bool {
        matches!(self, Frame::Gray(_))
    }

    pub fn to_gray(&self) -> GrayImage {
        match self {
            Frame::Color(img) => image::imageops::grayscale(img),
            Frame::Gray(img) => img.clone(),
        }
    }

    pub fn into_gray(self) -> GrayImage {
        match self {
            Frame::Color(img) => image::imageops::grayscale(&img),
            Frame::Gray(img) => img,
        }
    }
}

impl From<DynamicImage> for Frame {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}

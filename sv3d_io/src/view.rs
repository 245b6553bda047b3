//! View image decoding.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;

use crate::error::{Result, Sv3dIoError};

/// An RGB view in channel-major `[3, H, W]` layout with values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewImage {
    /// Height in pixels.
    pub height: usize,
    /// Width in pixels.
    pub width: usize,
    /// Pixel values, CHW order.
    pub data: Vec<f32>,
}

impl ViewImage {
    /// Tensor shape of this image.
    pub fn shape(&self) -> [usize; 3] {
        [3, self.height, self.width]
    }
}

/// Convert an RGB buffer into a normalized CHW view.
pub fn view_from_rgb(img: &RgbImage) -> ViewImage {
    let (width, height) = img.dimensions();
    let mut data = Vec::with_capacity(3 * (width * height) as usize);
    for c in 0..3 {
        for y in 0..height {
            for x in 0..width {
                data.push(img.get_pixel(x, y)[c] as f32 / 255.0);
            }
        }
    }
    ViewImage {
        height: height as usize,
        width: width as usize,
        data,
    }
}

/// Load a view image, resizing it to `size x size` when needed.
pub fn load_view<P: AsRef<Path>>(path: P, size: u32) -> Result<ViewImage> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Sv3dIoError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let mut img = image::open(path)
        .map_err(|e| Sv3dIoError::Image(format!("{}: {}", path.display(), e)))?
        .to_rgb8();
    if img.dimensions() != (size, size) {
        img = image::imageops::resize(&img, size, size, FilterType::Triangle);
    }
    Ok(view_from_rgb(&img))
}

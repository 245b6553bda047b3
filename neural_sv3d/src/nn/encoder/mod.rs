//! Image encoders.

mod image;

pub use image::ImageEncoder;

//! In-memory truecolor image used as render target and texture source.
//!
//! Pixels are stored row-major (`index = y * width + x`) with row 0 at the
//! top of the picture. Loading and saving go through the `image` crate; the
//! renderer itself never touches files.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use strata_math::Colour;

use crate::{CoreError, CoreResult};

/// A width × height grid of linear colours.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Colour>,
}

impl Image {
    /// Create an image filled with `background`.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn new(width: u32, height: u32, background: Colour) -> Self {
        assert!(
            width > 0 && height > 0,
            "image dimensions must be non-zero, got {width}x{height}"
        );
        Self {
            width,
            height,
            pixels: vec![background; (width * height) as usize],
        }
    }

    /// Build an image from packed 8-bit RGB rows.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> CoreResult<Self> {
        if width == 0 || height == 0 || data.len() != (width * height * 3) as usize {
            return Err(CoreError::BufferSize {
                width,
                height,
                len: data.len(),
            });
        }
        let pixels = data
            .chunks_exact(3)
            .map(|p| Colour::from_rgb8([p[0], p[1], p[2]]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode any format the `image` crate understands (TGA, PNG, ...).
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| CoreError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        log::debug!("Loaded image {} ({}x{})", path.display(), width, height);
        Self::from_rgb8(width, height, rgb.as_raw())
    }

    /// Write the image as an uncompressed 24-bit TGA, clamping each pixel.
    pub fn save_tga(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let buffer = RgbImage::from_raw(self.width, self.height, self.to_rgb8()).ok_or(
            CoreError::BufferSize {
                width: self.width,
                height: self.height,
                len: self.pixels.len() * 3,
            },
        )?;
        buffer
            .save_with_format(path, ImageFormat::Tga)
            .map_err(|source| CoreError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Colour at (x, y), or `None` outside the image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Colour> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Store a colour; returns false when (x, y) is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, colour: Colour) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = colour;
                true
            }
            None => false,
        }
    }

    /// Copy a row-major block of pixels whose top-left corner is (x, y).
    /// Pixels falling outside the image are dropped.
    pub fn blit(&mut self, x: u32, y: u32, width: u32, block: &[Colour]) {
        for (i, colour) in block.iter().enumerate() {
            let i = i as u32;
            self.set(x + i % width, y + i / width, *colour);
        }
    }

    pub fn clear(&mut self, colour: Colour) {
        self.pixels.fill(colour);
    }

    /// Change dimensions, clearing every pixel to `background`.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn resize(&mut self, width: u32, height: u32, background: Colour) {
        *self = Image::new(width, height, background);
    }

    /// Apply gamma encoding in place.
    pub fn gamma_correct(&mut self, gamma: f32) {
        for pixel in &mut self.pixels {
            *pixel = pixel.gamma(gamma);
        }
    }

    pub fn pixels(&self) -> &[Colour] {
        &self.pixels
    }

    /// Raw little-endian f32 view of the pixel buffer (r, g, b per pixel).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Clamped, quantised RGB bytes in row-major order.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgb8()).collect()
    }
}

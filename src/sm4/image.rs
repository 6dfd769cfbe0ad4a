//! Row-major view over the samples of an image page.

use crate::sm4::types::error::{Result, Sm4Error};
use crate::sm4::types::models::PageHeader;

/// Image samples shaped by their page header.
///
/// Samples are stored row-major: `x` runs fastest, `y` selects the row.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [i32],
    header: &'a PageHeader,
    width: usize,
    height: usize,
}

impl<'a> ImageView<'a> {
    /// Fails if the sample count differs from `x_size * y_size`.
    pub fn new(data: &'a [i32], header: &'a PageHeader) -> Result<Self> {
        let width = usize::try_from(header.x_size)
            .map_err(|_| Sm4Error::InvalidFormat(format!("Negative image width: {}", header.x_size)))?;
        let height = usize::try_from(header.y_size)
            .map_err(|_| Sm4Error::InvalidFormat(format!("Negative image height: {}", header.y_size)))?;
        if width * height != data.len() {
            return Err(Sm4Error::InvalidFormat(format!(
                "Image of {}x{} pixels holds {} samples",
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            header,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &'a [i32] {
        self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [i32]> + '_ {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.width.max(1))
    }

    /// Sample value converted to physical units: `z * z_scale + z_offset`.
    pub fn physical_z(&self, x: usize, y: usize) -> Option<f64> {
        let z = self.get(x, y)?;
        Some(z as f64 * self.header.z_scale as f64 + self.header.z_offset as f64)
    }

    /// Pixel position converted to physical units using the X/Y scale and offset.
    pub fn physical_xy(&self, x: usize, y: usize) -> (f64, f64) {
        let h = self.header;
        (
            h.x_offset as f64 + x as f64 * h.x_scale as f64,
            h.y_offset as f64 + y as f64 * h.y_scale as f64,
        )
    }
}

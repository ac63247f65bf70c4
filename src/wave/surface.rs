use thiserror::Error;

use super::layer::{Rgb, Rgba};

/// Largest surface we are willing to allocate.
pub const MAX_PIXELS: usize = 4096 * 4096;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderContextError {
    #[error("cannot draw on a {width}x{height} surface")]
    ZeroArea { width: usize, height: usize },
    #[error("surface {width}x{height} is larger than {max} pixels", max = MAX_PIXELS)]
    TooLarge { width: usize, height: usize },
}

fn check_size(width: usize, height: usize) -> Result<usize, RenderContextError> {
    if width == 0 || height == 0 {
        return Err(RenderContextError::ZeroArea { width, height });
    }
    match width.checked_mul(height) {
        Some(n) if n <= MAX_PIXELS => Ok(n),
        _ => Err(RenderContextError::TooLarge { width, height }),
    }
}

/// Row-major RGB pixel buffer.
#[derive(Debug, Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Result<Self, RenderContextError> {
        let n = check_size(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![Rgb::new(0, 0, 0); n],
        })
    }

    /// Change dimensions. Contents are cleared; the next frame repaints.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), RenderContextError> {
        let n = check_size(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(n, Rgb::new(0, 0, 0));
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::new(0, 0, 0));
    }

    /// Vertical linear gradient sampled at pixel centres.
    pub fn fill_gradient(&mut self, top: Rgb, bottom: Rgb) {
        for y in 0..self.height {
            let c = gradient_at(top, bottom, y, self.height);
            self.row_mut(y).fill(c);
        }
    }

    /// Blend `color` over column `x` from the first pixel whose centre lies
    /// at or below `from_y` down to the bottom edge.
    pub fn fill_column_from(&mut self, x: usize, from_y: f64, color: Rgba) {
        if x >= self.width || !from_y.is_finite() {
            return;
        }
        let start = (from_y - 0.5).ceil().clamp(0.0, self.height as f64) as usize;
        for y in start..self.height {
            let px = &mut self.pixels[y * self.width + x];
            *px = px.blend(color);
        }
    }

    /// Blend `color` over a whole row.
    pub fn blend_row(&mut self, y: usize, color: Rgba) {
        if y >= self.height {
            return;
        }
        for px in self.row_mut(y) {
            *px = px.blend(color);
        }
    }

    fn row_mut(&mut self, y: usize) -> &mut [Rgb] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }
}

/// Colour of row `y` in a `height`-row gradient from `top` to `bottom`.
pub fn gradient_at(top: Rgb, bottom: Rgb, y: usize, height: usize) -> Rgb {
    if height == 0 {
        return top;
    }
    top.lerp(bottom, (y as f64 + 0.5) / height as f64)
}

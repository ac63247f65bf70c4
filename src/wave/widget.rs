use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use super::layer::{GRADIENT_BOTTOM, GRADIENT_TOP, Rgb};
use super::renderer::WaveRenderer;
use super::surface::{Surface, gradient_at};

/// Upper half block: foreground is the top pixel, background the bottom one.
const HALF_BLOCK: &str = "▀";

/// Draws the renderer's surface behind the rest of the UI.
///
/// Each cell shows two vertical pixels. Without a surface (not mounted yet,
/// or degraded) every cell falls back to the static gradient.
pub struct WaveBackground<'a> {
    surface: Option<&'a Surface>,
}

impl<'a> WaveBackground<'a> {
    pub fn new(renderer: &'a WaveRenderer) -> Self {
        Self {
            surface: renderer.surface(),
        }
    }

    /// Plain gradient, for when the animation is switched off.
    pub fn gradient() -> Self {
        Self { surface: None }
    }

    fn pixel(&self, x: usize, y: usize, height: usize) -> Rgb {
        self.surface
            .and_then(|s| s.pixel(x, y))
            .unwrap_or_else(|| gradient_at(GRADIENT_TOP, GRADIENT_BOTTOM, y, height))
    }
}

impl Widget for WaveBackground<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = usize::from(area.height) * 2;
        for row in 0..area.height {
            for col in 0..area.width {
                let x = usize::from(col);
                let y = usize::from(row) * 2;
                let top = self.pixel(x, y, height);
                let bottom = self.pixel(x, y + 1, height);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(top.into())
                        .set_bg(bottom.into());
                }
            }
        }
    }
}

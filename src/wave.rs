//! Animated wave backdrop.
//!
//! Three translucent sine layers are painted over a vertical gradient into a
//! software `Surface`, one frame per timer tick. `WaveBackground` copies the
//! surface into the terminal using half-block cells.

mod layer;
mod renderer;
mod surface;
mod widget;

pub use layer::{GRADIENT_BOTTOM, GRADIENT_TOP, LAYERS, Rgb, Rgba, WaveLayer};
pub use renderer::WaveRenderer;
pub use surface::{MAX_PIXELS, RenderContextError, Surface};
pub use widget::WaveBackground;

use ratatui::style::Color;

/// Opaque pixel colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Source-over compositing of `src` onto this colour.
    pub fn blend(self, src: Rgba) -> Rgb {
        self.lerp(src.rgb(), f64::from(src.a))
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Colour with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

/// One sinusoidal band of the backdrop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WaveLayer {
    /// Horizontal pixels per radian.
    pub wavelength: f64,
    /// Peak offset from the vertical centre, in pixels.
    pub amplitude: f64,
    /// Phase advance per frame, in radians.
    pub speed: f64,
    pub color: Rgba,
}

impl WaveLayer {
    /// Height of the crest at column `x` for frame `time` on a surface
    /// `height` pixels tall.
    ///
    /// `scale` is logical pixels per surface pixel; at 1 this is
    /// `sin(x / wavelength + time * speed) * amplitude + height / 2`.
    pub fn crest(&self, x: f64, time: f64, height: f64, scale: f64) -> f64 {
        (x * scale / self.wavelength + time * self.speed).sin() * self.amplitude / scale
            + height / 2.0
    }
}

/// Back to front.
pub const LAYERS: [WaveLayer; 3] = [
    WaveLayer {
        wavelength: 200.0,
        amplitude: 50.0,
        speed: 0.02,
        color: Rgba::new(138, 43, 226, 0.2),
    },
    WaveLayer {
        wavelength: 150.0,
        amplitude: 30.0,
        speed: 0.03,
        color: Rgba::new(75, 0, 130, 0.2),
    },
    WaveLayer {
        wavelength: 100.0,
        amplitude: 20.0,
        speed: 0.04,
        color: Rgba::new(123, 104, 238, 0.2),
    },
];

pub const GRADIENT_TOP: Rgb = Rgb::new(0x0a, 0x0a, 0x2a);
pub const GRADIENT_BOTTOM: Rgb = Rgb::new(0x1a, 0x1a, 0x4a);

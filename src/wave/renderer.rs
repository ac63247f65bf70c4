use std::time::Duration;

use crate::config::WaveSettings;
use crate::schedule::{Scheduler, TaskId};

use super::layer::{GRADIENT_BOTTOM, GRADIENT_TOP, LAYERS, Rgba, WaveLayer};
use super::surface::{RenderContextError, Surface};

/// Strength of the dark veil over the top half of the backdrop.
const VEIL_OPACITY: f32 = 0.7;

/// Owns the surface and the frame loop.
///
/// At most one frame handle is outstanding. A handle that fires after
/// `unmount` is not claimed and paints nothing.
pub struct WaveRenderer {
    layers: Vec<WaveLayer>,
    surface: Option<Surface>,
    time: u64,
    scale: f64,
    frame_interval: Duration,
    frame_task: Option<TaskId>,
    mounted: bool,
    degraded: Option<RenderContextError>,
}

impl WaveRenderer {
    pub fn new(settings: &WaveSettings) -> Self {
        Self {
            layers: LAYERS.to_vec(),
            surface: None,
            time: 0,
            scale: if settings.scale > 0.0 { settings.scale } else { 1.0 },
            frame_interval: Duration::from_millis(settings.frame_interval_ms.max(1)),
            frame_task: None,
            mounted: false,
            degraded: None,
        }
    }

    /// Create the surface, paint the first frame and request the next.
    ///
    /// If the surface cannot be created the renderer stays mounted but
    /// degraded: no frames are requested and the widget shows the plain
    /// gradient.
    pub fn mount(&mut self, width: usize, height: usize, sched: &mut impl Scheduler) {
        self.cancel_frame(sched);
        self.mounted = true;

        match Surface::new(width, height) {
            Ok(surface) => {
                self.surface = Some(surface);
                self.degraded = None;
                self.paint_frame();
                self.request_frame(sched);
            }
            Err(e) => self.degrade(e, sched),
        }
    }

    /// Resize the surface without painting a wave frame. The new surface
    /// holds the bare gradient until the next frame repaints it.
    pub fn resize(&mut self, width: usize, height: usize, sched: &mut impl Scheduler) {
        if !self.mounted {
            return;
        }
        let result = match self.surface.as_mut() {
            Some(surface) => surface.resize(width, height),
            None => Surface::new(width, height).map(|s| {
                self.surface = Some(s);
            }),
        };

        match result {
            Ok(()) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.fill_gradient(GRADIENT_TOP, GRADIENT_BOTTOM);
                }
                if self.degraded.take().is_some() {
                    tracing::debug!(width, height, "wave surface recovered");
                }
                if self.frame_task.is_none() {
                    self.request_frame(sched);
                }
            }
            Err(e) => self.degrade(e, sched),
        }
    }

    /// Stop the frame loop and release the surface.
    pub fn unmount(&mut self, sched: &mut impl Scheduler) {
        self.cancel_frame(sched);
        self.mounted = false;
        self.surface = None;
    }

    /// Timer dispatch. Returns false if `id` is not ours.
    pub fn on_timer(&mut self, id: TaskId, sched: &mut impl Scheduler) -> bool {
        if self.frame_task != Some(id) {
            return false;
        }
        self.frame_task = None;
        if !self.mounted || self.surface.is_none() {
            return true;
        }
        self.paint_frame();
        self.request_frame(sched);
        true
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn degraded(&self) -> Option<&RenderContextError> {
        self.degraded.as_ref()
    }

    /// Frames painted since creation.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn frame_task(&self) -> Option<TaskId> {
        self.frame_task
    }

    pub(super) fn paint_frame(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let (width, height) = (surface.width(), surface.height());
        let time = self.time as f64;

        surface.clear();
        surface.fill_gradient(GRADIENT_TOP, GRADIENT_BOTTOM);
        for layer in &self.layers {
            for x in 0..width {
                let y = layer.crest(x as f64, time, height as f64, self.scale);
                surface.fill_column_from(x, y, layer.color);
            }
        }

        // Top veil: full strength at the top edge, gone by the middle.
        let half = height as f64 / 2.0;
        for y in 0..height {
            let t = (y as f64 + 0.5) / half;
            if t >= 1.0 {
                break;
            }
            let a = VEIL_OPACITY * (1.0 - t) as f32;
            surface.blend_row(
                y,
                Rgba::new(GRADIENT_TOP.r, GRADIENT_TOP.g, GRADIENT_TOP.b, a),
            );
        }

        self.time += 1;
    }

    fn request_frame(&mut self, sched: &mut impl Scheduler) {
        self.cancel_frame(sched);
        self.frame_task = Some(sched.schedule(self.frame_interval));
    }

    fn cancel_frame(&mut self, sched: &mut impl Scheduler) {
        if let Some(id) = self.frame_task.take() {
            sched.cancel(id);
        }
    }

    fn degrade(&mut self, e: RenderContextError, sched: &mut impl Scheduler) {
        tracing::warn!(error = %e, "wave backdrop disabled");
        self.cancel_frame(sched);
        self.surface = None;
        self.degraded = Some(e);
    }
}

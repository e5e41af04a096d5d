/// Hosting glue: set up a canvas once, then redraw the model every tick
use std::io;
use std::path::Path;

use nalgebra::Vector4;
use objview_core::{render_model, Model, ObjError, Projection, RotationState, Transform};
use thiserror::Error;

use crate::config::ViewerConfig;
use crate::raster::SoftRasterizer;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("pixel buffer holds {actual} pixels but a {width}x{height} canvas needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("failed to load model: {0}")]
    Load(#[from] ObjError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

/// Draws a caller-owned [`Model`] into a fixed-size pixel canvas
pub struct ModelViewer {
    rasterizer: SoftRasterizer,
    rotation: RotationState,
    distance: f32,
    spin: [f32; 3],
    spinning: bool,
}

impl ModelViewer {
    /// Set up the canvas and load `path` into `model`
    pub fn init(
        width: u32,
        height: u32,
        pixels: Vec<u16>,
        model: &mut Model,
        path: impl AsRef<Path>,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let viewer = Self::new(width, height, pixels, config)?;
        model.load(path)?;
        Ok(viewer)
    }

    /// Set up the canvas without loading anything
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u16>,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let mut rasterizer = SoftRasterizer::new(width as usize, height as usize, pixels)?;

        let [r, g, b] = config.clear_color;
        rasterizer.set_clear_color(r, g, b);
        rasterizer.set_projection(
            Projection::perspective(config.fov, width, height, config.near, config.far).matrix(),
        );
        rasterizer.load_identity();
        let [x, y, z, w] = config.light_position;
        rasterizer.set_light_position(Vector4::new(x, y, z, w));
        rasterizer.clear();

        Ok(Self {
            rasterizer,
            rotation: RotationState::default(),
            distance: config.distance,
            spin: config.spin,
            spinning: true,
        })
    }

    /// Advance the animation and redraw `model` into the canvas
    pub fn update(&mut self, model: &Model) {
        if self.spinning {
            let [dx, dy, dz] = self.spin;
            self.rotation.rotate(dx, dy, dz);
        }

        self.rasterizer.clear();
        self.rasterizer.load_identity();
        self.rasterizer.translate(0.0, 0.0, -self.distance);
        self.rasterizer
            .mult_matrix(&Transform::rotation_matrix(&self.rotation));

        render_model(model, &mut self.rasterizer);
    }

    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation.rotate(dx, dy, dz);
    }

    pub fn toggle_spin(&mut self) {
        self.spinning = !self.spinning;
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn width(&self) -> usize {
        self.rasterizer.width()
    }

    pub fn height(&self) -> usize {
        self.rasterizer.height()
    }

    pub fn background(&self) -> u16 {
        self.rasterizer.clear_color()
    }

    pub fn pixels(&self) -> &[u16] {
        self.rasterizer.pixels()
    }

    pub fn into_pixels(self) -> Vec<u16> {
        self.rasterizer.into_pixels()
    }
}

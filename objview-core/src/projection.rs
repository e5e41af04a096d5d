/// Perspective projection and viewport mapping
use nalgebra::{Matrix4, Vector4};

/// Symmetric perspective frustum, parameterized like `gluPerspective`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn perspective(fov: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        let height = height.max(1);
        Self {
            fov,
            aspect: width as f32 / height as f32,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), self.near, self.far)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(45.0, 1, 1, 0.1, 1000.0)
    }
}

/// Maps normalized device coordinates onto a pixel grid with y pointing down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Project a clip-space position to `(x, y, depth)` with depth in [0, 1].
    ///
    /// Returns `None` for points on or behind the eye (`w` not positive).
    pub fn project(&self, clip: &Vector4<f32>) -> Option<(f32, f32, f32)> {
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        let screen_x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * self.height as f32;
        let depth = (ndc_z + 1.0) * 0.5;

        Some((screen_x, screen_y, depth))
    }
}

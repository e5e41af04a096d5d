/// Software immediate-mode rasterizer drawing into an RGB565 framebuffer
use log::warn;
use nalgebra::{Matrix4, Vector3, Vector4};
use objview_core::{DrawSurface, PrimitiveType, Transform, Viewport};

use crate::viewer::ViewerError;

/// Light that is always present regardless of surface orientation
const AMBIENT: f32 = 0.2;

/// Surface colour before lighting
const BASE_COLOR: [f32; 3] = [0.85, 0.85, 0.8];

/// Pack normalized RGB into a 5-6-5 pixel
pub fn rgb565(r: f32, g: f32, b: f32) -> u16 {
    let r = (r.clamp(0.0, 1.0) * 31.0).round() as u16;
    let g = (g.clamp(0.0, 1.0) * 63.0).round() as u16;
    let b = (b.clamp(0.0, 1.0) * 31.0).round() as u16;
    (r << 11) | (g << 5) | b
}

/// Unpack a 5-6-5 pixel into normalized RGB
pub fn rgb565_components(pixel: u16) -> (f32, f32, f32) {
    let r = ((pixel >> 11) & 0x1f) as f32 / 31.0;
    let g = ((pixel >> 5) & 0x3f) as f32 / 63.0;
    let b = (pixel & 0x1f) as f32 / 31.0;
    (r, g, b)
}

/// A lit vertex after projection to the framebuffer
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    intensity: f32,
}

/// Split the corners of one primitive into triangles.
///
/// Trailing corners that do not complete a triangle or quad are dropped.
pub(crate) fn triangulate(primitive: PrimitiveType, count: usize) -> Vec<[usize; 3]> {
    match primitive {
        PrimitiveType::Triangles => (0..count / 3).map(|t| [3 * t, 3 * t + 1, 3 * t + 2]).collect(),
        PrimitiveType::Quads => (0..count / 4)
            .flat_map(|q| {
                let b = 4 * q;
                [[b, b + 1, b + 2], [b, b + 2, b + 3]]
            })
            .collect(),
        PrimitiveType::Polygon if count >= 3 => (1..count - 1).map(|i| [0, i, i + 1]).collect(),
        PrimitiveType::Polygon => Vec::new(),
    }
}

/// Depth-tested, Gouraud-shaded rasterizer with a single point light
pub struct SoftRasterizer {
    width: usize,
    height: usize,
    pixels: Vec<u16>,
    depth_buffer: Vec<f32>,
    clear_color: u16,
    model_view: Matrix4<f32>,
    normal_matrix: Matrix4<f32>,
    projection: Matrix4<f32>,
    viewport: Viewport,
    light_position: Vector4<f32>,
    current_normal: Vector3<f32>,
    current_tex_coord: Vector4<f32>,
    primitive: Option<PrimitiveType>,
    pending: Vec<Option<ScreenVertex>>,
}

impl SoftRasterizer {
    /// Wrap a caller-provided pixel buffer of exactly `width * height` pixels
    pub fn new(width: usize, height: usize, pixels: Vec<u16>) -> Result<Self, ViewerError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(ViewerError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            depth_buffer: vec![f32::INFINITY; expected],
            clear_color: 0,
            model_view: Matrix4::identity(),
            normal_matrix: Matrix4::identity(),
            projection: Matrix4::identity(),
            viewport: Viewport::new(width as u32, height as u32),
            light_position: Vector4::new(0.0, 0.0, 1.0, 0.0),
            current_normal: Vector3::z(),
            current_tex_coord: Vector4::new(0.0, 0.0, 0.0, 1.0),
            primitive: None,
            pending: Vec::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u16> {
        self.pixels
    }

    pub fn clear_color(&self) -> u16 {
        self.clear_color
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[y * self.width + x]
    }

    pub fn current_tex_coord(&self) -> Vector4<f32> {
        self.current_tex_coord
    }

    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32) {
        self.clear_color = rgb565(r, g, b);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.clear_color);
        self.depth_buffer.fill(f32::INFINITY);
    }

    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    pub fn load_identity(&mut self) {
        self.set_model_view(Matrix4::identity());
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(&Transform::translation_matrix(x, y, z));
    }

    /// Post-multiply the current model-view matrix
    pub fn mult_matrix(&mut self, matrix: &Matrix4<f32>) {
        self.set_model_view(self.model_view * matrix);
    }

    /// Place the light; the position is transformed by the current model-view matrix
    pub fn set_light_position(&mut self, position: Vector4<f32>) {
        self.light_position = self.model_view * position;
    }

    fn set_model_view(&mut self, model_view: Matrix4<f32>) {
        self.model_view = model_view;
        self.normal_matrix = Transform::normal_matrix(&model_view);
    }

    fn shade(&self, eye: &Vector4<f32>, normal: &Vector3<f32>) -> f32 {
        let light = if self.light_position.w.abs() < 1e-6 {
            self.light_position.xyz()
        } else {
            let point = if eye.w.abs() < 1e-6 {
                eye.xyz()
            } else {
                eye.xyz() / eye.w
            };
            self.light_position.xyz() / self.light_position.w - point
        };

        let diffuse = light
            .try_normalize(1e-6)
            .map(|l| normal.dot(&l).max(0.0))
            .unwrap_or(0.0);

        AMBIENT + (1.0 - AMBIENT) * diffuse
    }

    fn rasterize_triangle(&mut self, v0: ScreenVertex, v1: ScreenVertex, v2: ScreenVertex) {
        // Bounding box clipped to the framebuffer
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    // Zero-area triangle
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    let intensity = w0 * v0.intensity + w1 * v1.intensity + w2 * v2.intensity;
                    self.depth_buffer[idx] = depth;
                    self.pixels[idx] = rgb565(
                        BASE_COLOR[0] * intensity,
                        BASE_COLOR[1] * intensity,
                        BASE_COLOR[2] * intensity,
                    );
                }
            }
        }
    }
}

impl DrawSurface for SoftRasterizer {
    fn begin(&mut self, primitive: PrimitiveType) {
        if self.primitive.is_some() {
            warn!("begin called inside an open primitive; discarding it");
        }
        self.primitive = Some(primitive);
        self.pending.clear();
    }

    fn tex_coord4f(&mut self, u: f32, v: f32, w: f32, q: f32) {
        self.current_tex_coord = Vector4::new(u, v, w, q);
    }

    fn normal3f(&mut self, i: f32, j: f32, k: f32) {
        self.current_normal = Vector3::new(i, j, k);
    }

    fn vertex4f(&mut self, x: f32, y: f32, z: f32, w: f32) {
        if self.primitive.is_none() {
            return;
        }

        let eye = self.model_view * Vector4::new(x, y, z, w);
        let normal = (self.normal_matrix * self.current_normal.push(0.0))
            .xyz()
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::z);
        let intensity = self.shade(&eye, &normal);

        let clip = self.projection * eye;
        let projected = self
            .viewport
            .project(&clip)
            .map(|(x, y, depth)| ScreenVertex {
                x,
                y,
                depth,
                intensity,
            });
        self.pending.push(projected);
    }

    fn end(&mut self) {
        let Some(primitive) = self.primitive.take() else {
            return;
        };

        let corners = std::mem::take(&mut self.pending);
        for [a, b, c] in triangulate(primitive, corners.len()) {
            // Triangles touching the eye plane are dropped rather than clipped
            if let (Some(v0), Some(v1), Some(v2)) = (corners[a], corners[b], corners[c]) {
                self.rasterize_triangle(v0, v1, v2);
            }
        }
        self.pending = corners;
        self.pending.clear();
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

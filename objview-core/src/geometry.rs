/// In-memory mesh storage for a loaded OBJ model
use nalgebra::{Vector3, Vector4};

/// A vertex position in homogeneous coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector4<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self {
            position: Vector4::new(x, y, z, w),
        }
    }
}

/// A texture coordinate; components missing from the source are 0.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoord {
    pub uvw: Vector3<f32>,
}

impl TexCoord {
    pub fn new(u: f32, v: f32, w: f32) -> Self {
        Self {
            uvw: Vector3::new(u, v, w),
        }
    }
}

/// A normal vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    pub ijk: Vector3<f32>,
}

impl Normal {
    pub fn new(i: f32, j: f32, k: f32) -> Self {
        Self {
            ijk: Vector3::new(i, j, k),
        }
    }
}

/// Primitive used to draw a face, chosen from its corner count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Triangles,
    Quads,
    Polygon,
}

impl PrimitiveType {
    /// Classify a face by corner count; fewer than three corners is not a face
    pub fn from_corner_count(count: usize) -> Option<Self> {
        match count {
            0..=2 => None,
            3 => Some(Self::Triangles),
            4 => Some(Self::Quads),
            _ => Some(Self::Polygon),
        }
    }
}

/// A polygon referencing the model's attribute arrays by 0-based index.
///
/// `tex_coord_indices` and `normal_indices` are present exactly when the owning
/// model's presence flags are set, and always have the same length as
/// `vertex_indices`.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub primitive: PrimitiveType,
    pub vertex_indices: Vec<usize>,
    pub tex_coord_indices: Option<Vec<usize>>,
    pub normal_indices: Option<Vec<usize>>,
}

impl Face {
    pub fn num_elems(&self) -> usize {
        self.vertex_indices.len()
    }
}

/// Counts and presence flags describing an OBJ model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjSummary {
    pub num_vertices: usize,
    pub num_tex_coords: usize,
    pub num_normals: usize,
    pub num_faces: usize,
    pub has_tex_coords: bool,
    pub has_normals: bool,
}

/// A mesh loaded from an OBJ file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub vertices: Vec<Vertex>,
    pub tex_coords: Vec<TexCoord>,
    pub normals: Vec<Normal>,
    pub faces: Vec<Face>,
    pub has_tex_coords: bool,
    pub has_normals: bool,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Release every array and reset the presence flags
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn summary(&self) -> ObjSummary {
        ObjSummary {
            num_vertices: self.vertices.len(),
            num_tex_coords: self.tex_coords.len(),
            num_normals: self.normals.len(),
            num_faces: self.faces.len(),
            has_tex_coords: self.has_tex_coords,
            has_normals: self.has_normals,
        }
    }

    /// Built-in cube made of six quads with per-face normals
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;

        let vertices = vec![
            Vertex::new(-h, -h, h, 1.0),
            Vertex::new(h, -h, h, 1.0),
            Vertex::new(h, h, h, 1.0),
            Vertex::new(-h, h, h, 1.0),
            Vertex::new(-h, -h, -h, 1.0),
            Vertex::new(h, -h, -h, 1.0),
            Vertex::new(h, h, -h, 1.0),
            Vertex::new(-h, h, -h, 1.0),
        ];

        let normals = vec![
            Normal::new(0.0, 0.0, 1.0),
            Normal::new(0.0, 0.0, -1.0),
            Normal::new(0.0, 1.0, 0.0),
            Normal::new(0.0, -1.0, 0.0),
            Normal::new(1.0, 0.0, 0.0),
            Normal::new(-1.0, 0.0, 0.0),
        ];

        // Counter-clockwise when seen from outside
        let quads: [[usize; 4]; 6] = [
            [0, 1, 2, 3], // front
            [5, 4, 7, 6], // back
            [3, 2, 6, 7], // top
            [4, 5, 1, 0], // bottom
            [1, 5, 6, 2], // right
            [4, 0, 3, 7], // left
        ];

        let faces = quads
            .iter()
            .enumerate()
            .map(|(normal, corners)| Face {
                primitive: PrimitiveType::Quads,
                vertex_indices: corners.to_vec(),
                tex_coord_indices: None,
                normal_indices: Some(vec![normal; 4]),
            })
            .collect();

        Self {
            vertices,
            tex_coords: Vec::new(),
            normals,
            faces,
            has_tex_coords: false,
            has_normals: true,
        }
    }
}

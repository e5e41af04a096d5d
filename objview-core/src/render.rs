/// Immediate-mode rendering of a loaded model
use crate::geometry::{Model, PrimitiveType};

/// An immediate-mode drawing target.
///
/// Texture coordinate and normal calls set state that the following
/// `vertex4f` consumes.
pub trait DrawSurface {
    fn begin(&mut self, primitive: PrimitiveType);
    fn tex_coord4f(&mut self, u: f32, v: f32, w: f32, q: f32);
    fn normal3f(&mut self, i: f32, j: f32, k: f32);
    fn vertex4f(&mut self, x: f32, y: f32, z: f32, w: f32);
    fn end(&mut self);
}

/// Submit every face of `model` to `surface`, one begin/end bracket per face.
///
/// Each corner emits its texture coordinate, then its normal, then its
/// position. Indices were range-checked by the loader.
pub fn render_model<S: DrawSurface + ?Sized>(model: &Model, surface: &mut S) {
    for face in &model.faces {
        surface.begin(face.primitive);

        for corner in 0..face.num_elems() {
            if model.has_tex_coords {
                if let Some(indices) = &face.tex_coord_indices {
                    debug_assert!(indices[corner] < model.tex_coords.len());
                    let t = model.tex_coords[indices[corner]].uvw;
                    surface.tex_coord4f(t.x, t.y, t.z, 1.0);
                }
            }

            if model.has_normals {
                if let Some(indices) = &face.normal_indices {
                    debug_assert!(indices[corner] < model.normals.len());
                    let n = model.normals[indices[corner]].ijk;
                    surface.normal3f(n.x, n.y, n.z);
                }
            }

            let index = face.vertex_indices[corner];
            debug_assert!(index < model.vertices.len());
            let v = model.vertices[index].position;
            surface.vertex4f(v.x, v.y, v.z, v.w);
        }

        surface.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::load_obj_from_str;

    #[derive(Debug, PartialEq)]
    enum Call {
        Begin(PrimitiveType),
        TexCoord([f32; 4]),
        Normal([f32; 3]),
        Vertex([f32; 4]),
        End,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl DrawSurface for Recorder {
        fn begin(&mut self, primitive: PrimitiveType) {
            self.calls.push(Call::Begin(primitive));
        }

        fn tex_coord4f(&mut self, u: f32, v: f32, w: f32, q: f32) {
            self.calls.push(Call::TexCoord([u, v, w, q]));
        }

        fn normal3f(&mut self, i: f32, j: f32, k: f32) {
            self.calls.push(Call::Normal([i, j, k]));
        }

        fn vertex4f(&mut self, x: f32, y: f32, z: f32, w: f32) {
            self.calls.push(Call::Vertex([x, y, z, w]));
        }

        fn end(&mut self) {
            self.calls.push(Call::End);
        }
    }

    #[test]
    fn test_corner_emission_order() {
        let model = load_obj_from_str(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.25\nvn 0 0 1\nf 1/1/1 2/1/1 3/1/1\n",
        )
        .unwrap();

        let mut recorder = Recorder::default();
        render_model(&model, &mut recorder);

        let corner = |x: f32, y: f32| {
            [
                Call::TexCoord([0.5, 0.25, 0.0, 1.0]),
                Call::Normal([0.0, 0.0, 1.0]),
                Call::Vertex([x, y, 0.0, 1.0]),
            ]
        };

        let mut expected = vec![Call::Begin(PrimitiveType::Triangles)];
        expected.extend(corner(0.0, 0.0));
        expected.extend(corner(1.0, 0.0));
        expected.extend(corner(0.0, 1.0));
        expected.push(Call::End);

        assert_eq!(recorder.calls, expected);
    }

    #[test]
    fn test_positions_only() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 3 2 1\n").unwrap();

        let mut recorder = Recorder::default();
        render_model(&model, &mut recorder);

        assert_eq!(
            recorder.calls,
            vec![
                Call::Begin(PrimitiveType::Triangles),
                Call::Vertex([0.0, 1.0, 0.0, 1.0]),
                Call::Vertex([1.0, 0.0, 0.0, 1.0]),
                Call::Vertex([0.0, 0.0, 0.0, 1.0]),
                Call::End,
            ]
        );
    }

    #[test]
    fn test_one_bracket_per_face() {
        let model = Model::cube(2.0);
        let mut recorder = Recorder::default();
        render_model(&model, &mut recorder);

        let begins = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Begin(PrimitiveType::Quads)))
            .count();
        let vertices = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Vertex(_)))
            .count();
        assert_eq!(begins, 6);
        assert_eq!(vertices, 24);
        assert!(!recorder.calls.iter().any(|c| matches!(c, Call::TexCoord(_))));
    }
}

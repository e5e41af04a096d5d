/// objview core library - OBJ mesh loading and immediate-mode rendering
///
/// This library owns the in-memory mesh representation, the two-pass
/// Wavefront OBJ loader, and the renderer that replays a mesh against any
/// immediate-mode drawing surface.

pub mod error;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod render;
pub mod transform;

// Re-export commonly used types
pub use error::{IndexKind, ObjError};
pub use geometry::{Face, Model, Normal, ObjSummary, PrimitiveType, TexCoord, Vertex};
pub use obj::{load_obj, load_obj_from_reader, load_obj_from_str, scan_obj};
pub use projection::{Projection, Viewport};
pub use render::{render_model, DrawSurface};
pub use transform::{RotationState, Transform};

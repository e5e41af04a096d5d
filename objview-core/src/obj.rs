/// Wavefront OBJ loader.
///
/// Loading runs in two passes over the same text. The first pass counts
/// attributes and faces and decides the file-wide presence flags, the second
/// re-reads the data into arrays sized from those counts. The counts are
/// compared afterwards so a file that changed between reads is rejected,
/// and only then are face indices checked against the array sizes.
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, ErrorKind, Seek};
use std::path::Path;

use log::{debug, info, warn};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::space0,
    combinator::{all_consuming, map},
    multi::many_m_n,
    number::complete::float,
    sequence::{preceded, separated_pair, tuple},
    IResult,
};

use crate::error::{IndexKind, ObjError};
use crate::geometry::{Face, Model, Normal, ObjSummary, PrimitiveType, TexCoord, Vertex};

/// Which optional attributes a face entry references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    tex_coords: bool,
    normals: bool,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.tex_coords, self.normals) {
            (true, true) => write!(f, "v/t/n"),
            (false, true) => write!(f, "v//n"),
            (true, false) => write!(f, "v/t"),
            (false, false) => write!(f, "v"),
        }
    }
}

/// One face entry with the raw 1-based indices from the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    vertex: i64,
    tex_coord: Option<i64>,
    normal: Option<i64>,
}

impl Corner {
    fn new(vertex: i64, tex_coord: Option<i64>, normal: Option<i64>) -> Self {
        Self {
            vertex,
            tex_coord,
            normal,
        }
    }

    fn layout(&self) -> Layout {
        Layout {
            tex_coords: self.tex_coord.is_some(),
            normals: self.normal.is_some(),
        }
    }
}

/// A classified OBJ line with its keyword stripped
#[derive(Debug, PartialEq)]
enum Directive<'a> {
    Vertex(&'a str),
    TexCoord(&'a str),
    Normal(&'a str),
    Face(&'a str),
    Ignored(&'a str),
    Unknown(&'a str),
    Blank,
}

fn classify(line: &str) -> Directive<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Directive::Blank;
    }

    let (keyword, rest) = match line.split_once(|c: char| c.is_whitespace()) {
        Some((keyword, rest)) => (keyword, rest.trim_start()),
        None => (line, ""),
    };

    match keyword {
        "v" => Directive::Vertex(rest),
        "vt" => Directive::TexCoord(rest),
        "vn" => Directive::Normal(rest),
        "f" => Directive::Face(rest),
        "g" | "o" | "s" | "mtllib" | "usemtl" => Directive::Ignored(keyword),
        _ => Directive::Unknown(keyword),
    }
}

fn number(input: &str) -> IResult<&str, f32> {
    preceded(space0, float)(input)
}

fn index(input: &str) -> IResult<&str, i64> {
    nom::character::complete::i64(input)
}

/// Up to `max` leading floats; parsing stops at the first non-number
fn leading_floats(input: &str, max: usize) -> Vec<f32> {
    many_m_n(0, max, number)(input)
        .map(|(_, values)| values)
        .unwrap_or_default()
}

/// Face entry forms, most specific first: `v/t/n`, `v//n`, `v/t`, `v`
fn corner(input: &str) -> IResult<&str, Corner> {
    alt((
        map(
            tuple((
                index,
                preceded(tag("/"), index),
                preceded(tag("/"), index),
            )),
            |(v, t, n)| Corner::new(v, Some(t), Some(n)),
        ),
        map(separated_pair(index, tag("//"), index), |(v, n)| {
            Corner::new(v, None, Some(n))
        }),
        map(separated_pair(index, tag("/"), index), |(v, t)| {
            Corner::new(v, Some(t), None)
        }),
        map(index, |v| Corner::new(v, None, None)),
    ))(input)
}

fn parse_corner(entry: &str) -> Option<Corner> {
    all_consuming(corner)(entry).ok().map(|(_, c)| c)
}

fn first_corner(rest: &str) -> Option<Corner> {
    rest.split_whitespace().next().and_then(parse_corner)
}

fn parse_vertex(rest: &str) -> Option<Vertex> {
    match leading_floats(rest, 4).as_slice() {
        &[x, y, z, w] => Some(Vertex::new(x, y, z, w)),
        &[x, y, z] => Some(Vertex::new(x, y, z, 1.0)),
        _ => None,
    }
}

fn parse_tex_coord(rest: &str) -> Option<TexCoord> {
    match leading_floats(rest, 3).as_slice() {
        &[u, v, w] => Some(TexCoord::new(u, v, w)),
        &[u, v] => Some(TexCoord::new(u, v, 0.0)),
        &[u] => Some(TexCoord::new(u, 0.0, 0.0)),
        _ => None,
    }
}

fn parse_normal(rest: &str) -> Option<Normal> {
    match leading_floats(rest, 3).as_slice() {
        &[i, j, k] => Some(Normal::new(i, j, k)),
        _ => None,
    }
}

/// Read the next line, replacing bytes that are not valid UTF-8.
///
/// `buf` is reused and grows to fit the line. Returns `None` at end of input.
fn next_line<'a, R: BufRead>(
    reader: &mut R,
    buf: &'a mut Vec<u8>,
) -> Result<Option<Cow<'a, str>>, ObjError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf)))
}

/// First pass: count attributes and faces and settle the presence flags.
///
/// Face lines whose first entry matches no known form are skipped with a
/// warning; the second pass skips the same lines.
pub fn scan_obj<R: BufRead>(mut reader: R) -> Result<ObjSummary, ObjError> {
    let mut summary = ObjSummary::default();
    let mut layout: Option<Layout> = None;

    let mut buf = Vec::new();
    let mut line_no: usize = 0;
    while let Some(line) = next_line(&mut reader, &mut buf)? {
        line_no += 1;

        match classify(&line) {
            Directive::Vertex(_) => summary.num_vertices += 1,
            Directive::TexCoord(_) => summary.num_tex_coords += 1,
            Directive::Normal(_) => summary.num_normals += 1,
            Directive::Face(rest) => match first_corner(rest) {
                Some(corner) => {
                    let found = corner.layout();
                    match layout {
                        None => layout = Some(found),
                        Some(expected) if expected != found => {
                            return Err(ObjError::InconsistentAttributes(format!(
                                "line {line_no}: face uses {found} entries but earlier faces use {expected}"
                            )));
                        }
                        Some(_) => {}
                    }
                    summary.num_faces += 1;
                }
                None => warn!("line {}: found face with no vertex (skipping)", line_no),
            },
            Directive::Ignored(keyword) => debug!("line {}: ignoring \"{}\"", line_no, keyword),
            Directive::Unknown(keyword) => {
                warn!("line {}: unknown token \"{}\" (ignoring)", line_no, keyword)
            }
            Directive::Blank => {}
        }
    }

    if let Some(layout) = layout {
        summary.has_tex_coords = layout.tex_coords;
        summary.has_normals = layout.normals;
    }

    if summary.has_tex_coords && summary.num_tex_coords == 0 {
        return Err(ObjError::InconsistentAttributes(
            "faces reference texture coordinates but none are defined".to_string(),
        ));
    }
    if summary.has_normals && summary.num_normals == 0 {
        return Err(ObjError::InconsistentAttributes(
            "faces reference normals but none are defined".to_string(),
        ));
    }
    if summary.num_vertices == 0 {
        return Err(ObjError::NoVertices);
    }

    info!(
        "first pass: {} vertices, {} texture coords, {} normals, {} faces (texture coords: {}, normals: {})",
        summary.num_vertices,
        summary.num_tex_coords,
        summary.num_normals,
        summary.num_faces,
        summary.has_tex_coords,
        summary.has_normals
    );

    Ok(summary)
}

/// Convert a 1-based index to 0-based; the upper bound is checked once the pass is done
fn to_zero_based(
    index: i64,
    kind: IndexKind,
    count: usize,
    line: usize,
) -> Result<usize, ObjError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i >= 1)
        .map(|i| i - 1)
        .ok_or(ObjError::IndexOutOfRange {
            line,
            kind,
            index,
            count,
        })
}

fn parse_face(rest: &str, expected: &ObjSummary, line: usize) -> Result<Option<Face>, ObjError> {
    if first_corner(rest).is_none() {
        return Ok(None);
    }

    let entries: Vec<&str> = rest.split_whitespace().collect();
    let primitive = PrimitiveType::from_corner_count(entries.len()).ok_or(
        ObjError::DegenerateFace {
            line,
            corners: entries.len(),
        },
    )?;

    let layout = Layout {
        tex_coords: expected.has_tex_coords,
        normals: expected.has_normals,
    };

    let mut vertex_indices = Vec::with_capacity(entries.len());
    let mut tex_coord_indices = layout.tex_coords.then(|| Vec::with_capacity(entries.len()));
    let mut normal_indices = layout.normals.then(|| Vec::with_capacity(entries.len()));

    for entry in entries {
        let corner = parse_corner(entry).ok_or_else(|| ObjError::MalformedFace {
            line,
            entry: entry.to_string(),
        })?;
        if corner.layout() != layout {
            return Err(ObjError::InconsistentAttributes(format!(
                "line {line}: face entry \"{entry}\" does not match the file-wide {layout} layout"
            )));
        }

        vertex_indices.push(to_zero_based(
            corner.vertex,
            IndexKind::Vertex,
            expected.num_vertices,
            line,
        )?);
        if let (Some(indices), Some(t)) = (tex_coord_indices.as_mut(), corner.tex_coord) {
            indices.push(to_zero_based(
                t,
                IndexKind::TexCoord,
                expected.num_tex_coords,
                line,
            )?);
        }
        if let (Some(indices), Some(n)) = (normal_indices.as_mut(), corner.normal) {
            indices.push(to_zero_based(
                n,
                IndexKind::Normal,
                expected.num_normals,
                line,
            )?);
        }
    }

    Ok(Some(Face {
        primitive,
        vertex_indices,
        tex_coord_indices,
        normal_indices,
    }))
}

/// Range-check every face index against the populated arrays
fn check_indices(model: &Model, face_lines: &[usize]) -> Result<(), ObjError> {
    for (face, &line) in model.faces.iter().zip(face_lines) {
        let groups = [
            (IndexKind::Vertex, Some(&face.vertex_indices), model.vertices.len()),
            (IndexKind::TexCoord, face.tex_coord_indices.as_ref(), model.tex_coords.len()),
            (IndexKind::Normal, face.normal_indices.as_ref(), model.normals.len()),
        ];

        for (kind, indices, count) in groups {
            if let Some(&i) = indices.into_iter().flatten().find(|&&i| i >= count) {
                return Err(ObjError::IndexOutOfRange {
                    line,
                    kind,
                    index: i as i64 + 1,
                    count,
                });
            }
        }
    }
    Ok(())
}

fn check_pass(first: &ObjSummary, second: &ObjSummary) -> Result<(), ObjError> {
    let counts = [
        ("vertex", first.num_vertices, second.num_vertices),
        ("texture coordinate", first.num_tex_coords, second.num_tex_coords),
        ("normal", first.num_normals, second.num_normals),
        ("face", first.num_faces, second.num_faces),
    ];

    for (what, first, second) in counts {
        if first != second {
            return Err(ObjError::PassMismatch {
                what,
                first,
                second,
            });
        }
    }
    Ok(())
}

/// Second pass: populate a model whose arrays are sized from `expected`
fn populate<R: BufRead>(mut reader: R, expected: &ObjSummary) -> Result<Model, ObjError> {
    let mut model = Model {
        vertices: Vec::with_capacity(expected.num_vertices),
        tex_coords: Vec::with_capacity(expected.num_tex_coords),
        normals: Vec::with_capacity(expected.num_normals),
        faces: Vec::with_capacity(expected.num_faces),
        has_tex_coords: expected.has_tex_coords,
        has_normals: expected.has_normals,
    };
    let mut face_lines = Vec::with_capacity(expected.num_faces);

    let mut buf = Vec::new();
    let mut line_no: usize = 0;
    while let Some(line) = next_line(&mut reader, &mut buf)? {
        line_no += 1;

        match classify(&line) {
            Directive::Vertex(rest) => {
                let vertex =
                    parse_vertex(rest).ok_or(ObjError::MalformedVertex { line: line_no })?;
                model.vertices.push(vertex);
            }
            Directive::TexCoord(rest) => {
                let tex_coord =
                    parse_tex_coord(rest).ok_or(ObjError::MalformedTexCoord { line: line_no })?;
                model.tex_coords.push(tex_coord);
            }
            Directive::Normal(rest) => {
                let normal =
                    parse_normal(rest).ok_or(ObjError::MalformedNormal { line: line_no })?;
                model.normals.push(normal);
            }
            Directive::Face(rest) => {
                if let Some(face) = parse_face(rest, expected, line_no)? {
                    model.faces.push(face);
                    face_lines.push(line_no);
                }
            }
            Directive::Ignored(_) | Directive::Unknown(_) | Directive::Blank => {}
        }
    }

    let populated = model.summary();
    check_pass(expected, &populated)?;
    check_indices(&model, &face_lines)?;

    info!(
        "second pass: read {} vertices, {} texture coords, {} normals, {} faces",
        populated.num_vertices,
        populated.num_tex_coords,
        populated.num_normals,
        populated.num_faces
    );

    Ok(model)
}

/// Only a missing file is `FileNotFound`; other open failures stay plain I/O errors
fn open_error(path: &Path, source: std::io::Error) -> ObjError {
    match source.kind() {
        ErrorKind::NotFound => ObjError::FileNotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => ObjError::Io(source),
    }
}

/// Load an OBJ model from a file path
pub fn load_obj(path: impl AsRef<Path>) -> Result<Model, ObjError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| open_error(path, source))?;
    load_obj_from_reader(BufReader::new(file))
}

/// Load an OBJ model from a seekable reader, rewinding it between passes
pub fn load_obj_from_reader<R: BufRead + Seek>(mut reader: R) -> Result<Model, ObjError> {
    let summary = scan_obj(&mut reader)?;
    reader.rewind()?;
    populate(&mut reader, &summary)
}

/// Load an OBJ model from in-memory text
pub fn load_obj_from_str(contents: &str) -> Result<Model, ObjError> {
    load_obj_from_reader(Cursor::new(contents.as_bytes()))
}

impl Model {
    /// Replace this model with the contents of an OBJ file.
    ///
    /// On any failure the model is left empty.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ObjError> {
        self.clear();
        *self = load_obj(path)?;
        Ok(())
    }
}

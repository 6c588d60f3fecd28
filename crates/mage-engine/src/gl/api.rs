use std::fmt;

use super::GlError;

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data (`GL_ARRAY_BUFFER`).
    Array,
    /// Vertex indices (`GL_ELEMENT_ARRAY_BUFFER`).
    ElementArray,
}

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    /// Infers the stage from a source file extension.
    ///
    /// Accepts the common short and long forms (`vert`/`vs`, `frag`/`fs`,
    /// `geom`/`gs`), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "vert" | "vs" => Some(Self::Vertex),
            "frag" | "fs" => Some(Self::Fragment),
            "geom" | "gs" => Some(Self::Geometry),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
        };
        f.write_str(s)
    }
}

/// GLSL source for one pipeline stage.
#[derive(Debug, Copy, Clone)]
pub struct ShaderSource<'a> {
    pub stage: ShaderStage,
    pub source: &'a str,
}

impl<'a> ShaderSource<'a> {
    #[inline]
    pub fn new(stage: ShaderStage, source: &'a str) -> Self {
        Self { stage, source }
    }
}

/// The stateful, handle-based GL surface every GPU call in this crate goes through.
///
/// Binding calls mutate process-wide state: whatever was bound before is
/// replaced, and stays bound until something else replaces it. Callers are
/// expected to pair every bind with an unbind (see [`super::scope`]).
///
/// Implementations are single-context and thread-affine. All methods take
/// `&self`; the context is shared between resources through `Rc`.
pub trait GlApi {
    type VertexArray: Copy + fmt::Debug + Eq;
    type Buffer: Copy + fmt::Debug + Eq;
    type Program: Copy + fmt::Debug + Eq;
    type UniformLocation: Clone + fmt::Debug;

    // ── vertex arrays ─────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError>;

    /// Makes `vertex_array` current. `None` restores the neutral state.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    // ── buffers ───────────────────────────────────────────────────────────

    /// Creates a buffer object and uploads `data` with static usage.
    ///
    /// The binding for `target` is left at `None` afterwards. Element buffers
    /// must therefore be rebound before an indexed draw.
    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, GlError>;

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);

    fn delete_buffer(&self, buffer: Self::Buffer);

    // ── programs ──────────────────────────────────────────────────────────

    /// Compiles every stage and links them into a program.
    ///
    /// Stage objects are discarded once linking finishes, whatever the outcome.
    fn create_program(&self, stages: &[ShaderSource<'_>]) -> Result<Self::Program, GlError>;

    fn use_program(&self, program: Option<Self::Program>);

    fn delete_program(&self, program: Self::Program);

    /// Returns `None` when the program does not declare an active attribute `name`.
    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Returns `None` when the program does not declare an active uniform `name`.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;

    // ── attribute slots ───────────────────────────────────────────────────

    /// Sources slot `location` from `buffer`, tightly packed groups of
    /// `components` floats, and enables the slot.
    fn enable_attribute(&self, location: u32, buffer: Self::Buffer, components: i32);

    fn disable_attribute(&self, location: u32);

    // ── uniforms (current program) ────────────────────────────────────────

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);
    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32);
    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32);
    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32);
    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);

    /// Column-major 3x3 matrix.
    fn uniform_matrix_3_f32(&self, location: &Self::UniformLocation, m: &[f32; 9]);

    /// Column-major 4x4 matrix.
    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, m: &[f32; 16]);

    // ── draws ─────────────────────────────────────────────────────────────

    /// Non-indexed triangle draw of `count` vertices from the enabled slots.
    fn draw_arrays(&self, count: i32);

    /// Indexed triangle draw of `count` `u32` indices from the bound element buffer.
    fn draw_elements(&self, count: i32);
}

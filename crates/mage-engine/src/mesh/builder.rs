use std::fmt;
use std::path::Path;
use std::rc::Rc;

use glam::{Vec2, Vec3, Vec4};

use crate::buffer::{ArrayBuffer, IndexBuffer};
use crate::gl::{GlApi, VertexArrayBinding};
use crate::shader::Shader;

use super::{IntoUniform, Mesh, MeshError};

/// Assembles a [`Mesh`].
///
/// The mesh's vertex array stays bound from [`MeshBuilder::new`] until the
/// builder is consumed by [`MeshBuilder::create`] or dropped. Fallible steps
/// consume the builder and hand it back on success; on failure the builder is
/// dropped, which unbinds the vertex array and releases everything attached
/// so far.
///
/// ```ignore
/// let mesh = MeshBuilder::new(&gl)?
///     .add_vector3_attribute("position", [Vec3::ZERO, Vec3::X, Vec3::Y])?
///     .set_indices([0, 1, 2])?
///     .load_shader(["basic.vert", "basic.frag"])?
///     .create();
/// ```
#[must_use = "a builder does nothing until `create` is called"]
pub struct MeshBuilder<G: GlApi> {
    // Field order is drop order: the mesh is released before the unbind.
    mesh: Mesh<G>,
    scope: VertexArrayBinding<G>,
}

impl<G: GlApi> MeshBuilder<G> {
    /// Allocates a new mesh and binds its vertex array.
    pub fn new(gl: &Rc<G>) -> Result<Self, MeshError> {
        let mesh = Mesh::new(gl)?;
        let scope = VertexArrayBinding::new(Rc::clone(gl), mesh.handle());
        Ok(Self { mesh, scope })
    }

    // ── attributes ────────────────────────────────────────────────────────

    /// Attaches `buffer` as attribute `name`.
    ///
    /// Fails with [`MeshError::DuplicateAttribute`] if `name` is taken and
    /// with [`MeshError::NullBuffer`] if `buffer` is `None`.
    pub fn add_buffer_attribute(
        mut self,
        name: impl Into<String>,
        buffer: impl Into<Option<ArrayBuffer<G>>>,
    ) -> Result<Self, MeshError> {
        let name = name.into();
        let buffer = buffer.into();
        if let Some(b) = &buffer {
            log::debug!(
                "mesh {:?}: attribute {name:?} ({} x {})",
                self.mesh.handle(),
                b.element_count(),
                b.element_width()
            );
        }
        self.mesh.add_attribute(name, buffer)?;
        Ok(self)
    }

    /// Uploads `values` as elements of `element_width` floats each.
    pub fn add_float_array_attribute(
        self,
        name: impl Into<String>,
        element_width: usize,
        values: &[f32],
    ) -> Result<Self, MeshError> {
        let buffer = ArrayBuffer::new(&self.gl(), element_width, values)?;
        self.add_buffer_attribute(name, buffer)
    }

    pub fn add_vector2_array_attribute(
        self,
        name: impl Into<String>,
        values: &[f32],
    ) -> Result<Self, MeshError> {
        self.add_float_array_attribute(name, 2, values)
    }

    pub fn add_vector3_array_attribute(
        self,
        name: impl Into<String>,
        values: &[f32],
    ) -> Result<Self, MeshError> {
        self.add_float_array_attribute(name, 3, values)
    }

    pub fn add_vector4_array_attribute(
        self,
        name: impl Into<String>,
        values: &[f32],
    ) -> Result<Self, MeshError> {
        self.add_float_array_attribute(name, 4, values)
    }

    pub fn add_vector2_attribute(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = Vec2>,
    ) -> Result<Self, MeshError> {
        let flat: Vec<f32> = values.into_iter().flat_map(|v| v.to_array()).collect();
        self.add_vector2_array_attribute(name, &flat)
    }

    pub fn add_vector3_attribute(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = Vec3>,
    ) -> Result<Self, MeshError> {
        let flat: Vec<f32> = values.into_iter().flat_map(|v| v.to_array()).collect();
        self.add_vector3_array_attribute(name, &flat)
    }

    pub fn add_vector4_attribute(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = Vec4>,
    ) -> Result<Self, MeshError> {
        let flat: Vec<f32> = values.into_iter().flat_map(|v| v.to_array()).collect();
        self.add_vector4_array_attribute(name, &flat)
    }

    // ── indices ───────────────────────────────────────────────────────────

    /// Replaces the index buffer. The previous one, if any, is released.
    pub fn set_index_buffer(mut self, index_buffer: IndexBuffer<G>) -> Self {
        log::debug!(
            "mesh {:?}: {} indices",
            self.mesh.handle(),
            index_buffer.len()
        );
        self.mesh.set_index_buffer(index_buffer);
        self
    }

    pub fn set_indices(self, indices: impl IntoIterator<Item = u32>) -> Result<Self, MeshError> {
        let indices: Vec<u32> = indices.into_iter().collect();
        let index_buffer = IndexBuffer::new(&self.gl(), &indices)?;
        Ok(self.set_index_buffer(index_buffer))
    }

    // ── shader / uniforms ─────────────────────────────────────────────────

    pub fn set_shader(mut self, shader: impl Into<Option<Rc<Shader<G>>>>) -> Self {
        self.mesh.set_shader(shader);
        self
    }

    /// Loads, compiles and links a program from source files and uses it
    /// as the mesh's shader.
    pub fn load_shader<P: AsRef<Path>>(
        self,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, MeshError> {
        let shader = Shader::load_program(&self.gl(), paths)?;
        Ok(self.set_shader(Rc::new(shader)))
    }

    pub fn set_uniform(mut self, name: impl Into<String>, value: impl IntoUniform) -> Self {
        self.mesh.set_uniform(name, value);
        self
    }

    // ── finish ────────────────────────────────────────────────────────────

    /// Unbinds the vertex array and returns the finished mesh.
    pub fn create(self) -> Mesh<G> {
        let Self { mesh, scope } = self;
        drop(scope);
        log::debug!(
            "mesh {:?} created: {} attributes, indexed: {}",
            mesh.handle(),
            mesh.attribute_count(),
            mesh.index_buffer().is_some()
        );
        mesh
    }

    /// The mesh assembled so far.
    pub fn mesh(&self) -> &Mesh<G> {
        &self.mesh
    }

    fn gl(&self) -> Rc<G> {
        Rc::clone(self.mesh.gl())
    }
}

impl<G: GlApi> fmt::Debug for MeshBuilder<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshBuilder").field("mesh", &self.mesh).finish()
    }
}

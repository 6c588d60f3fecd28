use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::buffer::{ArrayBuffer, IndexBuffer};
use crate::gl::{GlApi, VertexArrayBinding};
use crate::shader::{ProgramBinding, Shader};

use super::{IntoUniform, MeshError, Uniform};

/// A static polygon mesh: attribute buffers bound to shader inputs by name,
/// an optional index buffer describing the triangles, named uniforms, and
/// the shader used to draw it.
///
/// Meshes are assembled with [`MeshBuilder`](super::MeshBuilder). After
/// `create` the attribute set is fixed; the shader and uniforms can change
/// between draws.
///
/// Without an index buffer, the vertex count comes from one of the attribute
/// buffers; which one is unspecified. All attributes must then hold the
/// same number of elements. This is not checked.
pub struct Mesh<G: GlApi> {
    gl: Rc<G>,
    handle: G::VertexArray,
    shader: Option<Rc<Shader<G>>>,
    index_buffer: Option<IndexBuffer<G>>,
    attributes: HashMap<String, ArrayBuffer<G>>,
    uniforms: HashMap<String, Uniform>,
}

impl<G: GlApi> Mesh<G> {
    pub(crate) fn new(gl: &Rc<G>) -> Result<Self, MeshError> {
        let handle = gl.create_vertex_array()?;
        log::debug!("mesh vertex array {handle:?} created");

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            shader: None,
            index_buffer: None,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        })
    }

    /// The vertex array object backing this mesh.
    #[inline]
    pub fn handle(&self) -> G::VertexArray {
        self.handle
    }

    pub(crate) fn gl(&self) -> &Rc<G> {
        &self.gl
    }

    // ── shader ────────────────────────────────────────────────────────────

    /// Replaces the shader used by [`Mesh::draw`]. `None` makes the mesh undrawable.
    pub fn set_shader(&mut self, shader: impl Into<Option<Rc<Shader<G>>>>) -> &mut Self {
        self.shader = shader.into();
        self
    }

    pub fn shader(&self) -> Option<&Rc<Shader<G>>> {
        self.shader.as_ref()
    }

    // ── attributes / indices ──────────────────────────────────────────────

    /// Attaches `buffer` as attribute `name`, taking ownership of it.
    ///
    /// The existing attribute is left untouched on a duplicate name.
    pub(crate) fn add_attribute(
        &mut self,
        name: impl Into<String>,
        buffer: Option<ArrayBuffer<G>>,
    ) -> Result<(), MeshError> {
        let name = name.into();
        if self.attributes.contains_key(&name) {
            return Err(MeshError::DuplicateAttribute(name));
        }
        let Some(buffer) = buffer else {
            return Err(MeshError::NullBuffer(name));
        };

        self.attributes.insert(name, buffer);
        Ok(())
    }

    pub(crate) fn set_index_buffer(&mut self, index_buffer: IndexBuffer<G>) {
        self.index_buffer = Some(index_buffer);
    }

    pub fn attribute(&self, name: &str) -> Option<&ArrayBuffer<G>> {
        self.attributes.get(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer<G>> {
        self.index_buffer.as_ref()
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Stores `value` under `name`, replacing any previous value of any type.
    /// A `None` value removes the uniform instead.
    pub fn set_uniform(&mut self, name: impl Into<String>, value: impl IntoUniform) -> &mut Self {
        let name = name.into();
        match value.into_uniform() {
            Some(uniform) => {
                self.uniforms.insert(name, uniform);
            }
            None => {
                self.uniforms.remove(&name);
            }
        }
        self
    }

    pub fn clear_uniform(&mut self, name: &str) -> &mut Self {
        self.uniforms.remove(name);
        self
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &Uniform)> {
        self.uniforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Draws the mesh with its current shader and uniforms.
    ///
    /// Binds the vertex array and program, sources every attribute slot,
    /// sends every uniform, issues one draw (indexed if an index buffer is
    /// set), then disables the slots and unbinds program and vertex array.
    ///
    /// A mesh without a shader or without attributes draws nothing and
    /// touches no GL state. Attributes and uniforms the program does not
    /// declare are skipped.
    pub fn draw(&self) -> &Self {
        let Some(shader) = self.shader.as_deref() else {
            log::trace!("mesh {:?}: no shader, draw skipped", self.handle);
            return self;
        };
        if self.attributes.is_empty() {
            log::trace!("mesh {:?}: no attributes, draw skipped", self.handle);
            return self;
        }

        // Declaration order matters: the program guard drops first, disabling
        // its slots while the vertex array is still bound.
        let _vertex_array = VertexArrayBinding::new(Rc::clone(&self.gl), self.handle);
        let mut program = ProgramBinding::new(shader);

        for (name, buffer) in &self.attributes {
            program.bind_attribute(name, buffer);
        }
        log::trace!(
            "mesh {:?}: {} of {} attributes bound",
            self.handle,
            program.bound_attributes().len(),
            self.attributes.len()
        );

        for (name, uniform) in &self.uniforms {
            uniform.dispatch(shader, name);
        }

        match &self.index_buffer {
            Some(indices) => indices.draw(),
            None => {
                if let Some(buffer) = self.attributes.values().next() {
                    buffer.draw();
                }
            }
        }

        self
    }
}

impl<G: GlApi> Drop for Mesh<G> {
    fn drop(&mut self) {
        // Buffers are released by their own drops right after.
        self.gl.delete_vertex_array(self.handle);
    }
}

impl<G: GlApi> fmt::Debug for Mesh<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("handle", &self.handle)
            .field("shader", &self.shader)
            .field("index_buffer", &self.index_buffer)
            .field("attributes", &self.attributes)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

    use super::*;
    use crate::gl::{HeadlessGl, ShaderSource, ShaderStage};
    use crate::gl::headless::{DrawKind, GlCall, UniformCall};
    use crate::mesh::MeshBuilder;
    use crate::mesh::fixtures::{headless, pass_through};

    fn triangle(gl: &Rc<HeadlessGl>) -> MeshBuilder<HeadlessGl> {
        MeshBuilder::new(gl)
            .unwrap()
            .add_vector3_attribute("position", [Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap()
    }

    fn uniform_calls(gl: &HeadlessGl) -> Vec<(String, UniformCall)> {
        gl.calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::Uniform { name, value } => Some((name, value)),
                _ => None,
            })
            .collect()
    }

    // ── undrawable meshes ─────────────────────────────────────────────────

    #[test]
    fn draw_without_shader_is_a_no_op() {
        let gl = headless();
        let mesh = triangle(&gl).create();
        gl.take_calls();

        mesh.draw();

        assert!(gl.calls().is_empty());
        assert!(gl.draws().is_empty());
        assert_eq!(gl.bound_vertex_array(), None);
        assert_eq!(gl.bound_program(), None);
    }

    #[test]
    fn draw_without_attributes_is_a_no_op() {
        let gl = headless();
        let mesh = MeshBuilder::new(&gl)
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();
        gl.take_calls();

        mesh.draw();

        assert!(gl.calls().is_empty());
        assert!(gl.draws().is_empty());
    }

    #[test]
    fn clearing_the_shader_makes_mesh_undrawable() {
        let gl = headless();
        let mut mesh = triangle(&gl).set_shader(pass_through(&gl)).create();
        mesh.set_shader(None);
        mesh.draw();
        assert!(gl.draws().is_empty());
    }

    // ── attribute preconditions ───────────────────────────────────────────

    #[test]
    fn duplicate_attribute_is_rejected_and_original_kept() {
        let gl = headless();
        let mut mesh = triangle(&gl).create();
        let original = mesh.attribute("position").unwrap().handle();

        let extra = ArrayBuffer::new(&gl, 2, &[0.0; 6]).unwrap();
        let err = mesh.add_attribute("position", Some(extra)).unwrap_err();

        assert!(matches!(err, MeshError::DuplicateAttribute(ref n) if n == "position"));
        let kept = mesh.attribute("position").unwrap();
        assert_eq!(kept.handle(), original);
        assert_eq!(kept.element_width(), 3);
        assert_eq!(mesh.attribute_count(), 1);
    }

    #[test]
    fn absent_buffer_is_rejected() {
        let gl = headless();
        let mut mesh = triangle(&gl).create();
        let err = mesh.add_attribute("normal", None).unwrap_err();
        assert!(matches!(err, MeshError::NullBuffer(ref n) if n == "normal"));
        assert!(mesh.attribute("normal").is_none());
    }

    // ── binding discipline ────────────────────────────────────────────────

    #[test]
    fn draw_restores_neutral_state() {
        let gl = headless();
        let mesh = MeshBuilder::new(&gl)
            .unwrap()
            .add_vector3_attribute("position", [Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap()
            .add_vector2_attribute("uv", [Vec2::ZERO, Vec2::X, Vec2::Y])
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();

        mesh.draw();

        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].attributes.len(), 2);
        assert_eq!(draws[0].vertex_array, Some(mesh.handle()));

        assert!(gl.enabled_attributes(mesh.handle()).is_empty());
        assert_eq!(gl.bound_program(), None);
        assert_eq!(gl.bound_vertex_array(), None);
        assert!(gl.errors().is_empty());
    }

    #[test]
    fn undeclared_attribute_is_skipped() {
        let gl = headless();
        let mesh = triangle(&gl)
            .add_float_array_attribute("tangent", 4, &[0.0; 12])
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();

        mesh.draw();

        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].attributes.len(), 1);
        assert!(gl.errors().is_empty());
    }

    #[test]
    fn repeated_draws_do_not_accumulate_state() {
        let gl = headless();
        let shader = pass_through(&gl);
        let a = triangle(&gl).set_shader(Rc::clone(&shader)).create();
        let b = triangle(&gl).set_shader(shader).create();

        a.draw();
        b.draw();
        a.draw();

        let draws = gl.draws();
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|d| d.attributes.len() == 1));
        assert_eq!(draws[1].vertex_array, Some(b.handle()));
        assert_eq!(gl.bound_vertex_array(), None);
    }

    // ── draw dispatch ─────────────────────────────────────────────────────

    #[test]
    fn non_indexed_draw_uses_vertex_count() {
        let gl = headless();
        let positions = [0.0_f32; 3 * 7];
        let mesh = MeshBuilder::new(&gl)
            .unwrap()
            .add_vector3_array_attribute("position", &positions)
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();

        mesh.draw();

        let draws: Vec<_> = gl.calls().into_iter().filter(GlCall::is_draw).collect();
        assert_eq!(draws, [GlCall::DrawArrays { count: 7 }]);
    }

    #[test]
    fn indexed_draw_uses_index_count() {
        let gl = headless();
        let mesh = triangle(&gl)
            .set_indices([0, 1, 2, 2, 1, 0, 0, 2, 1])
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();

        mesh.draw();

        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].kind, DrawKind::Elements);
        assert_eq!(draws[0].count, 9);
        assert_eq!(draws[0].element_buffer, mesh.index_buffer().map(|i| i.handle()));
    }

    #[test]
    fn triangle_scenario() {
        let gl = headless();
        let mesh = MeshBuilder::new(&gl)
            .unwrap()
            .add_vector3_attribute(
                "position",
                [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            )
            .unwrap()
            .set_indices([0, 1, 2])
            .unwrap()
            .set_shader(pass_through(&gl))
            .create();

        mesh.draw();

        let draws: Vec<_> = gl.calls().into_iter().filter(GlCall::is_draw).collect();
        assert_eq!(draws, [GlCall::DrawElements { count: 3 }]);

        let position = mesh.attribute("position").unwrap();
        assert_eq!(
            gl.buffer_f32(position.handle()).unwrap(),
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniforms_are_dispatched_by_type() {
        let gl = headless();
        let mut mesh = triangle(&gl).set_shader(pass_through(&gl)).create();
        mesh.set_uniform("color", Vec3::new(1.0, 0.5, 0.0))
            .set_uniform("alpha", 0.25_f32);
        gl.take_calls();

        mesh.draw();

        let mut sent = uniform_calls(&gl);
        sent.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            sent,
            [
                ("alpha".to_string(), UniformCall::F1(0.25)),
                ("color".to_string(), UniformCall::F3([1.0, 0.5, 0.0])),
            ]
        );
    }

    #[test]
    fn every_uniform_kind_reaches_its_typed_call() {
        const VS: &str = "in vec3 position;
            uniform mat3 uNormal;
            uniform mat4 uWorld;
            uniform vec2 uOffset;
            uniform vec3 uLight;
            uniform vec4 uTint;
            void main() {}";
        const FS: &str = "uniform float uAlpha;
            uniform int uMode;
            uniform bool uLit;
            void main() {}";

        let gl = headless();
        let shader = Shader::from_sources(
            &gl,
            &[ShaderSource::new(ShaderStage::Vertex, VS), ShaderSource::new(ShaderStage::Fragment, FS)],
        )
        .unwrap();
        let world = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));

        let mut mesh = triangle(&gl).set_shader(Rc::new(shader)).create();
        mesh.set_uniform("uNormal", Mat3::from_diagonal(Vec3::new(1.0, 2.0, 3.0)))
            .set_uniform("uWorld", world)
            .set_uniform("uOffset", Vec2::new(1.0, 2.0))
            .set_uniform("uLight", Vec3::new(1.0, 2.0, 3.0))
            .set_uniform("uTint", Vec4::new(1.0, 2.0, 3.0, 4.0))
            .set_uniform("uAlpha", 0.5_f32)
            .set_uniform("uMode", 7_i32)
            .set_uniform("uLit", true);
        gl.take_calls();

        mesh.draw();

        let mut sent = uniform_calls(&gl);
        sent.sort_by(|a, b| a.0.cmp(&b.0));
        let expected = [
            ("uAlpha", UniformCall::F1(0.5)),
            ("uLight", UniformCall::F3([1.0, 2.0, 3.0])),
            ("uLit", UniformCall::I1(1)),
            ("uMode", UniformCall::I1(7)),
            ("uNormal", UniformCall::Mat3([1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0])),
            ("uOffset", UniformCall::F2([1.0, 2.0])),
            ("uTint", UniformCall::F4([1.0, 2.0, 3.0, 4.0])),
            ("uWorld", UniformCall::Mat4(world.to_cols_array())),
        ]
        .map(|(name, call)| (name.to_string(), call));
        assert_eq!(sent, expected);
        assert!(gl.errors().is_empty());
    }

    #[test]
    fn removed_uniform_is_not_dispatched() {
        let gl = headless();
        let mut mesh = triangle(&gl).set_shader(pass_through(&gl)).create();
        mesh.set_uniform("alpha", 1.0_f32);
        mesh.set_uniform("alpha", None::<f32>);
        assert!(mesh.uniform("alpha").is_none());

        mesh.draw();

        assert!(uniform_calls(&gl).is_empty());
    }

    #[test]
    fn last_uniform_type_wins() {
        let gl = headless();
        let mut mesh = triangle(&gl).set_shader(pass_through(&gl)).create();
        mesh.set_uniform("color", Vec3::ONE);
        mesh.set_uniform("color", 2.0_f32);
        assert_eq!(mesh.uniform("color"), Some(&Uniform::Float(2.0)));

        mesh.draw();

        assert_eq!(
            uniform_calls(&gl),
            [("color".to_string(), UniformCall::F1(2.0))]
        );
    }

    #[test]
    fn undeclared_uniform_is_skipped() {
        let gl = headless();
        let mut mesh = triangle(&gl).set_shader(pass_through(&gl)).create();
        mesh.set_uniform("uTime", 3.0_f32);

        mesh.draw();

        assert!(uniform_calls(&gl).is_empty());
        assert_eq!(gl.draws().len(), 1);
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn drop_releases_vertex_array_and_buffers() {
        let gl = headless();
        let shader = pass_through(&gl);
        let mesh = triangle(&gl)
            .set_indices([0, 1, 2])
            .unwrap()
            .set_shader(Rc::clone(&shader))
            .create();
        assert_eq!(gl.live_vertex_arrays(), 1);
        assert_eq!(gl.live_buffers(), 2);

        drop(mesh);

        assert_eq!(gl.live_vertex_arrays(), 0);
        assert_eq!(gl.live_buffers(), 0);
        // Shared, not owned.
        assert_eq!(gl.live_programs(), 1);
    }
}

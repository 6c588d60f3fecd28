use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::buffer::ArrayBuffer;
use crate::gl::{GlApi, ShaderSource, ShaderStage};

use super::ShaderError;

/// A linked GPU program with named attribute and uniform slots.
///
/// Shaders are shared between meshes (`Rc<Shader<G>>`). Slot locations are
/// resolved on first use of each name and cached, including misses.
///
/// Typed setters and [`Shader::set_attribute`] act on the *current* program,
/// so they are only meaningful between [`Shader::bind`] and [`Shader::unbind`].
/// They return `false` when the program does not declare the slot, in which
/// case nothing is sent.
pub struct Shader<G: GlApi> {
    gl: Rc<G>,
    program: G::Program,
    attributes: RefCell<HashMap<String, Option<u32>>>,
    uniforms: RefCell<HashMap<String, Option<G::UniformLocation>>>,
}

impl<G: GlApi> Shader<G> {
    /// Compiles and links the given stages.
    pub fn from_sources(gl: &Rc<G>, stages: &[ShaderSource<'_>]) -> Result<Self, ShaderError> {
        if stages.is_empty() {
            return Err(ShaderError::NoStages);
        }

        let program = gl.create_program(stages).inspect_err(|e| log::warn!("{e}"))?;
        log::debug!("shader program {program:?}: {} stages linked", stages.len());

        Ok(Self {
            gl: Rc::clone(gl),
            program,
            attributes: RefCell::new(HashMap::new()),
            uniforms: RefCell::new(HashMap::new()),
        })
    }

    /// Reads, compiles and links one source file per stage.
    ///
    /// Stages are inferred from file extensions (see
    /// [`ShaderStage::from_extension`]).
    pub fn load_program<P: AsRef<Path>>(
        gl: &Rc<G>,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, ShaderError> {
        let mut sources: Vec<(ShaderStage, String)> = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let stage = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ShaderStage::from_extension)
                .ok_or_else(|| ShaderError::UnknownStage(path.to_path_buf()))?;
            let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            log::debug!("loaded {stage} shader {}", path.display());
            sources.push((stage, source));
        }

        let stages: Vec<ShaderSource<'_>> = sources
            .iter()
            .map(|(stage, src)| ShaderSource::new(*stage, src))
            .collect();
        Self::from_sources(gl, &stages)
    }

    #[inline]
    pub fn program(&self) -> G::Program {
        self.program
    }

    /// Makes this program current.
    pub fn bind(&self) {
        self.gl.use_program(Some(self.program));
    }

    /// Clears the current program.
    pub fn unbind(&self) {
        self.gl.use_program(None);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_location(name).is_some()
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform_location(name).is_some()
    }

    /// Sources attribute slot `name` from `buffer`, or disables the slot when
    /// `buffer` is `None`.
    pub fn set_attribute(&self, name: &str, buffer: Option<&ArrayBuffer<G>>) -> bool {
        let Some(location) = self.attribute_location(name) else {
            return false;
        };
        match buffer {
            // Width is 1..=4 by construction.
            Some(b) => self
                .gl
                .enable_attribute(location, b.handle(), b.element_width() as i32),
            None => self.gl.disable_attribute(location),
        }
        true
    }

    // ── typed uniforms ────────────────────────────────────────────────────

    pub fn set_uniform_mat3(&self, name: &str, value: &Mat3) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_matrix_3_f32(loc, &value.to_cols_array()))
    }

    pub fn set_uniform_mat4(&self, name: &str, value: &Mat4) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_matrix_4_f32(loc, &value.to_cols_array()))
    }

    pub fn set_uniform_vec2(&self, name: &str, value: Vec2) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_2_f32(loc, value.x, value.y))
    }

    pub fn set_uniform_vec3(&self, name: &str, value: Vec3) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_3_f32(loc, value.x, value.y, value.z))
    }

    pub fn set_uniform_vec4(&self, name: &str, value: Vec4) -> bool {
        self.with_uniform(name, |gl, loc| {
            gl.uniform_4_f32(loc, value.x, value.y, value.z, value.w)
        })
    }

    pub fn set_uniform_f32(&self, name: &str, value: f32) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_1_f32(loc, value))
    }

    pub fn set_uniform_i32(&self, name: &str, value: i32) -> bool {
        self.with_uniform(name, |gl, loc| gl.uniform_1_i32(loc, value))
    }

    /// GLSL booleans are set through the integer entry point (0 or 1).
    pub fn set_uniform_bool(&self, name: &str, value: bool) -> bool {
        self.set_uniform_i32(name, i32::from(value))
    }

    // ── location cache ────────────────────────────────────────────────────

    fn attribute_location(&self, name: &str) -> Option<u32> {
        if let Some(&cached) = self.attributes.borrow().get(name) {
            return cached;
        }
        let location = self.gl.attribute_location(self.program, name);
        if location.is_none() {
            log::debug!("program {:?} has no attribute {name:?}", self.program);
        }
        self.attributes.borrow_mut().insert(name.to_string(), location);
        location
    }

    fn uniform_location(&self, name: &str) -> Option<G::UniformLocation> {
        if let Some(cached) = self.uniforms.borrow().get(name) {
            return cached.clone();
        }
        let location = self.gl.uniform_location(self.program, name);
        if location.is_none() {
            log::debug!("program {:?} has no uniform {name:?}", self.program);
        }
        self.uniforms
            .borrow_mut()
            .insert(name.to_string(), location.clone());
        location
    }

    fn with_uniform(&self, name: &str, set: impl FnOnce(&G, &G::UniformLocation)) -> bool {
        match self.uniform_location(name) {
            Some(loc) => {
                set(&*self.gl, &loc);
                true
            }
            None => false,
        }
    }
}

impl<G: GlApi> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.program);
    }
}

impl<G: GlApi> fmt::Debug for Shader<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader").field("program", &self.program).finish()
    }
}

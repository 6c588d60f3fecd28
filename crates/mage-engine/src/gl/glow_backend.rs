//! [`GlApi`] over a live OpenGL (3.3 core / GLES 3.0) context via `glow`.

use glow::HasContext;

use super::{BufferTarget, GlApi, GlError, ShaderSource, ShaderStage};

/// A `glow` context that the caller has promised is current.
///
/// Every GL entry point is `unsafe` in `glow` because it requires a current
/// context on the calling thread. That requirement is taken once, by
/// [`GlowContext::new`]; the trait methods are safe afterwards.
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    /// Wraps a loaded `glow` context.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread for the whole
    /// lifetime of the returned value, and of every resource created through
    /// it. Using it from any other thread is undefined behavior.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    /// Returns the wrapped context, for calls this crate does not cover.
    pub fn raw(&self) -> &glow::Context {
        &self.gl
    }

    fn compile_stage(&self, stage: &ShaderSource<'_>) -> Result<glow::Shader, GlError> {
        let kind = match stage.stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        };

        // SAFETY: context is current (constructor contract).
        unsafe {
            let shader = self.gl.create_shader(kind).map_err(GlError)?;
            self.gl.shader_source(shader, stage.source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let info = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(GlError::new(format!("{} stage failed to compile: {info}", stage.stage)));
            }
            Ok(shader)
        }
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

impl GlApi for GlowContext {
    type VertexArray = glow::VertexArray;
    type Buffer = glow::Buffer;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    // SAFETY (all methods below): context is current (constructor contract),
    // and every handle passed in was created by this context.

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError> {
        unsafe { self.gl.create_vertex_array() }.map_err(GlError)
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<Self::Buffer, GlError> {
        let target = target_enum(target);
        unsafe {
            let buffer = self.gl.create_buffer().map_err(GlError)?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(target, None);
            Ok(buffer)
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target_enum(target), buffer) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn create_program(&self, stages: &[ShaderSource<'_>]) -> Result<Self::Program, GlError> {
        let mut compiled = Vec::with_capacity(stages.len());
        for stage in stages {
            match self.compile_stage(stage) {
                Ok(shader) => compiled.push(shader),
                Err(e) => {
                    for shader in compiled {
                        unsafe { self.gl.delete_shader(shader) };
                    }
                    return Err(e);
                }
            }
        }

        unsafe {
            let program = match self.gl.create_program() {
                Ok(p) => p,
                Err(e) => {
                    for shader in compiled {
                        self.gl.delete_shader(shader);
                    }
                    return Err(GlError(e));
                }
            };

            for &shader in &compiled {
                self.gl.attach_shader(program, shader);
            }
            self.gl.link_program(program);

            for shader in compiled {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }

            if !self.gl.get_program_link_status(program) {
                let info = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(GlError::new(format!("program failed to link: {info}")));
            }
            Ok(program)
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attribute_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn enable_attribute(&self, location: u32, buffer: Self::Buffer, components: i32) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(location);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn disable_attribute(&self, location: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(location) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), x) }
    }

    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { self.gl.uniform_2_f32(Some(location), x, y) }
    }

    fn uniform_3_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32) {
        unsafe { self.gl.uniform_3_f32(Some(location), x, y, z) }
    }

    fn uniform_4_f32(&self, location: &Self::UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        unsafe { self.gl.uniform_4_f32(Some(location), x, y, z, w) }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), x) }
    }

    fn uniform_matrix_3_f32(&self, location: &Self::UniformLocation, m: &[f32; 9]) {
        unsafe { self.gl.uniform_matrix_3_f32_slice(Some(location), false, m) }
    }

    fn uniform_matrix_4_f32(&self, location: &Self::UniformLocation, m: &[f32; 16]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(location), false, m) }
    }

    fn draw_arrays(&self, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, 0, count) }
    }

    fn draw_elements(&self, count: i32) {
        unsafe { self.gl.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0) }
    }
}

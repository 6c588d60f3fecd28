use crate::buffer::ArrayBuffer;
use crate::gl::GlApi;

use super::Shader;

/// Keeps a shader current and tracks the attribute slots bound through it.
///
/// On drop, every tracked slot is disabled and the program is unbound, so a
/// draw leaves no attribute or program state behind whichever way it exits.
#[must_use = "the program is unbound as soon as the guard is dropped"]
pub struct ProgramBinding<'a, G: GlApi> {
    shader: &'a Shader<G>,
    attributes: Vec<&'a str>,
}

impl<'a, G: GlApi> ProgramBinding<'a, G> {
    pub fn new(shader: &'a Shader<G>) -> Self {
        shader.bind();
        Self {
            shader,
            attributes: Vec::new(),
        }
    }

    /// Sources slot `name` from `buffer`. Slots the program does not declare
    /// are skipped and not tracked.
    pub fn bind_attribute(&mut self, name: &'a str, buffer: &ArrayBuffer<G>) {
        if self.shader.set_attribute(name, Some(buffer)) {
            self.attributes.push(name);
        }
    }

    /// Slots bound so far, in bind order.
    pub fn bound_attributes(&self) -> &[&'a str] {
        &self.attributes
    }
}

impl<G: GlApi> Drop for ProgramBinding<'_, G> {
    fn drop(&mut self) {
        for name in self.attributes.drain(..) {
            self.shader.set_attribute(name, None);
        }
        self.shader.unbind();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gl::{HeadlessGl, ShaderSource, ShaderStage};

    const VS: &str = "in vec3 position; in vec3 normal; void main() {}";
    const FS: &str = "out vec4 c; void main() {}";

    #[test]
    fn drop_disables_tracked_slots_and_unbinds() {
        let gl = Rc::new(HeadlessGl::new());
        let shader = Shader::from_sources(
            &gl,
            &[ShaderSource::new(ShaderStage::Vertex, VS), ShaderSource::new(ShaderStage::Fragment, FS)],
        )
        .unwrap();
        let positions = ArrayBuffer::new(&gl, 3, &[0.0; 9]).unwrap();
        let uvs = ArrayBuffer::new(&gl, 2, &[0.0; 6]).unwrap();
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        {
            let mut bound = ProgramBinding::new(&shader);
            bound.bind_attribute("position", &positions);
            bound.bind_attribute("uv", &uvs);
            assert_eq!(bound.bound_attributes(), ["position"]);
            assert_eq!(gl.bound_program(), Some(shader.program()));
            assert_eq!(gl.enabled_attributes(vao).len(), 1);
        }

        assert_eq!(gl.bound_program(), None);
        assert!(gl.enabled_attributes(vao).is_empty());
        assert!(gl.errors().is_empty());
    }
}

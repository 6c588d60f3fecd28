//! Shared test scaffolding for mesh tests.

use std::rc::Rc;

use crate::gl::{HeadlessGl, ShaderSource, ShaderStage};
use crate::shader::Shader;

pub(crate) const PASS_THROUGH_VS: &str = "#version 330 core
    in vec3 position;
    in vec3 normal;
    in vec2 uv;
    uniform mat4 uWorld;
    void main() { gl_Position = uWorld * vec4(position, 1.0); }";

pub(crate) const PASS_THROUGH_FS: &str = "#version 330 core
    uniform vec3 color;
    uniform float alpha;
    out vec4 outColor;
    void main() { outColor = vec4(color, alpha); }";

pub(crate) fn headless() -> Rc<HeadlessGl> {
    Rc::new(HeadlessGl::new())
}

pub(crate) fn pass_through(gl: &Rc<HeadlessGl>) -> Rc<Shader<HeadlessGl>> {
    let shader = Shader::from_sources(
        gl,
        &[
            ShaderSource::new(ShaderStage::Vertex, PASS_THROUGH_VS),
            ShaderSource::new(ShaderStage::Fragment, PASS_THROUGH_FS),
        ],
    );
    match shader {
        Ok(s) => Rc::new(s),
        Err(e) => panic!("pass-through shader failed to build: {e}"),
    }
}

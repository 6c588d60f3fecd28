use std::rc::Rc;

use super::GlApi;

/// Keeps a vertex array current for as long as the guard lives.
///
/// Dropping the guard binds `None`, returning the context to the neutral
/// state on every exit path. Guards do not nest: dropping an inner guard
/// unbinds, it does not restore the outer binding.
#[must_use = "the vertex array is unbound as soon as the guard is dropped"]
pub struct VertexArrayBinding<G: GlApi> {
    gl: Rc<G>,
}

impl<G: GlApi> VertexArrayBinding<G> {
    pub fn new(gl: Rc<G>, vertex_array: G::VertexArray) -> Self {
        gl.bind_vertex_array(Some(vertex_array));
        Self { gl }
    }
}

impl<G: GlApi> Drop for VertexArrayBinding<G> {
    fn drop(&mut self) {
        self.gl.bind_vertex_array(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::HeadlessGl;

    #[test]
    fn guard_binds_then_unbinds() {
        let gl = Rc::new(HeadlessGl::new());
        let vao = gl.create_vertex_array().unwrap();
        {
            let _bound = VertexArrayBinding::new(gl.clone(), vao);
            assert_eq!(gl.bound_vertex_array(), Some(vao));
        }
        assert_eq!(gl.bound_vertex_array(), None);
    }

    #[test]
    fn guard_unbinds_on_early_return() {
        fn fails(gl: &Rc<HeadlessGl>, vao: <HeadlessGl as GlApi>::VertexArray) -> Result<(), ()> {
            let _bound = VertexArrayBinding::new(gl.clone(), vao);
            Err(())
        }

        let gl = Rc::new(HeadlessGl::new());
        let vao = gl.create_vertex_array().unwrap();
        assert!(fails(&gl, vao).is_err());
        assert_eq!(gl.bound_vertex_array(), None);
    }
}

use std::fmt;
use std::rc::Rc;

use crate::gl::{BufferTarget, GlApi};

use super::BufferError;

/// Immutable GPU array of `u32` vertex indices (three per triangle).
///
/// The GPU object is deleted when the buffer is dropped.
pub struct IndexBuffer<G: GlApi> {
    gl: Rc<G>,
    handle: G::Buffer,
    len: usize,
}

impl<G: GlApi> IndexBuffer<G> {
    pub fn new(gl: &Rc<G>, indices: &[u32]) -> Result<Self, BufferError> {
        if i32::try_from(indices.len()).is_err() {
            return Err(BufferError::TooLarge { len: indices.len() });
        }

        let handle = gl.create_buffer(BufferTarget::ElementArray, bytemuck::cast_slice(indices))?;
        log::debug!("index buffer {handle:?}: {} indices", indices.len());

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            len: indices.len(),
        })
    }

    #[inline]
    pub fn handle(&self) -> G::Buffer {
        self.handle
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Binds this buffer as the element source and issues an indexed
    /// triangle draw over all indices.
    ///
    /// The element binding is vertex array state, so a vertex array must be
    /// bound (as well as a program).
    pub fn draw(&self) {
        self.gl.bind_buffer(BufferTarget::ElementArray, Some(self.handle));
        // Range checked in `new`.
        self.gl.draw_elements(self.len as i32);
    }
}

impl<G: GlApi> Drop for IndexBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.handle);
    }
}

impl<G: GlApi> fmt::Debug for IndexBuffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuffer")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::HeadlessGl;

    #[test]
    fn uploads_indices() {
        let gl = Rc::new(HeadlessGl::new());
        let ibo = IndexBuffer::new(&gl, &[0, 1, 2, 2, 3, 0]).unwrap();
        assert_eq!(ibo.len(), 6);
        assert_eq!(gl.buffer_u32(ibo.handle()).unwrap(), [0, 1, 2, 2, 3, 0]);
        assert_eq!(gl.buffer_target(ibo.handle()), Some(BufferTarget::ElementArray));
    }

    #[test]
    fn draw_binds_itself_to_the_current_vertex_array() {
        let gl = Rc::new(HeadlessGl::new());
        let vao = gl.create_vertex_array().unwrap();
        let ibo = IndexBuffer::new(&gl, &[0, 1, 2]).unwrap();

        gl.bind_vertex_array(Some(vao));
        ibo.draw();

        assert_eq!(gl.element_buffer(vao), Some(ibo.handle()));
    }

    #[test]
    fn drop_deletes_gpu_object() {
        let gl = Rc::new(HeadlessGl::new());
        drop(IndexBuffer::new(&gl, &[0, 1, 2]).unwrap());
        assert_eq!(gl.live_buffers(), 0);
    }
}

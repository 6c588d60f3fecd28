use std::fmt;
use std::rc::Rc;

use crate::gl::{BufferTarget, GlApi};

use super::BufferError;

/// Immutable GPU array of fixed-width float elements (one element per vertex).
///
/// The GPU object is deleted when the buffer is dropped. Buffers are moved
/// into the mesh that uses them and are never shared.
pub struct ArrayBuffer<G: GlApi> {
    gl: Rc<G>,
    handle: G::Buffer,
    element_width: usize,
    element_count: usize,
}

impl<G: GlApi> ArrayBuffer<G> {
    /// Uploads `values` as `values.len() / element_width` elements of
    /// `element_width` floats each.
    pub fn new(gl: &Rc<G>, element_width: usize, values: &[f32]) -> Result<Self, BufferError> {
        if !(1..=4).contains(&element_width) || values.len() % element_width != 0 {
            return Err(BufferError::ElementWidth { width: element_width, len: values.len() });
        }
        let element_count = values.len() / element_width;
        if i32::try_from(element_count).is_err() {
            return Err(BufferError::TooLarge { len: element_count });
        }

        let handle = gl.create_buffer(BufferTarget::Array, bytemuck::cast_slice(values))?;
        log::debug!("array buffer {handle:?}: {element_count} x {element_width} floats");

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            element_width,
            element_count,
        })
    }

    #[inline]
    pub fn handle(&self) -> G::Buffer {
        self.handle
    }

    /// Floats per element (1..=4).
    #[inline]
    pub fn element_width(&self) -> usize {
        self.element_width
    }

    /// Number of elements, i.e. vertices.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Issues a non-indexed triangle draw over every element.
    ///
    /// Expects the caller to have a vertex array and a program bound.
    pub fn draw(&self) {
        // Range checked in `new`.
        self.gl.draw_arrays(self.element_count as i32);
    }
}

impl<G: GlApi> Drop for ArrayBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.handle);
    }
}

impl<G: GlApi> fmt::Debug for ArrayBuffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayBuffer")
            .field("handle", &self.handle)
            .field("element_width", &self.element_width)
            .field("element_count", &self.element_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::HeadlessGl;

    fn gl() -> Rc<HeadlessGl> {
        Rc::new(HeadlessGl::new())
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn counts_elements_by_width() {
        let gl = gl();
        let buf = ArrayBuffer::new(&gl, 2, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(buf.element_width(), 2);
        assert_eq!(buf.element_count(), 3);
    }

    #[test]
    fn uploads_values_in_order() {
        let gl = gl();
        let buf = ArrayBuffer::new(&gl, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(gl.buffer_f32(buf.handle()).unwrap(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(gl.buffer_target(buf.handle()), Some(BufferTarget::Array));
        assert_eq!(gl.bound_array_buffer(), None);
    }

    #[test]
    fn empty_buffer_has_no_elements() {
        let gl = gl();
        let buf = ArrayBuffer::new(&gl, 4, &[]).unwrap();
        assert_eq!(buf.element_count(), 0);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn rejects_ragged_data() {
        let gl = gl();
        let err = ArrayBuffer::new(&gl, 3, &[0.0; 4]).unwrap_err();
        assert_eq!(err, BufferError::ElementWidth { width: 3, len: 4 });
        assert_eq!(gl.live_buffers(), 0);
    }

    #[test]
    fn rejects_width_out_of_range() {
        let gl = gl();
        assert!(ArrayBuffer::new(&gl, 0, &[]).is_err());
        assert!(ArrayBuffer::new(&gl, 5, &[0.0; 5]).is_err());
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn drop_deletes_gpu_object() {
        let gl = gl();
        let buf = ArrayBuffer::new(&gl, 1, &[0.0]).unwrap();
        assert_eq!(gl.live_buffers(), 1);
        drop(buf);
        assert_eq!(gl.live_buffers(), 0);
    }
}

//! GPU vertex and index buffers.

mod array;
mod error;
mod index;

pub use array::ArrayBuffer;
pub use error::BufferError;
pub use index::IndexBuffer;

use std::fmt;

use crate::buffer::BufferError;
use crate::gl::GlError;
use crate::shader::ShaderError;

/// Error raised while assembling a mesh.
///
/// Assembly stops at the first error; the partially built mesh is released.
#[derive(Debug)]
pub enum MeshError {
    /// An attribute with this name is already attached.
    DuplicateAttribute(String),
    /// No buffer was supplied for this attribute.
    NullBuffer(String),
    Buffer(BufferError),
    Shader(ShaderError),
    Gl(GlError),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateAttribute(name) => write!(f, "attribute already exists: {name}"),
            Self::NullBuffer(name) => write!(f, "attribute {name} has no buffer"),
            Self::Buffer(e) => write!(f, "{e}"),
            Self::Shader(e) => write!(f, "{e}"),
            Self::Gl(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(e) => Some(e),
            Self::Shader(e) => Some(e),
            Self::Gl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for MeshError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<ShaderError> for MeshError {
    fn from(e: ShaderError) -> Self {
        Self::Shader(e)
    }
}

impl From<GlError> for MeshError {
    fn from(e: GlError) -> Self {
        Self::Gl(e)
    }
}

//! Static polygon meshes.
//!
//! A [`Mesh`] pairs named attribute buffers with a shader and a set of named
//! uniforms; [`MeshBuilder`] assembles one while keeping its vertex array bound.

mod builder;
mod error;
#[cfg(test)]
mod fixtures;
#[allow(clippy::module_inception)]
mod mesh;
mod uniform;

pub use builder::MeshBuilder;
pub use error::MeshError;
pub use mesh::Mesh;
pub use uniform::{IntoUniform, Uniform, UniformKind};

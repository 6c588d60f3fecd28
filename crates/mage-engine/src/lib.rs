//! Mage engine crate.
//!
//! Static polygon meshes over a GL-style stateful GPU API: attribute and
//! index buffers, shader programs, named uniforms, and the scoped bindings
//! that keep a draw from leaking state.
//!
//! Every GPU call goes through [`gl::GlApi`]. [`gl::GlowContext`] drives a
//! real OpenGL context; [`gl::HeadlessGl`] records calls and tracks state
//! without a GPU.

pub mod buffer;
pub mod gl;
pub mod logging;
pub mod mesh;
pub mod shader;

pub use buffer::{ArrayBuffer, IndexBuffer};
pub use mesh::{Mesh, MeshBuilder, MeshError, Uniform};
pub use shader::Shader;

//! The GL API seam.
//!
//! Everything this crate does on the GPU goes through [`GlApi`]:
//! - [`GlowContext`] drives a real OpenGL / GLES context via `glow`
//! - [`HeadlessGl`] tracks binding state in memory and records calls
//!
//! GL binding state is process-wide and thread-affine. Resources share the
//! context through `Rc`, which keeps every type built on it `!Send`.

mod api;
mod error;
mod glow_backend;
pub mod headless;
mod scope;

pub use api::{BufferTarget, GlApi, ShaderSource, ShaderStage};
pub use error::GlError;
pub use glow_backend::GlowContext;
pub use headless::HeadlessGl;
pub use scope::VertexArrayBinding;

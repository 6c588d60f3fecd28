//! Shader programs and their scoped binding.

mod binding;
mod error;
mod program;

pub use binding::ProgramBinding;
pub use error::ShaderError;
pub use program::Shader;

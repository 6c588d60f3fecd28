use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::gl::GlError;

/// Error returned when a shader program cannot be loaded or built.
#[derive(Debug)]
pub enum ShaderError {
    /// A source file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The file extension does not name a pipeline stage.
    UnknownStage(PathBuf),
    /// No sources were given.
    NoStages,
    /// Compilation or linking failed; carries the driver's info log.
    Gl(GlError),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read shader {}: {source}", path.display()),
            Self::UnknownStage(path) => write!(
                f,
                "cannot infer shader stage of {} (expected .vert/.vs, .frag/.fs or .geom/.gs)",
                path.display()
            ),
            Self::NoStages => f.write_str("shader program needs at least one stage"),
            Self::Gl(e) => write!(f, "shader build failed: {e}"),
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Gl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GlError> for ShaderError {
    fn from(e: GlError) -> Self {
        Self::Gl(e)
    }
}

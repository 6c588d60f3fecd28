use std::fmt;

use crate::gl::GlError;

/// Error returned when a vertex or index buffer cannot be created.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError {
    /// `width` is not in `1..=4`, or `len` values do not split into whole elements.
    ElementWidth { width: usize, len: usize },
    /// More elements than a single GL draw can address.
    TooLarge { len: usize },
    Gl(GlError),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementWidth { width, len } => write!(
                f,
                "invalid element width {width} for {len} values (width must be 1..=4 and divide the value count)"
            ),
            Self::TooLarge { len } => write!(f, "buffer of {len} elements exceeds the GL draw range"),
            Self::Gl(e) => write!(f, "buffer creation failed: {e}"),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gl(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GlError> for BufferError {
    fn from(e: GlError) -> Self {
        Self::Gl(e)
    }
}

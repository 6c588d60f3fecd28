use std::fmt;

/// Error reported by a [`GlApi`](super::GlApi) implementation.
///
/// Carries the driver's message (object creation failure, compile or link
/// info log) verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct GlError(pub String);

impl GlError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::gl::GlApi;
use crate::shader::Shader;

/// A per-draw shader input value, tagged with its GLSL type.
///
/// Stored by name on a [`Mesh`](super::Mesh) and sent at draw time through
/// the typed shader call matching the tag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniform {
    Matrix3(Mat3),
    Matrix4(Mat4),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Float(f32),
    Integer(i32),
    Boolean(bool),
}

/// Type tag of a [`Uniform`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Matrix3,
    Matrix4,
    Vector2,
    Vector3,
    Vector4,
    Float,
    Integer,
    Boolean,
}

impl Uniform {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Matrix3(_) => UniformKind::Matrix3,
            Self::Matrix4(_) => UniformKind::Matrix4,
            Self::Vector2(_) => UniformKind::Vector2,
            Self::Vector3(_) => UniformKind::Vector3,
            Self::Vector4(_) => UniformKind::Vector4,
            Self::Float(_) => UniformKind::Float,
            Self::Integer(_) => UniformKind::Integer,
            Self::Boolean(_) => UniformKind::Boolean,
        }
    }

    /// Sends the value to uniform `name` of `shader`, which must be current.
    ///
    /// Returns `false` if the program does not declare `name`.
    pub fn dispatch<G: GlApi>(&self, shader: &Shader<G>, name: &str) -> bool {
        match *self {
            Self::Matrix3(ref m) => shader.set_uniform_mat3(name, m),
            Self::Matrix4(ref m) => shader.set_uniform_mat4(name, m),
            Self::Vector2(v) => shader.set_uniform_vec2(name, v),
            Self::Vector3(v) => shader.set_uniform_vec3(name, v),
            Self::Vector4(v) => shader.set_uniform_vec4(name, v),
            Self::Float(x) => shader.set_uniform_f32(name, x),
            Self::Integer(x) => shader.set_uniform_i32(name, x),
            Self::Boolean(b) => shader.set_uniform_bool(name, b),
        }
    }
}

/// Values accepted by `set_uniform`.
///
/// Every supported type converts to `Some(uniform)`; `None` of any of them
/// means "remove the uniform".
pub trait IntoUniform {
    fn into_uniform(self) -> Option<Uniform>;
}

impl IntoUniform for Uniform {
    fn into_uniform(self) -> Option<Uniform> {
        Some(self)
    }
}

impl IntoUniform for Option<Uniform> {
    fn into_uniform(self) -> Option<Uniform> {
        self
    }
}

macro_rules! uniform_values {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Uniform {
            fn from(value: $ty) -> Self {
                Uniform::$variant(value)
            }
        }

        impl IntoUniform for $ty {
            fn into_uniform(self) -> Option<Uniform> {
                Some(Uniform::$variant(self))
            }
        }

        impl IntoUniform for Option<$ty> {
            fn into_uniform(self) -> Option<Uniform> {
                self.map(Uniform::$variant)
            }
        }
    )*};
}

uniform_values! {
    Mat3 => Matrix3,
    Mat4 => Matrix4,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    f32 => Float,
    i32 => Integer,
    bool => Boolean,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        assert_eq!(Uniform::from(Mat4::IDENTITY).kind(), UniformKind::Matrix4);
        assert_eq!(Uniform::from(Vec2::ZERO).kind(), UniformKind::Vector2);
        assert_eq!(Uniform::from(true).kind(), UniformKind::Boolean);
        assert_eq!(Uniform::from(7).kind(), UniformKind::Integer);
    }

    #[test]
    fn none_converts_to_removal() {
        assert_eq!(None::<Vec3>.into_uniform(), None);
        assert_eq!(Some(1.5_f32).into_uniform(), Some(Uniform::Float(1.5)));
        assert_eq!(Vec3::X.into_uniform(), Some(Uniform::Vector3(Vec3::X)));
    }
}

//! Value-type linear algebra for demo code.
//!
//! All matrices are column-major and follow the OpenGL clip-space convention
//! (`z` in `-1..1`). Multiply a projection by [`Matrix4::OPENGL_TO_WGPU`] before
//! uploading it to a wgpu shader.
//!
//! The types are `#[repr(C)]` and implement [`bytemuck::Pod`], so they can be
//! written into GPU buffers directly.

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

#[cfg(test)]
pub(crate) mod approx;
pub mod frustum;
pub mod matrix3;
pub mod matrix4;
pub mod matrix_stack;
pub mod quaternion;
pub mod vector2;
pub mod vector3;
pub mod vector4;

pub use frustum::Frustum;
pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
pub use matrix_stack::MatrixStack;
pub use quaternion::Quaternion;
pub use vector2::Vector2;
pub use vector3::Vector3;
pub use vector4::Vector4;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MathError {
    #[error("expected at least {expected} values, got {actual}")]
    NotEnoughValues { expected: usize, actual: usize },
    #[error("Already at the topmost matrix.")]
    StackUnderflow,
}

/// Operations shared by [`Vector2`], [`Vector3`] and [`Vector4`].
///
/// Generic code such as the [`interpolators`](crate::interpolators) is written
/// against this trait instead of a concrete vector size.
pub trait Vector:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + Rem<f32, Output = Self>
    + Neg<Output = Self>
{
    const ZERO: Self;

    fn dot(&self, other: &Self) -> f32;

    fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }
}

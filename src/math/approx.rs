//! Approximate comparisons for unit tests.

use std::fmt::Debug;

use super::{Matrix3, Matrix4, Quaternion, Vector2, Vector3, Vector4};

pub(crate) trait ApproxEq {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        (self - other).abs() <= tol
    }
}

pub(crate) fn assert_approx_eq<T: ApproxEq + Debug>(left: &T, right: &T, tol: f32) {
    if !left.approx_eq(right, tol) {
        panic!(
            "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n   tol: `{}`",
            left, right, tol
        );
    }
}

impl ApproxEq for Vector2 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
    }
}

impl ApproxEq for Vector4 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
            && (self.w - other.w).abs() <= tol
    }
}

impl ApproxEq for Matrix3 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        self.as_array().iter().zip(other.as_array().iter()).all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl ApproxEq for Matrix4 {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        self.as_array().iter().zip(other.as_array().iter()).all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl ApproxEq for Quaternion {
    fn approx_eq(&self, other: &Self, tol: f32) -> bool {
        (self.x - other.x).abs() <= tol
            && (self.y - other.y).abs() <= tol
            && (self.z - other.z).abs() <= tol
            && (self.w - other.w).abs() <= tol
    }
}

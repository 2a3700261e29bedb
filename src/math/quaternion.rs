use std::fmt::Display;
use std::ops::{Mul, MulAssign};

use super::{Matrix4, Vector3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`. The axis is normalized first.
    pub fn from_axis_angle(angle: f32, axis: Vector3) -> Self {
        let axis = axis.normalize();
        let (sin, cos) = (angle / 2.0).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    pub fn from_axis_angle_deg(angle: f32, axis: Vector3) -> Self {
        Self::from_axis_angle(angle.to_radians(), axis)
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length == 0.0 {
            return *self;
        }
        Self::new(self.x / length, self.y / length, self.z / length, self.w / length)
    }

    pub fn dot(&self, q: &Quaternion) -> f32 {
        self.x * q.x + self.y * q.y + self.z * q.z + self.w * q.w
    }

    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Inverse of a rotation: normalizes, then conjugates.
    pub fn inverse(&self) -> Self {
        self.normalize().conjugate()
    }

    pub fn rotate(&self, v: Vector3) -> Vector3 {
        let axis = Vector3::new(self.x, self.y, self.z);
        let uv = axis.cross(&v);
        let uuv = axis.cross(&uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }

    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix4 {
        let Quaternion { x, y, z, w } = *self;
        Matrix4::from_cols_array([
            1.0 - 2.0 * y * y - 2.0 * z * z, 2.0 * x * y + 2.0 * w * z, 2.0 * x * z - 2.0 * w * y, 0.0,
            2.0 * x * y - 2.0 * w * z, 1.0 - 2.0 * x * x - 2.0 * z * z, 2.0 * y * z + 2.0 * w * x, 0.0,
            2.0 * x * z + 2.0 * w * y, 2.0 * y * z - 2.0 * w * x, 1.0 - 2.0 * x * x - 2.0 * y * y, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, q: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * q.x + self.x * q.w + self.y * q.z - self.z * q.y,
            self.w * q.y + self.y * q.w + self.z * q.x - self.x * q.z,
            self.w * q.z + self.z * q.w + self.x * q.y - self.y * q.x,
            self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Quaternion) {
        *self = *self * rhs;
    }
}

impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        self.rotate(v)
    }
}

impl From<cgmath::Quaternion<f32>> for Quaternion {
    fn from(q: cgmath::Quaternion<f32>) -> Self {
        Self::new(q.v.x, q.v.y, q.v.z, q.s)
    }
}

impl From<Quaternion> for cgmath::Quaternion<f32> {
    fn from(q: Quaternion) -> Self {
        cgmath::Quaternion::new(q.w, q.x, q.y, q.z)
    }
}

impl Display for Quaternion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}i + {}j + {}k + {})", self.x, self.y, self.z, self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx::assert_approx_eq;
    use cgmath::{Deg, Rotation3};

    #[test]
    fn axis_angle_matches_cgmath() {
        let axis = Vector3::new(1.0, 2.0, 3.0);
        let ours = Quaternion::from_axis_angle_deg(50.0, axis);
        let theirs: Quaternion =
            cgmath::Quaternion::from_axis_angle(cgmath::Vector3::from(axis.normalize()), Deg(50.0f32)).into();
        assert_approx_eq(&ours, &theirs, 1e-6);
    }

    #[test]
    fn product_matches_cgmath() {
        let a = Quaternion::from_axis_angle_deg(30.0, Vector3::UP);
        let b = Quaternion::from_axis_angle_deg(-75.0, Vector3::new(1.0, 0.0, 1.0));
        let expected: Quaternion =
            (cgmath::Quaternion::from(a) * cgmath::Quaternion::from(b)).into();
        assert_approx_eq(&(a * b), &expected, 1e-6);
    }

    #[test]
    fn rotates_vectors() {
        let q = Quaternion::from_axis_angle_deg(90.0, Vector3::UP);
        assert_approx_eq(&(q * Vector3::BACK), &Vector3::RIGHT, 1e-6);
        assert_approx_eq(&q.inverse().rotate(Vector3::RIGHT), &Vector3::BACK, 1e-6);
    }

    #[test]
    fn matrix_agrees_with_vector_rotation() {
        let q = Quaternion::from_axis_angle_deg(123.0, Vector3::new(-1.0, 0.5, 2.0));
        let v = Vector3::new(0.3, -4.0, 2.0);
        assert_approx_eq(&q.to_matrix().transform(v, 1.0), &q.rotate(v), 1e-5);
    }

    #[test]
    fn conjugate_of_unit_quaternion_is_inverse() {
        let q = Quaternion::from_axis_angle_deg(40.0, Vector3::RIGHT);
        assert_approx_eq(&(q * q.conjugate()), &Quaternion::IDENTITY, 1e-6);
        let scaled = Quaternion::new(q.x * 3.0, q.y * 3.0, q.z * 3.0, q.w * 3.0);
        assert_approx_eq(&scaled.inverse(), &q.conjugate(), 1e-6);
    }

    #[test]
    fn display() {
        assert_eq!(Quaternion::IDENTITY.to_string(), "(0i + 0j + 0k + 1)");
    }
}

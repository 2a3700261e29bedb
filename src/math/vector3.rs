use std::fmt::Display;

use auto_ops::impl_op_ex;

use super::{Vector, Vector2, Vector4};

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vector3 = Vector3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const RIGHT: Vector3 = Vector3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const LEFT: Vector3 = Vector3 { x: -1.0, y: 0.0, z: 0.0 };
    pub const UP: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const DOWN: Vector3 = Vector3 { x: 0.0, y: -1.0, z: 0.0 };
    pub const FORWARD: Vector3 = Vector3 { x: 0.0, y: 0.0, z: -1.0 };
    pub const BACK: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    pub fn extend(&self, w: f32) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, w)
    }

    pub fn xy(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns a unit vector pointing the same way. The zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length != 0.0 { *self / length } else { *self }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Vector for Vector3 {
    const ZERO: Self = Vector3::ZERO;

    fn dot(&self, other: &Self) -> f32 {
        Vector3::dot(self, other)
    }
}

impl_op_ex!(+ |a: &Vector3, b: &Vector3| -> Vector3 { Vector3::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(- |a: &Vector3, b: &Vector3| -> Vector3 { Vector3::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(* |a: &Vector3, b: &Vector3| -> Vector3 { Vector3::new(a.x * b.x, a.y * b.y, a.z * b.z) });
impl_op_ex!(/ |a: &Vector3, b: &Vector3| -> Vector3 { Vector3::new(a.x / b.x, a.y / b.y, a.z / b.z) });
impl_op_ex!(* |a: &Vector3, b: f32| -> Vector3 { Vector3::new(a.x * b, a.y * b, a.z * b) });
impl_op_ex!(/ |a: &Vector3, b: f32| -> Vector3 { Vector3::new(a.x / b, a.y / b, a.z / b) });
impl_op_ex!(% |a: &Vector3, b: f32| -> Vector3 { Vector3::new(a.x % b, a.y % b, a.z % b) });
impl_op_ex!(- |a: &Vector3| -> Vector3 { Vector3::new(-a.x, -a.y, -a.z) });

impl_op_ex!(+= |a: &mut Vector3, b: &Vector3| {
    a.x += b.x;
    a.y += b.y;
    a.z += b.z;
});

impl_op_ex!(-= |a: &mut Vector3, b: &Vector3| {
    a.x -= b.x;
    a.y -= b.y;
    a.z -= b.z;
});

impl_op_ex!(*= |a: &mut Vector3, b: f32| {
    a.x *= b;
    a.y *= b;
    a.z *= b;
});

impl_op_ex!(/= |a: &mut Vector3, b: f32| {
    a.x /= b;
    a.y /= b;
    a.z /= b;
});

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector4> for Vector3 {
    fn from(v: Vector4) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<cgmath::Vector3<f32>> for Vector3 {
    fn from(v: cgmath::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for cgmath::Vector3<f32> {
    fn from(v: Vector3) -> Self {
        cgmath::Vector3::new(v.x, v.y, v.z)
    }
}

impl Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions() {
        assert_eq!(Vector3::RIGHT.cross(&Vector3::UP), Vector3::BACK);
        assert_eq!(Vector3::UP.cross(&Vector3::RIGHT), -Vector3::BACK);
        assert_eq!(Vector3::FORWARD, -Vector3::BACK);
        assert_eq!(Vector3::LEFT + Vector3::RIGHT, Vector3::ZERO);
    }

    #[test]
    fn dot_and_cross() {
        let a = Vector3::new(1.0, -2.0, 3.0);
        let b = Vector3::new(4.0, -3.0, 1.0);
        assert_eq!(a.dot(&b), 13.0);
        assert_eq!(a.cross(&b), Vector3::new(7.0, 11.0, 5.0));
    }

    #[test]
    fn normalize() {
        assert_eq!(Vector3::new(3.0, 0.0, 4.0).normalize(), Vector3::new(0.6, 0.0, 0.8));
        assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
    }

    #[test]
    fn scalar_ops() {
        let mut v = Vector3::new(2.0, 4.0, 7.0);
        assert_eq!(v / 2.0, Vector3::new(1.0, 2.0, 3.5));
        assert_eq!(v % 3.0, Vector3::new(2.0, 1.0, 1.0));
        v *= 0.5;
        v += Vector3::ONE;
        assert_eq!(v, Vector3::new(2.0, 3.0, 4.5));
    }

    #[test]
    fn conversions() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Vector3::from(v.extend(9.0)), v);
        assert_eq!(v.xy(), Vector2::new(1.0, 2.0));
        let c: cgmath::Vector3<f32> = v.into();
        assert_eq!(Vector3::from(c), v);
    }

    #[test]
    fn display() {
        assert_eq!(Vector3::new(1.0, 2.5, -3.0).to_string(), "(1, 2.5, -3)");
    }
}

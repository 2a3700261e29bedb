use std::fmt::Display;

use auto_ops::impl_op_ex;

use super::{Vector, Vector3};

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };
    pub const ONE: Vector2 = Vector2 { x: 1.0, y: 1.0 };
    pub const RIGHT: Vector2 = Vector2 { x: 1.0, y: 0.0 };
    pub const LEFT: Vector2 = Vector2 { x: -1.0, y: 0.0 };
    pub const UP: Vector2 = Vector2 { x: 0.0, y: 1.0 };
    pub const DOWN: Vector2 = Vector2 { x: 0.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn extend(&self, z: f32) -> Vector3 {
        Vector3::new(self.x, self.y, z)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Returns a unit vector pointing the same way. The zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length != 0.0 { *self / length } else { *self }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn to_array(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Vector for Vector2 {
    const ZERO: Self = Vector2::ZERO;

    fn dot(&self, other: &Self) -> f32 {
        Vector2::dot(self, other)
    }
}

impl_op_ex!(+ |a: &Vector2, b: &Vector2| -> Vector2 { Vector2::new(a.x + b.x, a.y + b.y) });
impl_op_ex!(- |a: &Vector2, b: &Vector2| -> Vector2 { Vector2::new(a.x - b.x, a.y - b.y) });
impl_op_ex!(* |a: &Vector2, b: &Vector2| -> Vector2 { Vector2::new(a.x * b.x, a.y * b.y) });
impl_op_ex!(/ |a: &Vector2, b: &Vector2| -> Vector2 { Vector2::new(a.x / b.x, a.y / b.y) });
impl_op_ex!(* |a: &Vector2, b: f32| -> Vector2 { Vector2::new(a.x * b, a.y * b) });
impl_op_ex!(/ |a: &Vector2, b: f32| -> Vector2 { Vector2::new(a.x / b, a.y / b) });
impl_op_ex!(% |a: &Vector2, b: f32| -> Vector2 { Vector2::new(a.x % b, a.y % b) });
impl_op_ex!(- |a: &Vector2| -> Vector2 { Vector2::new(-a.x, -a.y) });

impl_op_ex!(+= |a: &mut Vector2, b: &Vector2| {
    a.x += b.x;
    a.y += b.y;
});

impl_op_ex!(-= |a: &mut Vector2, b: &Vector2| {
    a.x -= b.x;
    a.y -= b.y;
});

impl_op_ex!(*= |a: &mut Vector2, b: f32| {
    a.x *= b;
    a.y *= b;
});

impl_op_ex!(/= |a: &mut Vector2, b: f32| {
    a.x /= b;
    a.y /= b;
});

impl From<[f32; 2]> for Vector2 {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<Vector3> for Vector2 {
    fn from(v: Vector3) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<cgmath::Vector2<f32>> for Vector2 {
    fn from(v: cgmath::Vector2<f32>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2> for cgmath::Vector2<f32> {
    fn from(v: Vector2) -> Self {
        cgmath::Vector2::new(v.x, v.y)
    }
}

impl Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Vector2::new(1.0, -2.0);
        let b = Vector2::new(3.0, 4.0);
        assert_eq!(a + b, Vector2::new(4.0, 2.0));
        assert_eq!(a - b, Vector2::new(-2.0, -6.0));
        assert_eq!(a * b, Vector2::new(3.0, -8.0));
        assert_eq!(b * 0.5, Vector2::new(1.5, 2.0));
        assert_eq!(b % 3.0, Vector2::new(0.0, 1.0));
        assert_eq!(-a, Vector2::new(-1.0, 2.0));
    }

    #[test]
    fn assign_ops() {
        let mut v = Vector2::new(1.0, 1.0);
        v += Vector2::new(1.0, 2.0);
        v *= 2.0;
        assert_eq!(v, Vector2::new(4.0, 6.0));
        v -= Vector2::ONE;
        v /= 3.0;
        assert_eq!(v, Vector2::new(1.0, 5.0 / 3.0));
    }

    #[test]
    fn length_and_normalize() {
        let v = Vector2::new(3.0, 4.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.length_squared(), 25.0);
        assert_eq!(v.normalize(), Vector2::new(0.6, 0.8));
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    }

    #[test]
    fn display() {
        assert_eq!(Vector2::new(1.5, -2.0).to_string(), "(1.5, -2)");
    }
}

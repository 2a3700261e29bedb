use std::fmt::Display;

use auto_ops::impl_op_ex;

use super::{Vector, Vector2, Vector3};

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const ZERO: Vector4 = Vector4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
    // Direction constants are points (w = 1).
    pub const RIGHT: Vector4 = Vector4 { x: 1.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const LEFT: Vector4 = Vector4 { x: -1.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const UP: Vector4 = Vector4 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 };
    pub const DOWN: Vector4 = Vector4 { x: 0.0, y: -1.0, z: 0.0, w: 1.0 };
    pub const FORWARD: Vector4 = Vector4 { x: 0.0, y: 0.0, z: -1.0, w: 1.0 };
    pub const BACK: Vector4 = Vector4 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v, w: v }
    }

    pub fn from_vec2(v: Vector2, z: f32, w: f32) -> Self {
        Self::new(v.x, v.y, z, w)
    }

    pub fn from_vec3(v: Vector3, w: f32) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.w = w;
    }

    pub fn truncate(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    pub fn normalize(&self) -> Self {
        let length = self.length();
        if length != 0.0 { *self / length } else { *self }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Vector for Vector4 {
    const ZERO: Self = Vector4::ZERO;

    fn dot(&self, other: &Self) -> f32 {
        Vector4::dot(self, other)
    }
}

impl_op_ex!(+ |a: &Vector4, b: &Vector4| -> Vector4 { Vector4::new(a.x + b.x, a.y + b.y, a.z + b.z, a.w + b.w) });
impl_op_ex!(- |a: &Vector4, b: &Vector4| -> Vector4 { Vector4::new(a.x - b.x, a.y - b.y, a.z - b.z, a.w - b.w) });
impl_op_ex!(* |a: &Vector4, b: &Vector4| -> Vector4 { Vector4::new(a.x * b.x, a.y * b.y, a.z * b.z, a.w * b.w) });
impl_op_ex!(/ |a: &Vector4, b: &Vector4| -> Vector4 { Vector4::new(a.x / b.x, a.y / b.y, a.z / b.z, a.w / b.w) });
impl_op_ex!(* |a: &Vector4, b: f32| -> Vector4 { Vector4::new(a.x * b, a.y * b, a.z * b, a.w * b) });
impl_op_ex!(/ |a: &Vector4, b: f32| -> Vector4 { Vector4::new(a.x / b, a.y / b, a.z / b, a.w / b) });
impl_op_ex!(% |a: &Vector4, b: f32| -> Vector4 { Vector4::new(a.x % b, a.y % b, a.z % b, a.w % b) });
impl_op_ex!(- |a: &Vector4| -> Vector4 { Vector4::new(-a.x, -a.y, -a.z, -a.w) });

impl_op_ex!(+= |a: &mut Vector4, b: &Vector4| {
    a.x += b.x;
    a.y += b.y;
    a.z += b.z;
    a.w += b.w;
});

impl_op_ex!(-= |a: &mut Vector4, b: &Vector4| {
    a.x -= b.x;
    a.y -= b.y;
    a.z -= b.z;
    a.w -= b.w;
});

impl_op_ex!(*= |a: &mut Vector4, b: f32| {
    a.x *= b;
    a.y *= b;
    a.z *= b;
    a.w *= b;
});

impl_op_ex!(/= |a: &mut Vector4, b: f32| {
    a.x /= b;
    a.y /= b;
    a.z /= b;
    a.w /= b;
});

impl From<[f32; 4]> for Vector4 {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<cgmath::Vector4<f32>> for Vector4 {
    fn from(v: cgmath::Vector4<f32>) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vector4> for cgmath::Vector4<f32> {
    fn from(v: Vector4) -> Self {
        cgmath::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

impl Display for Vector4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

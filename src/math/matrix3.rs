use std::ops::{Mul, MulAssign};

use super::{MathError, Matrix4, Vector3};

/// A 3x3 matrix stored column-major, mostly used for normal matrices.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix3 {
    m: [f32; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    pub const LENGTH: usize = 9;

    pub const ZERO: Matrix3 = Matrix3 { m: [0.0; 9] };

    pub const IDENTITY: Matrix3 = Matrix3 {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub fn from_slice(values: &[f32]) -> Result<Self, MathError> {
        if values.len() < Self::LENGTH {
            return Err(MathError::NotEnoughValues {
                expected: Self::LENGTH,
                actual: values.len(),
            });
        }
        let mut m = [0.0; 9];
        m.copy_from_slice(&values[..Self::LENGTH]);
        Ok(Self { m })
    }

    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.m[col * 3 + row]
    }

    pub fn put(&mut self, col: usize, row: usize, value: f32) {
        self.m[col * 3 + row] = value;
    }

    pub fn column(&self, col: usize) -> Vector3 {
        Vector3::new(self.get(col, 0), self.get(col, 1), self.get(col, 2))
    }

    pub fn set_column(&mut self, col: usize, v: Vector3) {
        self.put(col, 0, v.x);
        self.put(col, 1, v.y);
        self.put(col, 2, v.z);
    }

    pub fn as_array(&self) -> &[f32; 9] {
        &self.m
    }

    pub fn scale_elements(&self, f: f32) -> Self {
        let mut r = *self;
        r.m.iter_mut().for_each(|v| *v *= f);
        r
    }

    pub fn mul_vec3(&self, v: Vector3) -> Vector3 {
        self.column(0) * v.x + self.column(1) * v.y + self.column(2) * v.z
    }

    pub fn transpose(&self) -> Self {
        let mut r = Self::ZERO;
        for col in 0..3 {
            for row in 0..3 {
                r.put(row, col, self.get(col, row));
            }
        }
        r
    }

    pub fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[3] * (m[1] * m[8] - m[2] * m[7])
            + m[6] * (m[1] * m[5] - m[2] * m[4])
    }

    /// Returns `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }
        // The columns of the inverse are the cross products of the rows, scaled.
        let (c0, c1, c2) = (self.column(0), self.column(1), self.column(2));
        let mut adj = Self::ZERO;
        adj.set_column(0, c1.cross(&c2));
        adj.set_column(1, c2.cross(&c0));
        adj.set_column(2, c0.cross(&c1));
        Some(adj.transpose().scale_elements(1.0 / det))
    }
}

impl From<&Matrix4> for Matrix3 {
    /// Upper-left 3x3 block.
    fn from(m: &Matrix4) -> Self {
        let mut r = Self::ZERO;
        for col in 0..3 {
            for row in 0..3 {
                r.put(col, row, m.get(col, row));
            }
        }
        r
    }
}

impl From<Matrix4> for Matrix3 {
    fn from(m: Matrix4) -> Self {
        Self::from(&m)
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        let mut r = Matrix3::ZERO;
        for col in 0..3 {
            r.set_column(col, self.mul_vec3(rhs.column(col)));
        }
        r
    }
}

impl MulAssign for Matrix3 {
    fn mul_assign(&mut self, rhs: Matrix3) {
        *self = *self * rhs;
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        self.mul_vec3(v)
    }
}

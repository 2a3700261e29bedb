use std::fmt::Display;
use std::ops::{Index, IndexMut, Mul, MulAssign};

use super::{MathError, Matrix3, Quaternion, Vector3, Vector4};

/// A 4x4 matrix stored column-major: element `(col, row)` lives at `col * 4 + row`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4 {
    m: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const LENGTH: usize = 16;

    pub const ZERO: Matrix4 = Matrix4 { m: [0.0; 16] };

    #[rustfmt::skip]
    pub const IDENTITY: Matrix4 = Matrix4 {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Maps OpenGL clip-space depth (`-1..1`) onto the `0..1` range wgpu expects.
    #[rustfmt::skip]
    pub const OPENGL_TO_WGPU: Matrix4 = Matrix4 {
        m: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.0,
            0.0, 0.0, 0.5, 1.0,
        ],
    };

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Reads the first 16 values of `values` in column-major order.
    pub fn from_slice(values: &[f32]) -> Result<Self, MathError> {
        if values.len() < Self::LENGTH {
            return Err(MathError::NotEnoughValues {
                expected: Self::LENGTH,
                actual: values.len(),
            });
        }
        let mut m = [0.0; 16];
        m.copy_from_slice(&values[..Self::LENGTH]);
        Ok(Self { m })
    }

    pub fn from_cols(c0: Vector4, c1: Vector4, c2: Vector4, c3: Vector4) -> Self {
        let mut result = Self::ZERO;
        result.set_column(0, c0);
        result.set_column(1, c1);
        result.set_column(2, c2);
        result.set_column(3, c3);
        result
    }

    pub fn from_translation(v: Vector3) -> Self {
        let mut result = Self::IDENTITY;
        result.m[12] = v.x;
        result.m[13] = v.y;
        result.m[14] = v.z;
        result
    }

    pub fn from_scale(x: f32, y: f32, z: f32) -> Self {
        let mut result = Self::IDENTITY;
        result.m[0] = x;
        result.m[5] = y;
        result.m[10] = z;
        result
    }

    /// Rotation of `angle` radians about `axis`. The axis does not need to be normalized.
    pub fn from_axis_angle(angle: f32, axis: Vector3) -> Self {
        let (sin, cos) = angle.sin_cos();
        let one_minus_cos = 1.0 - cos;
        let Vector3 { x, y, z } = axis.normalize();

        let mut r = Self::IDENTITY;
        r.m[0] = x * x * one_minus_cos + cos;
        r.m[4] = x * y * one_minus_cos - z * sin;
        r.m[8] = x * z * one_minus_cos + y * sin;

        r.m[1] = y * x * one_minus_cos + z * sin;
        r.m[5] = y * y * one_minus_cos + cos;
        r.m[9] = y * z * one_minus_cos - x * sin;

        r.m[2] = z * x * one_minus_cos - y * sin;
        r.m[6] = z * y * one_minus_cos + x * sin;
        r.m[10] = z * z * one_minus_cos + cos;
        r
    }

    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut r = Self::ZERO;
        r.m[0] = 2.0 / (right - left);
        r.m[5] = 2.0 / (top - bottom);
        r.m[10] = -2.0 / (far - near);
        r.m[12] = -(right + left) / (right - left);
        r.m[13] = -(top + bottom) / (top - bottom);
        r.m[14] = -(far + near) / (far - near);
        r.m[15] = 1.0;
        r
    }

    /// Right-handed perspective projection. `fov` is the vertical field of view
    /// in radians; x is scaled by `height / width`.
    pub fn perspective(fov: f32, width: f32, height: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov / 2.0).tan();
        let mut r = Self::ZERO;
        r.m[0] = f * (height / width);
        r.m[5] = f;
        r.m[10] = (far + near) / (near - far);
        r.m[14] = (2.0 * far * near) / (near - far);
        r.m[11] = -1.0;
        r
    }

    pub fn perspective_deg(fov: f32, width: f32, height: f32, near: f32, far: f32) -> Self {
        Self::perspective(fov.to_radians(), width, height, near, far)
    }

    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.m[col * 4 + row]
    }

    pub fn put(&mut self, col: usize, row: usize, value: f32) {
        self.m[col * 4 + row] = value;
    }

    pub fn column(&self, col: usize) -> Vector4 {
        Vector4::new(self.get(col, 0), self.get(col, 1), self.get(col, 2), self.get(col, 3))
    }

    pub fn set_column(&mut self, col: usize, v: Vector4) {
        self.put(col, 0, v.x);
        self.put(col, 1, v.y);
        self.put(col, 2, v.z);
        self.put(col, 3, v.w);
    }

    pub fn set_column3(&mut self, col: usize, v: Vector3, w: f32) {
        self.set_column(col, Vector4::from_vec3(v, w));
    }

    /// Replaces the upper-left 3x3 block.
    pub fn set_3x3(&mut self, m: &Matrix3) {
        for col in 0..3 {
            for row in 0..3 {
                self.put(col, row, m.get(col, row));
            }
        }
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Multiplies every element by `f`.
    pub fn scale_elements(&self, f: f32) -> Self {
        let mut r = *self;
        r.m.iter_mut().for_each(|v| *v *= f);
        r
    }

    pub fn mul_vec4(&self, v: Vector4) -> Vector4 {
        let m = &self.m;
        Vector4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }

    /// Transforms `v` extended with `w` and drops the resulting w component.
    /// Use `w = 1` for points and `w = 0` for directions.
    pub fn transform(&self, v: Vector3, w: f32) -> Vector3 {
        self.mul_vec4(Vector4::from_vec3(v, w)).truncate()
    }

    pub fn transpose(&self) -> Self {
        let mut r = Self::ZERO;
        for col in 0..4 {
            for row in 0..4 {
                r.put(row, col, self.get(col, row));
            }
        }
        r
    }

    /// `self * T(x, y, z)`
    pub fn translate(&self, x: f32, y: f32, z: f32) -> Self {
        *self * Self::from_translation(Vector3::new(x, y, z))
    }

    pub fn translate_vec(&self, v: Vector3) -> Self {
        *self * Self::from_translation(v)
    }

    /// `self * S(x, y, z)`
    pub fn scale(&self, x: f32, y: f32, z: f32) -> Self {
        *self * Self::from_scale(x, y, z)
    }

    pub fn scale_uniform(&self, f: f32) -> Self {
        self.scale(f, f, f)
    }

    /// `self * R(angle, axis)` with `angle` in radians.
    pub fn rotate(&self, angle: f32, axis: Vector3) -> Self {
        *self * Self::from_axis_angle(angle, axis)
    }

    pub fn rotate_deg(&self, angle: f32, axis: Vector3) -> Self {
        self.rotate(angle.to_radians(), axis)
    }

    pub fn determinant(&self) -> f32 {
        let inv = self.adjugate();
        let m = &self.m;
        m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12]
    }

    /// Returns `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.adjugate();
        let m = &self.m;
        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == 0.0 {
            return None;
        }
        Some(Self { m: inv }.scale_elements(1.0 / det))
    }

    #[rustfmt::skip]
    fn adjugate(&self) -> [f32; 16] {
        let m = &self.m;
        let mut inv = [0.0; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14] + m[13] * m[6] * m[11] - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14] - m[12] * m[6] * m[11] + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13] + m[12] * m[5] * m[11] - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13] - m[12] * m[5] * m[10] + m[12] * m[6] * m[9];

        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14] - m[13] * m[2] * m[11] + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14] + m[12] * m[2] * m[11] - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13] - m[12] * m[1] * m[11] + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13] + m[12] * m[1] * m[10] - m[12] * m[2] * m[9];

        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14] + m[13] * m[2] * m[7] - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14] - m[12] * m[2] * m[7] + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13] + m[12] * m[1] * m[7] - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13] - m[12] * m[1] * m[6] + m[12] * m[2] * m[5];

        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10] - m[9] * m[2] * m[7] + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10] + m[8] * m[2] * m[7] - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9] - m[8] * m[1] * m[7] + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9] + m[8] * m[1] * m[6] - m[8] * m[2] * m[5];

        inv
    }

    /// Extracts the rotation of the upper-left 3x3 block as a unit quaternion.
    pub fn to_quaternion(&self) -> Quaternion {
        let m = &self.m;
        let candidates = [
            m[0] + m[5] + m[10],
            m[0] - m[5] - m[10],
            m[5] - m[0] - m[10],
            m[10] - m[0] - m[5],
        ];

        let mut biggest_index = 0;
        for (i, v) in candidates.iter().enumerate().skip(1) {
            if *v > candidates[biggest_index] {
                biggest_index = i;
            }
        }

        let biggest = (candidates[biggest_index] + 1.0).sqrt() * 0.5;
        let mult = 0.25 / biggest;

        match biggest_index {
            0 => Quaternion::new(
                (m[6] - m[9]) * mult,
                (m[8] - m[2]) * mult,
                (m[1] - m[4]) * mult,
                biggest,
            ),
            1 => Quaternion::new(
                biggest,
                (m[1] + m[4]) * mult,
                (m[8] + m[2]) * mult,
                (m[6] - m[9]) * mult,
            ),
            2 => Quaternion::new(
                (m[1] + m[4]) * mult,
                biggest,
                (m[6] + m[9]) * mult,
                (m[8] - m[2]) * mult,
            ),
            _ => Quaternion::new(
                (m[8] + m[2]) * mult,
                (m[6] + m[9]) * mult,
                biggest,
                (m[1] - m[4]) * mult,
            ),
        }
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut r = Matrix4::ZERO;
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.get(k, row) * rhs.get(col, k);
                }
                r.put(col, row, sum);
            }
        }
        r
    }
}

impl MulAssign for Matrix4 {
    fn mul_assign(&mut self, rhs: Matrix4) {
        *self = *self * rhs;
    }
}

impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Vector4 {
        self.mul_vec4(rhs)
    }
}

impl Index<usize> for Matrix4 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.m[index]
    }
}

impl IndexMut<usize> for Matrix4 {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.m[index]
    }
}

impl From<cgmath::Matrix4<f32>> for Matrix4 {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        let cols: [[f32; 4]; 4] = m.into();
        let mut r = Self::ZERO;
        for (col, values) in cols.iter().enumerate() {
            r.set_column(col, (*values).into());
        }
        r
    }
}

impl From<Matrix4> for cgmath::Matrix4<f32> {
    fn from(m: Matrix4) -> Self {
        let c = |i: usize| -> [f32; 4] { m.column(i).to_array() };
        cgmath::Matrix4::from([c(0), c(1), c(2), c(3)])
    }
}

impl Display for Matrix4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in 0..4 {
            writeln!(
                f,
                "[{}, {}, {}, {}]",
                self.get(0, row),
                self.get(1, row),
                self.get(2, row),
                self.get(3, row)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx::assert_approx_eq;
    use cgmath::{Deg, Matrix, SquareMatrix};
    use std::f32::consts::FRAC_PI_2;

    fn sample() -> Matrix4 {
        Matrix4::from_slice(&[
            2.0, 0.0, 1.0, 0.0, //
            1.0, 3.0, 0.0, 0.0, //
            0.0, 1.0, 4.0, 0.0, //
            5.0, -2.0, 1.0, 1.0,
        ])
        .unwrap()
    }

    #[test]
    fn from_slice_requires_sixteen_values() {
        assert_eq!(
            Matrix4::from_slice(&[1.0; 15]),
            Err(MathError::NotEnoughValues { expected: 16, actual: 15 })
        );
        assert!(Matrix4::from_slice(&[1.0; 20]).is_ok());
    }

    #[test]
    fn column_major_layout() {
        let m = Matrix4::IDENTITY.translate(1.0, 2.0, 3.0);
        assert_eq!(m[12], 1.0);
        assert_eq!(m.get(3, 1), 2.0);
        assert_eq!(m.column(3), Vector4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn set_column_writes_w() {
        let mut m = Matrix4::ZERO;
        m.set_column(2, Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(m.get(2, 3), 4.0);
        m.set_column3(1, Vector3::ONE, 7.0);
        assert_eq!(m.column(1), Vector4::new(1.0, 1.0, 1.0, 7.0));
    }

    #[test]
    fn product_matches_cgmath() {
        let a = sample();
        let b = Matrix4::IDENTITY.rotate_deg(30.0, Vector3::new(1.0, 1.0, 0.0)).scale(1.0, 2.0, 3.0);
        let expected: Matrix4 =
            (cgmath::Matrix4::from(a) * cgmath::Matrix4::from(b)).into();
        assert_approx_eq(&(a * b), &expected, 1e-5);
    }

    #[test]
    fn rotation_matches_cgmath() {
        let axis = Vector3::new(0.0, 0.0, 2.0);
        let ours = Matrix4::IDENTITY.rotate_deg(45.0, axis);
        let theirs: Matrix4 = cgmath::Matrix4::from_angle_z(Deg(45.0f32)).into();
        assert_approx_eq(&ours, &theirs, 1e-6);
    }

    #[test]
    fn transform_points_and_directions() {
        let m = Matrix4::IDENTITY.translate(1.0, 0.0, 0.0).rotate(FRAC_PI_2, Vector3::UP);
        assert_approx_eq(&m.transform(Vector3::BACK, 1.0), &Vector3::new(2.0, 0.0, 0.0), 1e-6);
        assert_approx_eq(&m.transform(Vector3::BACK, 0.0), &Vector3::RIGHT, 1e-6);
    }

    #[test]
    fn inverse_and_determinant() {
        let m = sample();
        let expected = cgmath::Matrix4::from(m);
        assert!((m.determinant() - expected.determinant()).abs() < 1e-4);

        let inv = m.inverse().unwrap();
        assert_approx_eq(&(m * inv), &Matrix4::IDENTITY, 1e-5);
        assert_approx_eq(&inv, &expected.invert().unwrap().into(), 1e-5);
        assert_eq!(Matrix4::ZERO.inverse(), None);
    }

    #[test]
    fn transpose_matches_cgmath() {
        let m = sample();
        let expected: Matrix4 = cgmath::Matrix4::from(m).transpose().into();
        assert_eq!(m.transpose(), expected);
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn perspective_projects_near_and_far_planes() {
        let p = Matrix4::perspective_deg(90.0, 800.0, 600.0, 1.0, 100.0);
        let near = p.mul_vec4(Vector4::new(0.0, 0.0, -1.0, 1.0));
        let far = p.mul_vec4(Vector4::new(0.0, 0.0, -100.0, 1.0));
        assert!((near.z / near.w + 1.0).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
        assert!((p.get(0, 0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn ortho_matches_cgmath() {
        let ours = Matrix4::ortho(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
        let theirs: Matrix4 = cgmath::ortho(0.0f32, 800.0, 0.0, 600.0, -1.0, 1.0).into();
        assert_approx_eq(&ours, &theirs, 1e-6);
    }

    #[test]
    fn opengl_to_wgpu_maps_depth_range() {
        let clip = Matrix4::OPENGL_TO_WGPU.mul_vec4(Vector4::new(0.0, 0.0, -1.0, 1.0));
        assert_eq!(clip.z, 0.0);
        let clip = Matrix4::OPENGL_TO_WGPU.mul_vec4(Vector4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(clip.z, 1.0);
    }

    #[test]
    fn to_quaternion_round_trips_rotations() {
        for (angle, axis) in [
            (30.0, Vector3::UP),
            (170.0, Vector3::RIGHT),
            (179.0, Vector3::new(0.0, 1.0, 1.0)),
            (-120.0, Vector3::BACK),
        ] {
            let q = Quaternion::from_axis_angle_deg(angle, axis);
            let back = q.to_matrix().to_quaternion();
            // q and -q encode the same rotation
            let same = back.dot(&q).abs();
            assert!((same - 1.0).abs() < 1e-5, "{angle} about {axis}: {back}");
        }
    }
}

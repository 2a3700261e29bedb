use super::{Matrix4, Vector3, Vector4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl Plane {
    pub const ALL: [Plane; 6] = [
        Plane::Left,
        Plane::Right,
        Plane::Bottom,
        Plane::Top,
        Plane::Near,
        Plane::Far,
    ];
}

/// View-frustum culling against planes extracted from a combined
/// projection * view (* model) matrix in OpenGL clip-space convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vector4; 6],
}

impl Frustum {
    pub fn new(matrix: &Matrix4) -> Self {
        let mut frustum = Self::default();
        frustum.setup_planes(matrix);
        frustum
    }

    pub fn setup_planes(&mut self, matrix: &Matrix4) {
        for (i, plane) in Plane::ALL.iter().enumerate() {
            let (row, sign) = match plane {
                Plane::Left => (0, 1.0),
                Plane::Right => (0, -1.0),
                Plane::Bottom => (1, 1.0),
                Plane::Top => (1, -1.0),
                Plane::Near => (2, 1.0),
                Plane::Far => (2, -1.0),
            };
            self.planes[i] = Self::extract(matrix, row, sign);
        }
    }

    fn extract(m: &Matrix4, row: usize, sign: f32) -> Vector4 {
        let p = Vector4::new(
            m.get(0, 3) + sign * m.get(0, row),
            m.get(1, 3) + sign * m.get(1, row),
            m.get(2, 3) + sign * m.get(2, row),
            m.get(3, 3) + sign * m.get(3, row),
        );
        let length = p.truncate().length();
        if length != 0.0 { p / length } else { p }
    }

    pub fn plane(&self, plane: Plane) -> Vector4 {
        self.planes[plane as usize]
    }

    /// Signed distance, positive on the inside of `plane`.
    pub fn distance(&self, plane: Plane, point: Vector3) -> f32 {
        let p = self.plane(plane);
        p.truncate().dot(&point) + p.w
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        Plane::ALL.iter().all(|p| self.distance(*p, point) >= 0.0)
    }

    pub fn contains_cube(&self, center: Vector3, side: f32) -> bool {
        let half = side * 0.5;
        self.contains_box(center - Vector3::splat(half), side, side, side)
    }

    /// Conservative test: the box is rejected only when all of its corners lie
    /// behind a single plane.
    pub fn contains_box(&self, corner: Vector3, width: f32, height: f32, depth: f32) -> bool {
        let corners = [
            corner,
            corner + Vector3::new(width, 0.0, 0.0),
            corner + Vector3::new(0.0, height, 0.0),
            corner + Vector3::new(0.0, 0.0, depth),
            corner + Vector3::new(width, height, 0.0),
            corner + Vector3::new(width, 0.0, depth),
            corner + Vector3::new(0.0, height, depth),
            corner + Vector3::new(width, height, depth),
        ];
        Plane::ALL
            .iter()
            .all(|p| corners.iter().any(|c| self.distance(*p, *c) >= 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Frustum {
        let projection = Matrix4::perspective_deg(90.0, 1.0, 1.0, 1.0, 100.0);
        Frustum::new(&projection)
    }

    #[test]
    fn points() {
        let f = camera();
        assert!(f.contains_point(Vector3::new(0.0, 0.0, -10.0)));
        assert!(!f.contains_point(Vector3::new(0.0, 0.0, 10.0)));
        assert!(!f.contains_point(Vector3::new(0.0, 0.0, -0.5)));
        assert!(!f.contains_point(Vector3::new(0.0, 0.0, -101.0)));
        assert!(!f.contains_point(Vector3::new(20.0, 0.0, -10.0)));
    }

    #[test]
    fn near_plane_distance_is_metric() {
        let f = camera();
        assert!((f.distance(Plane::Near, Vector3::new(0.0, 0.0, -3.0)) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn boxes_straddling_a_plane_are_kept() {
        let f = camera();
        assert!(f.contains_cube(Vector3::new(0.0, 0.0, -10.0), 1.0));
        assert!(f.contains_box(Vector3::new(9.0, 0.0, -10.0), 4.0, 1.0, 1.0));
        assert!(!f.contains_cube(Vector3::new(0.0, 0.0, 10.0), 2.0));
    }
}

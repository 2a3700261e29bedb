//! Keyframe interpolation over any [`Vector`] type, usually driven by a
//! [`Timer`](crate::timer::Timer) alpha.

use crate::math::Vector;

pub fn lerp<V: Vector>(a: V, b: V, alpha: f32) -> V {
    a + (b - a) * alpha
}

/// Keyframes sampled at evenly spaced alphas.
#[derive(Debug, Clone, Default)]
pub struct LinearInterpolator<V: Vector> {
    values: Vec<V>,
}

impl<V: Vector> LinearInterpolator<V> {
    pub fn new(values: Vec<V>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// `alpha` is clamped to `[0, 1]`. Returns `None` without keyframes.
    pub fn interpolate(&self, alpha: f32) -> Option<V> {
        let (first, last) = (self.values.first()?, self.values.last()?);
        if self.values.len() == 1 {
            return Some(*first);
        }
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha >= 1.0 {
            return Some(*last);
        }
        let segments = (self.values.len() - 1) as f32;
        let position = alpha * segments;
        let segment = position.floor() as usize;
        Some(lerp(
            self.values[segment],
            self.values[segment + 1],
            position - segment as f32,
        ))
    }
}

/// Keyframes weighted by the distance between them, so that an alpha moving at
/// constant speed produces constant velocity along the path.
#[derive(Debug, Clone, Default)]
pub struct ConstVelocityInterpolator<V: Vector> {
    values: Vec<V>,
    // cumulative path length at each keyframe, normalized to end at 1
    stops: Vec<f32>,
    total_length: f32,
}

impl<V: Vector> ConstVelocityInterpolator<V> {
    pub fn new(values: Vec<V>) -> Self {
        let mut stops = Vec::with_capacity(values.len());
        let mut total = 0.0;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                total += (*value - values[i - 1]).length();
            }
            stops.push(total);
        }
        if total > 0.0 {
            stops.iter_mut().for_each(|s| *s /= total);
        }
        Self {
            values,
            stops,
            total_length: total,
        }
    }

    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    pub fn interpolate(&self, alpha: f32) -> Option<V> {
        let first = *self.values.first()?;
        if self.total_length == 0.0 {
            return Some(first);
        }
        let alpha = alpha.clamp(0.0, 1.0);
        // first keyframe whose stop lies past alpha
        let upper = self.stops.iter().position(|s| *s > alpha);
        let Some(upper) = upper else {
            return self.values.last().copied();
        };
        let lower = upper - 1;
        let span = self.stops[upper] - self.stops[lower];
        Some(lerp(
            self.values[lower],
            self.values[upper],
            (alpha - self.stops[lower]) / span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vector2, Vector3, approx::assert_approx_eq};

    #[test]
    fn linear_uses_even_spacing() {
        let path = LinearInterpolator::new(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 10.0),
        ]);
        assert_eq!(path.interpolate(0.25), Some(Vector2::new(0.5, 0.0)));
        assert_eq!(path.interpolate(0.75), Some(Vector2::new(1.0, 5.0)));
        assert_eq!(path.interpolate(2.0), Some(Vector2::new(1.0, 10.0)));
        assert_eq!(LinearInterpolator::<Vector2>::new(vec![]).interpolate(0.5), None);
    }

    #[test]
    fn const_velocity_weights_by_distance() {
        let path = ConstVelocityInterpolator::new(vec![
            Vector3::ZERO,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 3.0, 0.0),
        ]);
        assert_eq!(path.total_length(), 4.0);
        assert_approx_eq(&path.interpolate(0.25).unwrap(), &Vector3::new(1.0, 0.0, 0.0), 1e-6);
        assert_approx_eq(&path.interpolate(0.5).unwrap(), &Vector3::new(1.0, 1.0, 0.0), 1e-6);
        assert_eq!(path.interpolate(1.0), Some(Vector3::new(1.0, 3.0, 0.0)));
    }
}

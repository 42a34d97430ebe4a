use crate::math::Vec3;

/// A half-line with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray. The direction is normalized here, so callers may pass
    /// any non-zero vector.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Creates a ray whose origin is pushed `epsilon` along its own direction,
    /// so it doesn't immediately hit the surface it starts on.
    pub fn offset(origin: Vec3, direction: Vec3, epsilon: f32) -> Self {
        let direction = direction.normalize();
        Self {
            origin: origin + direction * epsilon,
            direction,
        }
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

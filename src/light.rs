//! Light types for the renderer.
//!
//! A scene holds [`Light`]s: point lights and spotlights. While shading, a
//! light is viewed as a [`LightSource`], which adds a third, transient kind:
//! the indirect light that carries a reflected or refracted sample back into
//! the direct shading sum.

use crate::color::Color;
use crate::math::Vec3;

/// Radial (distance) falloff coefficients: `1 / (a2·d² + a1·d + a0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialAttenuation {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl RadialAttenuation {
    /// Substituted when every coefficient is zero.
    pub const DEFAULT: Self = Self {
        a0: 0.0,
        a1: 0.0,
        a2: 1.0,
    };

    pub const fn new(a0: f32, a1: f32, a2: f32) -> Self {
        Self { a0, a1, a2 }
    }

    /// True when all coefficients are zero and the falloff would divide by zero.
    pub fn is_degenerate(&self) -> bool {
        self.a0 == 0.0 && self.a1 == 0.0 && self.a2 == 0.0
    }

    /// Returns these coefficients, or [`RadialAttenuation::DEFAULT`] if degenerate.
    pub fn effective(&self) -> Self {
        if self.is_degenerate() {
            Self::DEFAULT
        } else {
            *self
        }
    }
}

impl Default for RadialAttenuation {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A light radiating equally in every direction from a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub position: Vec3,
    pub radial: RadialAttenuation,
}

impl PointLight {
    pub fn new(color: Color, position: Vec3, radial: RadialAttenuation) -> Self {
        Self {
            color,
            position,
            radial,
        }
    }
}

/// A point light restricted to a cone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub position: Vec3,
    /// The normalized axis of the cone (the direction the light points).
    pub direction: Vec3,
    /// Half-angle of the cone in radians.
    pub half_angle: f32,
    /// Exponent applied to the cosine of the off-axis angle.
    pub angular_falloff: f32,
    pub radial: RadialAttenuation,
}

impl SpotLight {
    /// Create a spotlight. The direction is normalized automatically.
    pub fn new(
        color: Color,
        position: Vec3,
        direction: Vec3,
        half_angle: f32,
        angular_falloff: f32,
        radial: RadialAttenuation,
    ) -> Self {
        Self {
            color,
            position,
            direction: direction.normalize(),
            half_angle,
            angular_falloff,
            radial,
        }
    }

    /// Create a spotlight from a half-angle given in degrees.
    pub fn from_degrees(
        color: Color,
        position: Vec3,
        direction: Vec3,
        half_angle_degrees: f32,
        angular_falloff: f32,
        radial: RadialAttenuation,
    ) -> Self {
        Self::new(
            color,
            position,
            direction,
            half_angle_degrees.to_radians(),
            angular_falloff,
            radial,
        )
    }
}

/// A light that is part of a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Spot(SpotLight),
}

impl Light {
    pub fn radial(&self) -> RadialAttenuation {
        match self {
            Light::Point(light) => light.radial,
            Light::Spot(light) => light.radial,
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<SpotLight> for Light {
    fn from(light: SpotLight) -> Self {
        Light::Spot(light)
    }
}

/// Anything that can feed the direct shading sum.
///
/// `Indirect` exists only for the duration of one shading call: it is a
/// traced reflection or refraction sample dressed up as a light so that it
/// goes through the same diffuse/specular terms. It is infinitely far away
/// and never attenuated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightSource<'a> {
    Point(&'a PointLight),
    Spot(&'a SpotLight),
    Indirect {
        color: Color,
        /// The direction the light arrives along, i.e. toward the shaded
        /// surface.
        direction: Vec3,
    },
}

impl<'a> LightSource<'a> {
    pub fn color(&self) -> Color {
        match self {
            LightSource::Point(light) => light.color,
            LightSource::Spot(light) => light.color,
            LightSource::Indirect { color, .. } => *color,
        }
    }

    /// Unit direction from `point` toward this light, and the distance to it.
    ///
    /// Indirect light is infinitely far away. A light sitting exactly on
    /// `point` has no direction and reports a zero vector at distance 0.
    pub fn incidence(&self, point: Vec3) -> (Vec3, f32) {
        let position = match self {
            LightSource::Point(light) => light.position,
            LightSource::Spot(light) => light.position,
            LightSource::Indirect { direction, .. } => return (-*direction, f32::INFINITY),
        };

        let offset = position - point;
        let distance = offset.magnitude();
        if distance == 0.0 {
            return (Vec3::ZERO, 0.0);
        }
        (offset / distance, distance)
    }
}

impl<'a> From<&'a Light> for LightSource<'a> {
    fn from(light: &'a Light) -> Self {
        match light {
            Light::Point(point) => LightSource::Point(point),
            Light::Spot(spot) => LightSource::Spot(spot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spotlight_direction_is_normalized() {
        let spot = SpotLight::new(
            Color::WHITE,
            Vec3::ZERO,
            Vec3::new(0.0, -4.0, 0.0),
            0.5,
            1.0,
            RadialAttenuation::DEFAULT,
        );
        assert_relative_eq!(spot.direction.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn spotlight_from_degrees() {
        let spot = SpotLight::from_degrees(
            Color::WHITE,
            Vec3::ZERO,
            Vec3::DOWN,
            90.0,
            1.0,
            RadialAttenuation::DEFAULT,
        );
        assert_relative_eq!(spot.half_angle, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_attenuation_uses_default() {
        let zero = RadialAttenuation::new(0.0, 0.0, 0.0);
        assert!(zero.is_degenerate());
        assert_eq!(zero.effective(), RadialAttenuation::DEFAULT);

        let linear = RadialAttenuation::new(0.0, 1.0, 0.0);
        assert_eq!(linear.effective(), linear);
    }

    #[test]
    fn incidence_of_point_and_indirect_light() {
        let origin = Vec3::new(0.0, 3.0, 0.0);
        let light = PointLight::new(Color::WHITE, origin, RadialAttenuation::DEFAULT);
        let (to_light, distance) = LightSource::Point(&light).incidence(Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(to_light, Vec3::UP);
        assert_relative_eq!(distance, 4.0);

        let indirect = LightSource::Indirect {
            color: Color::WHITE,
            direction: Vec3::DOWN,
        };
        let (to_light, distance) = indirect.incidence(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(to_light, Vec3::UP);
        assert!(distance.is_infinite());
    }

    #[test]
    fn light_source_from_scene_light() {
        let light = Light::from(PointLight::new(
            Color::new(1.0, 0.5, 0.0),
            Vec3::UP,
            RadialAttenuation::DEFAULT,
        ));
        let source = LightSource::from(&light);
        assert!(matches!(source, LightSource::Point(_)));
        assert_eq!(source.color(), Color::new(1.0, 0.5, 0.0));
    }
}

//! Local reflectance model: Lambert diffuse, Phong specular, and light falloff.
//!
//! All vectors passed in are expected to be normalized by the caller.

use crate::color::Color;
use crate::light::{LightSource, RadialAttenuation};
use crate::math::Vec3;

pub use crate::color::clamp;

/// Phong exponent used for every material.
pub const SHININESS: f32 = 20.0;

/// Distances above this are treated as infinitely far (no radial falloff).
const FAR_DISTANCE: f32 = 1.0e14;

/// Lambertian diffuse term.
///
/// # Arguments
/// * `normal` - Surface normal
/// * `to_light` - Direction from the surface point toward the light
/// * `light_color` - Intensity of the light per channel
/// * `diffuse_color` - The material's diffuse color
pub fn diffuse(normal: Vec3, to_light: Vec3, light_color: Color, diffuse_color: Color) -> Color {
    let n_dot_l = normal.dot(to_light);
    if n_dot_l > 0.0 {
        diffuse_color * light_color * n_dot_l
    } else {
        Color::BLACK
    }
}

/// Phong specular term.
///
/// # Arguments
/// * `shininess` - Phong exponent
/// * `to_light` - Direction from the surface point toward the light (L)
/// * `reflected` - `L` mirrored about the normal (R)
/// * `normal` - Surface normal (N)
/// * `to_viewer` - Direction from the surface point toward the viewer (V)
/// * `specular_color` - The material's specular color
/// * `light_color` - Intensity of the light per channel
pub fn specular(
    shininess: f32,
    to_light: Vec3,
    reflected: Vec3,
    normal: Vec3,
    to_viewer: Vec3,
    specular_color: Color,
    light_color: Color,
) -> Color {
    let v_dot_r = to_viewer.dot(reflected);
    let n_dot_l = normal.dot(to_light);
    if v_dot_r > 0.0 && n_dot_l > 0.0 {
        specular_color * light_color * v_dot_r.powf(shininess)
    } else {
        Color::BLACK
    }
}

/// Spotlight cone falloff. Every other kind of light returns 1.
///
/// `direction_to_object` points from the light toward the shaded point.
pub fn angular_attenuation(light: &LightSource, direction_to_object: Vec3) -> f32 {
    let LightSource::Spot(spot) = light else {
        return 1.0;
    };

    let axis = spot.direction.normalize();
    let cos_angle = axis.dot(direction_to_object);
    // Cones wider than a hemisphere would raise a negative cosine to a
    // fractional power
    if cos_angle <= 0.0 || cos_angle < spot.half_angle.cos() {
        return 0.0;
    }
    cos_angle.powf(spot.angular_falloff)
}

/// Distance falloff `1 / (a2·d² + a1·d + a0)`.
///
/// All-zero coefficients behave as `(0, 0, 1)`. An infinite distance means
/// the contribution isn't attenuated at all.
pub fn radial_attenuation(radial: &RadialAttenuation, distance: f32) -> f32 {
    if distance > FAR_DISTANCE {
        return 1.0;
    }
    let RadialAttenuation { a0, a1, a2 } = radial.effective();
    1.0 / (a2 * distance * distance + a1 * distance + a0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{PointLight, SpotLight};
    use approx::assert_relative_eq;

    #[test]
    fn diffuse_facing_light() {
        let c = diffuse(
            Vec3::UP,
            Vec3::UP,
            Color::new(2.0, 1.0, 1.0),
            Color::new(0.5, 0.5, 0.0),
        );
        assert_eq!(c, Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn diffuse_angled_light() {
        let to_light = Vec3::new(0.0, 1.0, 1.0).normalize();
        let c = diffuse(Vec3::UP, to_light, Color::WHITE, Color::WHITE);
        // cos(45) ≈ 0.707
        assert_relative_eq!(c.r, 0.707, epsilon = 0.01);
    }

    #[test]
    fn diffuse_facing_away_is_black() {
        let c = diffuse(Vec3::UP, Vec3::DOWN, Color::WHITE, Color::WHITE);
        assert!(c.is_black());
    }

    #[test]
    fn specular_peaks_along_mirror_direction() {
        let to_light = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let reflected = (-to_light).reflect(Vec3::UP);
        let to_viewer = reflected;

        let c = specular(
            SHININESS,
            to_light,
            reflected,
            Vec3::UP,
            to_viewer,
            Color::WHITE,
            Color::WHITE,
        );
        assert_relative_eq!(c.r, 1.0, epsilon = 1e-5);

        // Off the highlight, the exponent makes it fall off quickly
        let off = Vec3::new(0.5, 1.0, 0.0).normalize();
        let c = specular(
            SHININESS,
            to_light,
            reflected,
            Vec3::UP,
            off,
            Color::WHITE,
            Color::WHITE,
        );
        assert!(c.r < 0.5);
    }

    #[test]
    fn specular_requires_lit_side() {
        let to_light = Vec3::DOWN;
        let c = specular(
            SHININESS,
            to_light,
            Vec3::UP,
            Vec3::UP,
            Vec3::UP,
            Color::WHITE,
            Color::WHITE,
        );
        assert!(c.is_black());
    }

    #[test]
    fn angular_attenuation_of_point_light_is_one() {
        let point = PointLight::new(Color::WHITE, Vec3::ZERO, RadialAttenuation::DEFAULT);
        assert_eq!(angular_attenuation(&LightSource::Point(&point), Vec3::RIGHT), 1.0);

        let indirect = LightSource::Indirect {
            color: Color::WHITE,
            direction: Vec3::DOWN,
        };
        assert_eq!(angular_attenuation(&indirect, Vec3::UP), 1.0);
    }

    #[test]
    fn angular_attenuation_of_spotlight() {
        let spot = SpotLight::from_degrees(
            Color::WHITE,
            Vec3::ZERO,
            Vec3::new(0.0, -2.0, 0.0),
            30.0,
            2.0,
            RadialAttenuation::DEFAULT,
        );
        let source = LightSource::Spot(&spot);

        // On the axis
        assert_relative_eq!(angular_attenuation(&source, Vec3::DOWN), 1.0, epsilon = 1e-6);

        // Inside the cone at 20 degrees: cos(20)^2
        let inside = Vec3::new(20f32.to_radians().sin(), -20f32.to_radians().cos(), 0.0);
        assert_relative_eq!(
            angular_attenuation(&source, inside),
            20f32.to_radians().cos().powi(2),
            epsilon = 1e-5
        );

        // Outside the cone
        let outside = Vec3::new(1.0, -1.0, 0.0).normalize();
        assert_eq!(angular_attenuation(&source, outside), 0.0);
    }

    #[test]
    fn wide_spotlight_never_produces_nan() {
        let spot = SpotLight::from_degrees(
            Color::WHITE,
            Vec3::ZERO,
            Vec3::DOWN,
            120.0,
            0.5,
            RadialAttenuation::DEFAULT,
        );
        let source = LightSource::Spot(&spot);

        // 100 degrees off axis: inside the cone, but behind the light
        let behind = Vec3::new(100f32.to_radians().sin(), -100f32.to_radians().cos(), 0.0);
        let falloff = angular_attenuation(&source, behind);
        assert!(!falloff.is_nan());
        assert_eq!(falloff, 0.0);

        // 60 degrees off axis is still lit
        let ahead = Vec3::new(60f32.to_radians().sin(), -60f32.to_radians().cos(), 0.0);
        assert_relative_eq!(angular_attenuation(&source, ahead), 0.5f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn radial_attenuation_zero_coefficients_match_default() {
        let zero = RadialAttenuation::new(0.0, 0.0, 0.0);
        let default = RadialAttenuation::new(0.0, 0.0, 1.0);
        for d in [0.5, 1.0, 3.0, 42.0] {
            assert_eq!(radial_attenuation(&zero, d), radial_attenuation(&default, d));
        }
        assert_relative_eq!(radial_attenuation(&zero, 2.0), 0.25);
    }

    #[test]
    fn radial_attenuation_quadratic() {
        let radial = RadialAttenuation::new(1.0, 2.0, 3.0);
        // 3*4 + 2*2 + 1 = 17
        assert_relative_eq!(radial_attenuation(&radial, 2.0), 1.0 / 17.0);
    }

    #[test]
    fn radial_attenuation_at_infinity_is_one() {
        let radial = RadialAttenuation::new(1.0, 1.0, 1.0);
        assert_eq!(radial_attenuation(&radial, f32::INFINITY), 1.0);
    }
}

//! Recursive shading of ray hits.
//!
//! A [`Tracer`] pairs an immutable [`Scene`] with the [`RenderSettings`] it is
//! rendered under. Shading a hit combines three things:
//!
//! - the mirror sample, traced along the reflected direction
//! - the transmitted sample, traced along the refracted direction
//! - the scene lights that are not blocked by another object (hard shadows)
//!
//! Traced samples are folded back through the same diffuse/specular terms as
//! ordinary lights, as [`LightSource::Indirect`] sources.
//!
//! Recursion depth is explicit and capped by [`RenderSettings::max_depth`].

use approx::abs_diff_eq;

use crate::color::Color;
use crate::illumination::{angular_attenuation, diffuse, radial_attenuation, specular};
use crate::intersect::Hit;
use crate::light::LightSource;
use crate::math::Vec3;
use crate::ray::Ray;
use crate::render::{RenderError, RenderSettings};
use crate::scene::{Material, Scene};

/// Distance secondary rays are pushed off the surface they leave.
pub const SURFACE_EPSILON: f32 = 1.0e-4;

/// Below this `|N × d|` the ray is treated as hitting head-on.
const NORMAL_INCIDENCE_EPSILON: f32 = 1.0e-6;

/// The medium a ray is travelling through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Medium {
    pub ior: f32,
}

impl Medium {
    pub const AIR: Self = Self { ior: 1.0 };

    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::AIR
    }
}

/// Result of shading one hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shade {
    pub color: Color,
    /// Set when the recursion limit was hit and nothing was shaded.
    pub terminal: bool,
}

impl Shade {
    const TERMINAL: Self = Self {
        color: Color::BLACK,
        terminal: true,
    };

    fn lit(color: Color) -> Self {
        Self {
            color,
            terminal: false,
        }
    }
}

/// Refracts `direction` through a surface with unit `normal`.
///
/// `eta` is the ratio of the incoming to the outgoing index of refraction. The
/// normal may face either way. Returns `None` on total internal reflection.
pub fn refract(direction: Vec3, normal: Vec3, eta: f32) -> Option<Vec3> {
    let axis = normal.cross(direction);
    if axis.magnitude() < NORMAL_INCIDENCE_EPSILON {
        return Some(direction);
    }

    // Tangent along the surface, in the plane of incidence
    let tangent = axis.cross(normal).normalize();
    let sin_t = eta * direction.dot(tangent);
    if sin_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin_t * sin_t).sqrt();

    let facing = if direction.dot(normal) < 0.0 {
        normal
    } else {
        -normal
    };
    Some((tangent * sin_t - facing * cos_t).normalize())
}

/// Weight left for local shading once the mirror and transmitted samples have
/// taken their share. Clamped to zero.
pub fn local_weight(reflectivity: f32, refractivity: f32) -> f32 {
    let weight = 1.0 - reflectivity - refractivity;
    if weight < 0.0 || abs_diff_eq!(weight, 0.0, epsilon = 1.0e-6) {
        0.0
    } else {
        weight
    }
}

pub struct Tracer<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        Self { scene, settings }
    }

    /// Traces a primary ray through air. A miss paints the background.
    pub fn trace(&self, ray: &Ray) -> Result<Color, RenderError> {
        self.sample(ray, Medium::AIR, 0)
    }

    /// Shades `hit`, found along `ray` while travelling through `medium`.
    ///
    /// # Errors
    /// [`RenderError::UnsupportedObject`] if `hit` refers to an object that
    /// can't be shaded.
    pub fn shade(
        &self,
        ray: &Ray,
        hit: &Hit,
        medium: Medium,
        depth: u32,
    ) -> Result<Shade, RenderError> {
        if depth > self.settings.max_depth {
            return Ok(Shade::TERMINAL);
        }

        let object = &self.scene.objects()[hit.index];
        let primitive = object
            .as_primitive()
            .ok_or(RenderError::UnsupportedObject {
                index: hit.index,
                kind: object.kind(),
            })?;
        let material = primitive.material();
        let point = ray.at(hit.t);
        let outward = primitive.normal_at(point);
        // Shade the side the ray arrived on
        let normal = if ray.direction.dot(outward) > 0.0 {
            -outward
        } else {
            outward
        };

        let reflectivity = material.reflection();
        let refractivity = material.refraction();
        let mut color = Color::BLACK;

        if reflectivity > 0.0 {
            let reflected = ray.direction.reflect(normal);
            let secondary = Ray::offset(point, reflected, SURFACE_EPSILON);
            let sample = self.sample(&secondary, medium, depth + 1)? * reflectivity;
            let source = LightSource::Indirect {
                color: sample,
                direction: -reflected,
            };
            color += self.direct_shade(ray.direction, material, point, normal, &source);
        }

        if refractivity > 0.0 {
            let surface_ior = material.index_of_refraction();
            let (eta, next) = if hit.inside {
                (surface_ior, Medium::AIR)
            } else {
                (medium.ior / surface_ior, Medium::new(surface_ior))
            };

            if let Some(refracted) = refract(ray.direction, normal, eta) {
                let secondary = Ray::offset(point, refracted, SURFACE_EPSILON);
                let sample = self.sample(&secondary, next, depth + 1)? * refractivity;
                // The sample arrives from behind the surface; shade it as if
                // it came from its mirror image on the viewer's side.
                let mirrored = refracted.reflect(normal);
                let source = LightSource::Indirect {
                    color: sample,
                    direction: -mirrored,
                };
                color += self.direct_shade(ray.direction, material, point, normal, &source);
            }
        }

        let weight = local_weight(reflectivity, refractivity);
        if weight > 0.0 {
            for light in self.scene.lights() {
                let source = LightSource::from(light);
                let (to_light, distance) = source.incidence(point);
                if distance == 0.0 {
                    continue;
                }

                let shadow = Ray::new(point, to_light);
                if self
                    .scene
                    .nearest_hit(&shadow, Some(hit.index), distance)
                    .is_some()
                {
                    continue;
                }

                let lit = self.direct_shade(ray.direction, material, point, normal, &source);
                color += lit * weight;
            }
        }

        Ok(Shade::lit(color))
    }

    /// Diffuse plus specular response of `material` to one light source,
    /// attenuated by distance and spotlight cone.
    ///
    /// # Arguments
    /// * `view_direction` - Direction of the ray that hit the surface
    /// * `material` - Material of the hit primitive
    /// * `point` - The hit point
    /// * `normal` - Unit surface normal at the hit point
    /// * `source` - The light being evaluated
    pub fn direct_shade(
        &self,
        view_direction: Vec3,
        material: &Material,
        point: Vec3,
        normal: Vec3,
        source: &LightSource,
    ) -> Color {
        let (to_light, distance) = source.incidence(point);
        let light_color = source.color();
        let reflected = (-to_light).reflect(normal);
        let to_viewer = -view_direction;

        let diffuse = diffuse(normal, to_light, light_color, material.diffuse_color);
        let specular = specular(
            self.settings.shininess,
            to_light,
            reflected,
            normal,
            to_viewer,
            material.specular_color,
            light_color,
        );

        let falloff = match source {
            LightSource::Indirect { .. } => 1.0,
            LightSource::Point(light) => radial_attenuation(&light.radial, distance),
            LightSource::Spot(light) => {
                angular_attenuation(source, -to_light) * radial_attenuation(&light.radial, distance)
            }
        };

        (diffuse + specular) * falloff
    }

    /// Traces a ray and shades whatever it hits first. A miss paints the
    /// background.
    fn sample(&self, ray: &Ray, medium: Medium, depth: u32) -> Result<Color, RenderError> {
        match self.scene.nearest_hit(ray, None, f32::INFINITY) {
            Some(hit) => Ok(self.shade(ray, &hit, medium, depth)?.color),
            None => Ok(self.settings.background),
        }
    }
}

//! Closed-form ray/primitive intersection tests.
//!
//! Every test returns the smallest positive distance along the ray, or `None`
//! when the ray misses. A miss is an ordinary outcome, never an error.
//!
//! The nearest-hit query is a brute-force scan over every object. Scenes are
//! capped at a few hundred objects, so there is no acceleration structure.

use crate::math::Vec3;
use crate::ray::Ray;
use crate::scene::{Scene, SceneObject};

/// Below this `|n·d|` a ray is treated as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 0.0001;

/// A sphere hit, with whether the ray started inside the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereHit {
    pub t: f32,
    /// Only the far root was positive: the ray origin is inside the sphere.
    pub inside: bool,
}

/// The nearest hit of a scene query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Index into [`Scene::objects`].
    pub index: usize,
    pub t: f32,
    pub inside: bool,
}

/// Ray/plane test. Reports no hit for near-parallel rays and for planes behind
/// the origin.
pub fn plane_intersect(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    let normal = normal.normalize();
    let vd = normal.dot(ray.direction);
    if vd.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (point - ray.origin).dot(normal) / vd;
    if t < 0.0 {
        return None;
    }
    Some(t)
}

/// Ray/sphere test, solving `|o + t·d - c|² = r²` for a unit `d`.
///
/// Takes the near root when it is positive. Otherwise the far root is used and
/// the hit is flagged as starting inside the sphere.
pub fn sphere_intersect(ray: &Ray, center: Vec3, radius: f32) -> Option<SphereHit> {
    let oc = ray.origin - center;
    let b = 2.0 * ray.direction.dot(oc);
    let c = oc.magnitude_squared() - radius * radius;

    let disc = b * b - 4.0 * c;
    if disc < 0.0 {
        return None;
    }
    let disc = disc.sqrt();

    let near = (-b - disc) / 2.0;
    if near > 0.0 {
        return Some(SphereHit {
            t: near,
            inside: false,
        });
    }

    let far = (-b + disc) / 2.0;
    if far < 0.0 {
        return None;
    }
    Some(SphereHit {
        t: far,
        inside: true,
    })
}

/// Intersects a single scene object. The camera is never hit.
pub fn intersect_object(ray: &Ray, object: &SceneObject) -> Option<SphereHit> {
    match object {
        SceneObject::Camera(_) => None,
        SceneObject::Sphere(sphere) => sphere_intersect(ray, sphere.center, sphere.radius),
        SceneObject::Plane(plane) => {
            plane_intersect(ray, plane.point, plane.normal).map(|t| SphereHit {
                t,
                inside: false,
            })
        }
    }
}

impl Scene {
    /// Finds the closest object along `ray`.
    ///
    /// `exclude` skips the surface the ray is leaving. Hits farther than
    /// `max_distance` are ignored; pass `f32::INFINITY` for an unbounded query.
    pub fn nearest_hit(&self, ray: &Ray, exclude: Option<usize>, max_distance: f32) -> Option<Hit> {
        let mut best: Option<Hit> = None;

        for (index, object) in self.objects().iter().enumerate() {
            if exclude == Some(index) {
                continue;
            }
            let Some(hit) = intersect_object(ray, object) else {
                continue;
            };
            if hit.t <= 0.0 || hit.t > max_distance {
                continue;
            }
            if best.map_or(true, |b| hit.t < b.t) {
                best = Some(Hit {
                    index,
                    t: hit.t,
                    inside: hit.inside,
                });
            }
        }

        best
    }
}

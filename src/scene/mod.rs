//! The scene model: camera, primitives, and lights.
//!
//! A [`Scene`] is built once, either by [`Scene::from_json`] / [`Scene::load`]
//! or programmatically, and is only ever read while rendering. Objects keep
//! the order they were declared in; intersection reports hits by index into
//! [`Scene::objects`].

pub mod parse;

use std::path::Path;

use crate::color::Color;
use crate::light::Light;
use crate::math::Vec3;

pub use parse::{SceneError, MAX_LIGHTS, MAX_OBJECTS};

/// The view plane dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Optical properties shared by every primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub diffuse_color: Color,
    pub specular_color: Color,
    /// Weight of the mirror sample. Negative means unset.
    pub reflectivity: f32,
    /// Weight of the transmitted sample. Negative means unset.
    pub refractivity: f32,
    /// Index of refraction. Zero means unset.
    pub ior: f32,
}

impl Material {
    /// Value used for unset reflectivity/refractivity.
    pub const UNSET: f32 = -1.0;

    /// An opaque material with no mirror or transmitted component.
    pub fn new(diffuse_color: Color, specular_color: Color) -> Self {
        Self {
            diffuse_color,
            specular_color,
            reflectivity: Self::UNSET,
            refractivity: Self::UNSET,
            ior: 0.0,
        }
    }

    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_refractivity(mut self, refractivity: f32) -> Self {
        self.refractivity = refractivity;
        self
    }

    pub fn with_ior(mut self, ior: f32) -> Self {
        self.ior = ior;
        self
    }

    /// Reflectivity with "unset" mapped to 0.
    pub fn reflection(&self) -> f32 {
        self.reflectivity.max(0.0)
    }

    /// Refractivity with "unset" mapped to 0.
    pub fn refraction(&self) -> f32 {
        self.refractivity.max(0.0)
    }

    /// Index of refraction with "unset" mapped to 1 (air).
    pub fn index_of_refraction(&self) -> f32 {
        if self.ior == 0.0 {
            1.0
        } else {
            self.ior
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    /// Unit normal.
    pub normal: Vec3,
    pub material: Material,
}

impl Plane {
    /// Create a plane. The normal is normalized automatically.
    pub fn new(point: Vec3, normal: Vec3, material: Material) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
        }
    }
}

/// One entry of the scene's object list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneObject {
    Camera(Camera),
    Sphere(Sphere),
    Plane(Plane),
}

impl SceneObject {
    pub fn kind(&self) -> &'static str {
        match self {
            SceneObject::Camera(_) => "camera",
            SceneObject::Sphere(_) => "sphere",
            SceneObject::Plane(_) => "plane",
        }
    }

    /// The renderable view of this object, or `None` for the camera.
    pub fn as_primitive(&self) -> Option<Primitive<'_>> {
        match self {
            SceneObject::Camera(_) => None,
            SceneObject::Sphere(sphere) => Some(Primitive::Sphere(sphere)),
            SceneObject::Plane(plane) => Some(Primitive::Plane(plane)),
        }
    }
}

impl From<Camera> for SceneObject {
    fn from(camera: Camera) -> Self {
        SceneObject::Camera(camera)
    }
}

impl From<Sphere> for SceneObject {
    fn from(sphere: Sphere) -> Self {
        SceneObject::Sphere(sphere)
    }
}

impl From<Plane> for SceneObject {
    fn from(plane: Plane) -> Self {
        SceneObject::Plane(plane)
    }
}

/// A borrowed surface that can be shaded.
#[derive(Clone, Copy, Debug)]
pub enum Primitive<'a> {
    Sphere(&'a Sphere),
    Plane(&'a Plane),
}

impl Primitive<'_> {
    pub fn material(&self) -> &Material {
        match self {
            Primitive::Sphere(sphere) => &sphere.material,
            Primitive::Plane(plane) => &plane.material,
        }
    }

    /// Unit surface normal at `point`. Planes have a fixed normal.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(sphere) => sphere.normal_at(point),
            Primitive::Plane(plane) => plane.normal,
        }
    }
}

/// An immutable scene snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new(objects: Vec<SceneObject>, lights: Vec<Light>) -> Self {
        Self { objects, lights }
    }

    /// Parses a scene description.
    pub fn from_json(source: &str) -> Result<Self, SceneError> {
        parse::parse_scene(source)
    }

    /// Reads and parses a scene description file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Adds an object, returning the scene for chaining.
    pub fn with_object(mut self, object: impl Into<SceneObject>) -> Self {
        self.objects.push(object.into());
        self
    }

    /// Adds a light, returning the scene for chaining.
    pub fn with_light(mut self, light: impl Into<Light>) -> Self {
        self.lights.push(light.into());
        self
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The first camera in declaration order.
    pub fn camera(&self) -> Option<&Camera> {
        self.objects.iter().find_map(|object| match object {
            SceneObject::Camera(camera) => Some(camera),
            _ => None,
        })
    }

    /// Number of shadeable objects (everything except the camera).
    pub fn primitive_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| object.as_primitive().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matte() -> Material {
        Material::new(Color::new(1.0, 0.0, 0.0), Color::WHITE)
    }

    #[test]
    fn unset_material_coefficients() {
        let material = matte();
        assert_eq!(material.reflection(), 0.0);
        assert_eq!(material.refraction(), 0.0);
        assert_eq!(material.index_of_refraction(), 1.0);

        let glass = material.with_refractivity(0.8).with_ior(1.5);
        assert_eq!(glass.refraction(), 0.8);
        assert_eq!(glass.index_of_refraction(), 1.5);
    }

    #[test]
    fn camera_is_found_by_scan() {
        let scene = Scene::default()
            .with_object(Sphere::new(Vec3::FORWARD, 1.0, matte()))
            .with_object(Camera::new(2.0, 1.5));
        assert_eq!(scene.camera(), Some(&Camera::new(2.0, 1.5)));
        assert_eq!(scene.primitive_count(), 1);
    }

    #[test]
    fn camera_is_not_a_primitive() {
        let camera = SceneObject::from(Camera::new(1.0, 1.0));
        assert!(camera.as_primitive().is_none());
        assert_eq!(camera.kind(), "camera");
    }

    #[test]
    fn plane_normal_is_normalized() {
        let plane = Plane::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0), matte());
        assert_eq!(plane.normal, Vec3::UP);
        let primitive = Primitive::Plane(&plane);
        assert_eq!(primitive.normal_at(Vec3::new(5.0, 0.0, 2.0)), Vec3::UP);
    }

    #[test]
    fn sphere_normal_points_outward() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 5.0), 2.0, matte());
        let normal = sphere.normal_at(Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(normal, Vec3::BACK);
    }
}

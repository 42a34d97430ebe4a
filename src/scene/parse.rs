//! Scene description parsing.
//!
//! The input is a JSON list of objects, each tagged with a `"type"`:
//!
//! ```text
//! [
//!   { "type": "camera", "width": 2.0, "height": 2.0 },
//!   { "type": "sphere", "diffuse_color": [1, 0, 0], "specular_color": [1, 1, 1],
//!     "position": [0, 1, 5], "radius": 2, "reflectivity": 0.3 },
//!   { "type": "plane", "diffuse_color": [0, 0, 1], "specular_color": [0, 0, 0],
//!     "position": [0, -1, 0], "normal": [0, 1, 0] },
//!   { "type": "light", "color": [2, 2, 2], "position": [1, 20, 0],
//!     "radial-a2": 0.125, "radial-a1": 0.125, "radial-a0": 0.125 }
//! ]
//! ```
//!
//! A light with a `theta` above zero is a spotlight and must also have a
//! `direction`; without a positive `theta` any `direction` is ignored. `theta`
//! is the cone half-angle in degrees. Every key is checked against the
//! object's type and every number against its allowed range.

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Camera, Material, Plane, Scene, SceneObject, Sphere};
use crate::color::Color;
use crate::light::{Light, PointLight, RadialAttenuation, SpotLight};
use crate::math::Vec3;

/// Maximum number of non-light objects (camera included).
pub const MAX_OBJECTS: usize = 128;
/// Maximum number of lights.
pub const MAX_LIGHTS: usize = 128;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene description: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("scene description must be a list of objects")]
    NotAList,

    #[error("scene description is empty")]
    Empty,

    #[error("too many {what} in scene: {count} (max {max})")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("entry {index}: expected an object")]
    NotAnObject { index: usize },

    #[error("entry {index}: missing 'type'")]
    MissingType { index: usize },

    #[error("entry {index}: unknown type '{kind}'")]
    UnknownType { index: usize, kind: String },

    #[error("entry {index} ({kind}): missing required field '{field}'")]
    MissingField {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("entry {index} ({kind}): field '{field}' {reason}")]
    InvalidField {
        index: usize,
        kind: &'static str,
        field: String,
        reason: String,
    },

    #[error("entry {index} ({kind}): '{field}' cannot be set on this type")]
    UnexpectedField {
        index: usize,
        kind: &'static str,
        field: String,
    },
}

type Result<T> = std::result::Result<T, SceneError>;

/// Parses a scene description into a validated [`Scene`].
pub fn parse_scene(source: &str) -> Result<Scene> {
    let root: Value = serde_json::from_str(source)?;
    let entries = root.as_array().ok_or(SceneError::NotAList)?;
    if entries.is_empty() {
        return Err(SceneError::Empty);
    }

    let mut objects = Vec::new();
    let mut lights = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let fields = entry
            .as_object()
            .ok_or(SceneError::NotAnObject { index })?;
        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(SceneError::MissingType { index })?;

        match kind {
            "camera" => objects.push(SceneObject::Camera(parse_camera(index, fields)?)),
            "sphere" => objects.push(SceneObject::Sphere(parse_sphere(index, fields)?)),
            "plane" => objects.push(SceneObject::Plane(parse_plane(index, fields)?)),
            "light" => lights.push(parse_light(index, fields)?),
            other => {
                return Err(SceneError::UnknownType {
                    index,
                    kind: other.to_string(),
                })
            }
        }

        if objects.len() > MAX_OBJECTS {
            return Err(SceneError::TooMany {
                what: "objects",
                count: objects.len(),
                max: MAX_OBJECTS,
            });
        }
        if lights.len() > MAX_LIGHTS {
            return Err(SceneError::TooMany {
                what: "lights",
                count: lights.len(),
                max: MAX_LIGHTS,
            });
        }
    }

    tracing::debug!(
        objects = objects.len(),
        lights = lights.len(),
        "parsed scene description"
    );

    Ok(Scene::new(objects, lights))
}

fn parse_camera(index: usize, fields: &Map<String, Value>) -> Result<Camera> {
    let reader = FieldReader::new(index, "camera", fields, &["width", "height"])?;
    let width = reader.required(FieldReader::positive, "width")?;
    let height = reader.required(FieldReader::positive, "height")?;
    Ok(Camera::new(width, height))
}

const SPHERE_FIELDS: &[&str] = &[
    "diffuse_color",
    "specular_color",
    "position",
    "radius",
    "reflectivity",
    "refractivity",
    "ior",
];

const PLANE_FIELDS: &[&str] = &[
    "diffuse_color",
    "specular_color",
    "position",
    "normal",
    "reflectivity",
    "refractivity",
    "ior",
];

const LIGHT_FIELDS: &[&str] = &[
    "color",
    "position",
    "direction",
    "theta",
    "radial-a0",
    "radial-a1",
    "radial-a2",
    "angular-a0",
];

fn parse_sphere(index: usize, fields: &Map<String, Value>) -> Result<Sphere> {
    let reader = FieldReader::new(index, "sphere", fields, SPHERE_FIELDS)?;
    let material = parse_material(&reader)?;
    let center = reader.required(FieldReader::vector, "position")?;
    let radius = reader.required(FieldReader::positive, "radius")?;
    Ok(Sphere::new(center, radius, material))
}

fn parse_plane(index: usize, fields: &Map<String, Value>) -> Result<Plane> {
    let reader = FieldReader::new(index, "plane", fields, PLANE_FIELDS)?;
    let material = parse_material(&reader)?;
    let point = reader.required(FieldReader::vector, "position")?;
    let normal = reader.required(FieldReader::vector, "normal")?;
    if normal.is_zero() {
        return Err(reader.invalid("normal", "must not be the zero vector"));
    }
    Ok(Plane::new(point, normal, material))
}

fn parse_material(reader: &FieldReader) -> Result<Material> {
    let diffuse = reader.required(FieldReader::unit_color, "diffuse_color")?;
    let specular = reader.required(FieldReader::unit_color, "specular_color")?;
    let reflectivity = reader.optional(FieldReader::unit_interval, "reflectivity")?;
    let refractivity = reader.optional(FieldReader::unit_interval, "refractivity")?;
    let ior = reader.optional(FieldReader::non_negative, "ior")?;

    Ok(Material {
        diffuse_color: diffuse,
        specular_color: specular,
        reflectivity: reflectivity.unwrap_or(Material::UNSET),
        refractivity: refractivity.unwrap_or(Material::UNSET),
        ior: ior.unwrap_or(0.0),
    })
}

fn parse_light(index: usize, fields: &Map<String, Value>) -> Result<Light> {
    let reader = FieldReader::new(index, "light", fields, LIGHT_FIELDS)?;
    let color = reader.required(FieldReader::light_color, "color")?;
    let position = reader.required(FieldReader::vector, "position")?;
    let direction = reader.optional(FieldReader::vector, "direction")?;
    let theta = reader.optional(FieldReader::non_negative, "theta")?;
    let angular = reader
        .optional(FieldReader::non_negative, "angular-a0")?
        .unwrap_or(0.0);

    let radial = RadialAttenuation::new(
        reader.optional(FieldReader::non_negative, "radial-a0")?.unwrap_or(0.0),
        reader.optional(FieldReader::non_negative, "radial-a1")?.unwrap_or(0.0),
        reader.optional(FieldReader::non_negative, "radial-a2")?.unwrap_or(0.0),
    );
    if radial.is_degenerate() {
        tracing::warn!(
            entry = index,
            "all radial attenuation coefficients are zero, assuming radial-a2 = 1"
        );
    }

    // Only a positive theta makes a spotlight; a lone direction is ignored
    let theta = match theta {
        Some(theta) if theta > 0.0 => theta,
        _ => return Ok(Light::Point(PointLight::new(color, position, radial))),
    };

    let direction = direction.ok_or(SceneError::MissingField {
        index,
        kind: "light",
        field: "direction",
    })?;
    if direction.is_zero() {
        return Err(reader.invalid("direction", "must not be the zero vector"));
    }

    Ok(Light::Spot(SpotLight::from_degrees(
        color, position, direction, theta, angular, radial,
    )))
}

/// Typed, range-checked access to one scene entry's fields.
struct FieldReader<'a> {
    index: usize,
    kind: &'static str,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    /// Rejects any key not in `allowed` (besides `type`).
    fn new(
        index: usize,
        kind: &'static str,
        fields: &'a Map<String, Value>,
        allowed: &[&str],
    ) -> Result<Self> {
        if let Some(key) = fields
            .keys()
            .find(|key| key.as_str() != "type" && !allowed.contains(&key.as_str()))
        {
            return Err(SceneError::UnexpectedField {
                index,
                kind,
                field: key.clone(),
            });
        }
        Ok(Self {
            index,
            kind,
            fields,
        })
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> SceneError {
        SceneError::InvalidField {
            index: self.index,
            kind: self.kind,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn required<T>(
        &self,
        read: fn(&Self, &str, &Value) -> Result<T>,
        field: &'static str,
    ) -> Result<T> {
        self.optional(read, field)?
            .ok_or(SceneError::MissingField {
                index: self.index,
                kind: self.kind,
                field,
            })
    }

    fn optional<T>(
        &self,
        read: fn(&Self, &str, &Value) -> Result<T>,
        field: &str,
    ) -> Result<Option<T>> {
        self.fields
            .get(field)
            .map(|value| read(self, field, value))
            .transpose()
    }

    fn number(&self, field: &str, value: &Value) -> Result<f32> {
        value
            .as_f64()
            .map(|n| n as f32)
            .ok_or_else(|| self.invalid(field, "must be a number"))
    }

    fn positive(&self, field: &str, value: &Value) -> Result<f32> {
        let n = self.number(field, value)?;
        if n <= 0.0 {
            return Err(self.invalid(field, format!("must be positive, got {n}")));
        }
        Ok(n)
    }

    fn non_negative(&self, field: &str, value: &Value) -> Result<f32> {
        let n = self.number(field, value)?;
        if n < 0.0 {
            return Err(self.invalid(field, format!("must be >= 0, got {n}")));
        }
        Ok(n)
    }

    fn unit_interval(&self, field: &str, value: &Value) -> Result<f32> {
        let n = self.number(field, value)?;
        if !(0.0..=1.0).contains(&n) {
            return Err(self.invalid(field, format!("must be within [0, 1], got {n}")));
        }
        Ok(n)
    }

    fn triple(&self, field: &str, value: &Value) -> Result<[f32; 3]> {
        let items = value
            .as_array()
            .filter(|items| items.len() == 3)
            .ok_or_else(|| self.invalid(field, "must be a list of 3 numbers"))?;
        Ok([
            self.number(field, &items[0])?,
            self.number(field, &items[1])?,
            self.number(field, &items[2])?,
        ])
    }

    fn vector(&self, field: &str, value: &Value) -> Result<Vec3> {
        self.triple(field, value).map(Vec3::from_array)
    }

    /// Material colors: every channel within `[0, 1]`.
    fn unit_color(&self, field: &str, value: &Value) -> Result<Color> {
        let c = self.triple(field, value)?;
        if c.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(self.invalid(field, "rgb value out of range [0, 1]"));
        }
        Ok(Color::from_array(c))
    }

    /// Light colors: any non-negative intensity.
    fn light_color(&self, field: &str, value: &Value) -> Result<Color> {
        let c = self.triple(field, value)?;
        if c.iter().any(|v| *v < 0.0) {
            return Err(self.invalid(field, "light value must be >= 0"));
        }
        Ok(Color::from_array(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BASIC: &str = r#"[
        {"type": "camera", "width": 2.0, "height": 2.0},
        {"type": "sphere", "diffuse_color": [1, 0, 0], "specular_color": [1, 1, 1],
         "position": [0, 1, 5], "radius": 2, "reflectivity": 0.25},
        {"type": "plane", "diffuse_color": [0, 0, 1], "specular_color": [0, 0, 0],
         "position": [0, -1, 0], "normal": [0, 2, 0], "refractivity": 0.5, "ior": 1.33},
        {"type": "light", "color": [2, 2, 2], "position": [1, 20, 0],
         "radial-a2": 0.125, "radial-a1": 0.125, "radial-a0": 0.125},
        {"type": "light", "color": [2, 0, 0], "position": [0, 10, 5],
         "direction": [0, -1, 0], "theta": 30, "angular-a0": 2}
    ]"#;

    #[test]
    fn parses_a_complete_scene() {
        let scene = parse_scene(BASIC).unwrap();
        assert_eq!(scene.objects().len(), 3);
        assert_eq!(scene.lights().len(), 2);
        assert_eq!(scene.camera(), Some(&Camera::new(2.0, 2.0)));

        let SceneObject::Sphere(sphere) = scene.objects()[1] else {
            panic!("expected a sphere");
        };
        assert_eq!(sphere.radius, 2.0);
        assert_eq!(sphere.material.reflection(), 0.25);
        assert_eq!(sphere.material.refraction(), 0.0);

        let SceneObject::Plane(plane) = scene.objects()[2] else {
            panic!("expected a plane");
        };
        assert_eq!(plane.normal, Vec3::UP);
        assert_relative_eq!(plane.material.index_of_refraction(), 1.33);

        assert!(matches!(scene.lights()[0], Light::Point(_)));
        let Light::Spot(spot) = scene.lights()[1] else {
            panic!("expected a spotlight");
        };
        assert_relative_eq!(spot.half_angle, 30f32.to_radians(), epsilon = 1e-6);
        assert_eq!(spot.angular_falloff, 2.0);
    }

    #[test]
    fn rejects_empty_list() {
        assert!(matches!(parse_scene("[]"), Err(SceneError::Empty)));
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(matches!(
            parse_scene(r#"[{"type": "camera", "width": 2,"#),
            Err(SceneError::Syntax(_))
        ));
        assert!(matches!(parse_scene("{}"), Err(SceneError::NotAList)));
    }

    #[test]
    fn rejects_missing_colors() {
        let err = parse_scene(
            r#"[{"type": "sphere", "specular_color": [1, 1, 1],
                 "position": [0, 0, 1], "radius": 1}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SceneError::MissingField {
                field: "diffuse_color",
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let color = parse_scene(
            r#"[{"type": "plane", "diffuse_color": [1.5, 0, 0], "specular_color": [0, 0, 0],
                 "position": [0, 0, 0], "normal": [0, 1, 0]}]"#,
        );
        assert!(matches!(color, Err(SceneError::InvalidField { .. })));

        let radius = parse_scene(
            r#"[{"type": "sphere", "diffuse_color": [1, 0, 0], "specular_color": [0, 0, 0],
                 "position": [0, 0, 0], "radius": -1}]"#,
        );
        assert!(matches!(radius, Err(SceneError::InvalidField { .. })));

        let width = parse_scene(r#"[{"type": "camera", "width": 0, "height": 1}]"#);
        assert!(matches!(width, Err(SceneError::InvalidField { .. })));

        let light =
            parse_scene(r#"[{"type": "light", "color": [-1, 0, 0], "position": [0, 0, 0]}]"#);
        assert!(matches!(light, Err(SceneError::InvalidField { .. })));
    }

    #[test]
    fn rejects_fields_on_wrong_type() {
        let err = parse_scene(r#"[{"type": "camera", "width": 1, "height": 1, "radius": 2}]"#)
            .unwrap_err();
        assert!(matches!(err, SceneError::UnexpectedField { ref field, .. } if field == "radius"));
    }

    #[test]
    fn rejects_unknown_types() {
        let err = parse_scene(r#"[{"type": "cube"}]"#).unwrap_err();
        assert!(matches!(err, SceneError::UnknownType { .. }));
        let err = parse_scene(r#"[{"width": 1}]"#).unwrap_err();
        assert!(matches!(err, SceneError::MissingType { index: 0 }));
    }

    #[test]
    fn spotlight_requires_direction() {
        let no_direction = parse_scene(
            r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 0, 0], "theta": 20}]"#,
        );
        assert!(matches!(
            no_direction,
            Err(SceneError::MissingField {
                field: "direction",
                ..
            })
        ));

        let zero_direction = parse_scene(
            r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 0, 0],
                 "direction": [0, 0, 0], "theta": 20}]"#,
        );
        assert!(matches!(zero_direction, Err(SceneError::InvalidField { .. })));
    }

    #[test]
    fn direction_without_theta_is_a_point_light() {
        let scene = parse_scene(
            r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 0, 0],
                 "direction": [0, -1, 0], "radial-a0": 1}]"#,
        )
        .unwrap();
        assert!(matches!(scene.lights()[0], Light::Point(_)));
    }

    #[test]
    fn wide_spotlight_cones_are_accepted() {
        let scene = parse_scene(
            r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 0, 0],
                 "direction": [0, -1, 0], "theta": 120}]"#,
        )
        .unwrap();
        let Light::Spot(spot) = scene.lights()[0] else {
            panic!("expected a spotlight");
        };
        assert_relative_eq!(spot.half_angle, 120f32.to_radians(), epsilon = 1e-6);
    }

    #[test]
    fn zero_theta_without_direction_is_a_point_light() {
        let scene = parse_scene(
            r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 0, 0], "theta": 0}]"#,
        )
        .unwrap();
        assert!(matches!(scene.lights()[0], Light::Point(_)));
    }

    #[test]
    fn degenerate_attenuation_is_accepted() {
        let scene =
            parse_scene(r#"[{"type": "light", "color": [1, 1, 1], "position": [0, 5, 0]}]"#)
                .unwrap();
        assert!(scene.lights()[0].radial().is_degenerate());
    }

    #[test]
    fn enforces_object_capacity() {
        let sphere = r#"{"type": "sphere", "diffuse_color": [1, 0, 0], "specular_color": [0, 0, 0],
                         "position": [0, 0, 5], "radius": 1}"#;
        let source = format!("[{}]", vec![sphere; MAX_OBJECTS + 1].join(","));
        assert!(matches!(
            parse_scene(&source),
            Err(SceneError::TooMany {
                what: "objects",
                ..
            })
        ));

        let source = format!("[{}]", vec![sphere; MAX_OBJECTS].join(","));
        assert_eq!(parse_scene(&source).unwrap().objects().len(), MAX_OBJECTS);
    }
}

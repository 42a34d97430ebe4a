//! Vector math used by the intersection and shading code.

pub mod vec3;

pub use vec3::Vec3;

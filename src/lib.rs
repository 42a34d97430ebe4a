//! A recursive CPU ray tracer.
//!
//! Scenes of spheres and planes, lit by point lights and spotlights, are
//! rendered one primary ray per pixel. Surfaces can mirror and transmit
//! light, and lights cast hard shadows. Results are written as PPM pixmaps.
//!
//! # Quick Start
//!
//! ```ignore
//! use raytrace::prelude::*;
//!
//! let scene = Scene::load("scenes/spheres.json")?;
//! let grid = render(&scene, 640, 480)?;
//! ppm::save("out.ppm", &grid, PpmFormat::Binary)?;
//! ```

pub mod color;
pub mod illumination;
pub mod intersect;
pub mod light;
pub mod math;
pub mod ppm;
pub mod ray;
pub mod render;
pub mod scene;
pub mod shading;

// Re-export commonly needed types at crate root for convenience
pub use color::{Color, Rgb8};
pub use ppm::{PpmError, PpmFormat};
pub use render::{
    render, render_parallel_with, render_with, PixelGrid, RenderError, RenderSettings,
    MAX_RECURSION,
};
pub use scene::{Scene, SceneError};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use raytrace::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::light::{Light, PointLight, RadialAttenuation, SpotLight};
    pub use crate::scene::{Camera, Material, Plane, Scene, SceneObject, Sphere};

    // Rendering
    pub use crate::color::{Color, Rgb8};
    pub use crate::render::{
        render, render_parallel_with, render_with, PixelGrid, RenderError, RenderSettings,
    };

    // Output
    pub use crate::ppm::{self, PpmFormat};

    // Math
    pub use crate::math::Vec3;
}

//! The raster driver: one primary ray per pixel through the view plane.
//!
//! The camera sits at the origin looking down `+z`. The view plane is the
//! `camera.width × camera.height` rectangle centered on the `z = 1` axis, and
//! each pixel is sampled at its center. Row 0 is the top of the image.
//!
//! [`render_pixel`] is a pure function of the scene and the pixel coordinates,
//! so [`render_parallel_with`] can split rows across threads and still produce
//! exactly the same bytes as [`render_with`].

mod grid;

pub use grid::PixelGrid;

use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::color::{Color, Rgb8};
use crate::illumination::SHININESS;
use crate::math::Vec3;
use crate::ray::Ray;
use crate::scene::{Camera, Scene};
use crate::shading::Tracer;

/// Default recursion limit for reflected and refracted rays.
pub const MAX_RECURSION: u32 = 7;

/// Distance from the eye to the view plane.
const VIEW_PLANE_Z: f32 = 1.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("scene has no camera")]
    MissingCamera,

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("object {index} ({kind}) cannot be shaded")]
    UnsupportedObject { index: usize, kind: &'static str },
}

/// Tunable render parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Color of rays that escape the scene.
    pub background: Color,
    /// Deepest secondary bounce that is still shaded.
    pub max_depth: u32,
    /// Phong exponent.
    pub shininess: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            max_depth: MAX_RECURSION,
            shininess: SHININESS,
        }
    }
}

/// Render with [`RenderSettings::default`].
pub fn render(scene: &Scene, width: u32, height: u32) -> Result<PixelGrid, RenderError> {
    render_with(scene, width, height, &RenderSettings::default())
}

/// Render the scene into a `width × height` grid, one row after another.
///
/// # Errors
/// - [`RenderError::InvalidDimensions`] if either dimension is zero
/// - [`RenderError::MissingCamera`] if the scene declares no camera
/// - [`RenderError::UnsupportedObject`] if shading reaches a non-primitive
pub fn render_with(
    scene: &Scene,
    width: u32,
    height: u32,
    settings: &RenderSettings,
) -> Result<PixelGrid, RenderError> {
    let camera = prepare(scene, width, height)?;
    let tracer = Tracer::new(scene, settings);
    let start = Instant::now();

    let mut grid = PixelGrid::new(width, height);
    for row in 0..height {
        for col in 0..width {
            let pixel = render_pixel(&tracer, camera, row, col, width, height)?;
            grid.set(col, row, pixel);
        }
    }

    debug!(width, height, elapsed = ?start.elapsed(), "rendered scene");
    Ok(grid)
}

/// Same as [`render_with`], with rows rendered in parallel on the rayon pool.
pub fn render_parallel_with(
    scene: &Scene,
    width: u32,
    height: u32,
    settings: &RenderSettings,
) -> Result<PixelGrid, RenderError> {
    let camera = prepare(scene, width, height)?;
    let tracer = Tracer::new(scene, settings);
    let start = Instant::now();

    let rows = (0..height)
        .into_par_iter()
        .map(|row| {
            (0..width)
                .map(|col| render_pixel(&tracer, camera, row, col, width, height))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pixels = rows.into_iter().flatten().collect();
    let grid = PixelGrid::from_pixels(pixels, width, height)
        .ok_or(RenderError::InvalidDimensions { width, height })?;

    debug!(width, height, elapsed = ?start.elapsed(), "rendered scene in parallel");
    Ok(grid)
}

/// Shade a single pixel.
pub fn render_pixel(
    tracer: &Tracer<'_>,
    camera: &Camera,
    row: u32,
    col: u32,
    width: u32,
    height: u32,
) -> Result<Rgb8, RenderError> {
    let pixel_width = camera.width / width as f32;
    let pixel_height = camera.height / height as f32;

    // y is flipped so that row 0 is the top of the view plane
    let target = Vec3::new(
        -camera.width / 2.0 + pixel_width * (col as f32 + 0.5),
        camera.height / 2.0 - pixel_height * (row as f32 + 0.5),
        VIEW_PLANE_Z,
    );

    let ray = Ray::new(Vec3::ZERO, target);
    Ok(tracer.trace(&ray)?.to_rgb8())
}

fn prepare(scene: &Scene, width: u32, height: u32) -> Result<&Camera, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    let camera = scene.camera().ok_or(RenderError::MissingCamera)?;
    debug!(
        objects = scene.objects().len(),
        lights = scene.lights().len(),
        "starting render"
    );
    Ok(camera)
}

//! Per-instance transform and color composition
//!
//! Pure, deterministic functions of `(instance index, frame angles)`. The
//! whole population orbits a shared pivot while each instance scatters
//! along a sine wave and tumbles around its own Y and Z axes.
//!
//! Transform composition (applied right to left):
//!
//! ```text
//! orbit * translate(pivot + offset(i)) * rotate_y(spin) * rotate_z(spin) * scale
//! ```
//!
//! where `orbit = translate(pivot) * rotate_y(-spin) * translate(-pivot)`.

use std::f32::consts::TAU;

use crate::foundation::math::{rotate_y, rotate_z, scale, translate, Mat4, Vec3, Vec4};
use crate::render::animation::FrameAngles;
use crate::render::data::InstanceData;

/// Uniform scale applied to every instance
pub const INSTANCE_SCALE: f32 = 0.1;

/// Pivot the population orbits around, in view space
#[must_use]
pub fn orbit_pivot() -> Vec3 {
    Vec3::new(0.0, 0.0, -5.0)
}

/// Composes the full instance population for one frame's angles
#[derive(Debug)]
pub struct InstanceComposer {
    population: usize,
    angles: FrameAngles,
    orbit: Mat4,
}

impl InstanceComposer {
    /// Set up composition for one frame
    #[must_use]
    pub fn new(population: usize, angles: FrameAngles) -> Self {
        let pivot = orbit_pivot();
        let orbit = translate(pivot) * rotate_y(-angles.spin) * translate(-pivot);
        Self {
            population,
            angles,
            orbit,
        }
    }

    /// Scatter offset of instance `index` relative to the pivot
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn offset(&self, index: usize) -> Vec3 {
        let fraction = index as f32 / self.population as f32;
        let xoff = fraction.mul_add(2.0, -1.0) + 1.0 / self.population as f32;
        let yoff = ((fraction + self.angles.phase) * TAU).sin();
        Vec3::new(xoff, yoff, 0.0)
    }

    /// Object-to-world transform of instance `index`
    #[must_use]
    pub fn transform(&self, index: usize) -> Mat4 {
        let spin = self.angles.spin;
        let position = orbit_pivot() + self.offset(index);
        self.orbit
            * translate(position)
            * rotate_y(spin)
            * rotate_z(spin)
            * scale(Vec3::new(INSTANCE_SCALE, INSTANCE_SCALE, INSTANCE_SCALE))
    }

    /// Color gradient across the population: red ramps up, green is its
    /// complement, blue follows a sinusoid
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn color(&self, index: usize) -> Vec4 {
        let fraction = index as f32 / self.population as f32;
        let r = fraction;
        let g = 1.0 - r;
        let b = (TAU * fraction).sin();
        Vec4::new(r, g, b, 1.0)
    }

    /// Full record for instance `index`
    #[must_use]
    pub fn record(&self, index: usize) -> InstanceData {
        InstanceData {
            transform: self.transform(index),
            color: self.color(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat3;
    use approx::assert_relative_eq;

    const POPULATION: usize = 512;

    fn angles(spin: f32, phase: f32) -> FrameAngles {
        FrameAngles { spin, phase }
    }

    #[test]
    fn test_transform_is_deterministic_and_bit_identical() {
        let a = InstanceComposer::new(POPULATION, angles(1.234, 0.37));
        let b = InstanceComposer::new(POPULATION, angles(1.234, 0.37));
        for index in [0, 1, 63, 255, 511] {
            assert_eq!(a.transform(index), b.transform(index));
            assert_eq!(a.color(index), b.color(index));
        }
    }

    #[test]
    fn test_transform_is_affine_with_uniform_scale() {
        // The upper-left 3x3 must be a rotation times the uniform scale:
        // its transpose-product is scale² on the diagonal.
        let composer = InstanceComposer::new(POPULATION, angles(0.81, 0.12));
        for index in [0, 100, 511] {
            let m = composer.transform(index);
            let ul: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
            let product = ul.transpose() * ul;
            assert_relative_eq!(
                product,
                Mat3::identity() * INSTANCE_SCALE * INSTANCE_SCALE,
                epsilon = 1e-5
            );
            // Bottom row stays (0, 0, 0, 1)
            assert_relative_eq!(m.row(3).transpose().into_owned(),
                crate::foundation::math::Vec4::new(0.0, 0.0, 0.0, 1.0),
                epsilon = 1e-6);
        }
    }

    #[test]
    fn test_offsets_span_the_population_width() {
        let composer = InstanceComposer::new(POPULATION, angles(0.0, 0.0));
        let first = composer.offset(0);
        let last = composer.offset(POPULATION - 1);
        // The x offsets sweep symmetrically across [-1, 1]
        assert!(first.x < -0.99);
        assert!(last.x > 0.99);
        assert_relative_eq!(first.x, -last.x, epsilon = 1e-5);
    }

    #[test]
    fn test_color_gradient_endpoints() {
        let composer = InstanceComposer::new(POPULATION, angles(0.0, 0.0));
        let first = composer.color(0);
        assert_relative_eq!(first.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(first.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(first.w, 1.0, epsilon = 1e-6);

        let mid = composer.color(POPULATION / 2);
        assert_relative_eq!(mid.x, 0.5, epsilon = 1e-3);
        assert_relative_eq!(mid.y, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_wave_phase_moves_instances() {
        let still = InstanceComposer::new(POPULATION, angles(0.0, 0.0));
        let moved = InstanceComposer::new(POPULATION, angles(0.0, 0.25));
        assert!((still.offset(0).y - moved.offset(0).y).abs() > 1e-3);
    }
}

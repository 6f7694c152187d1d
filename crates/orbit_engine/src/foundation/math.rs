//! Math utilities and types
//!
//! Provides the fundamental math types for 3D rendering, plus the transform
//! constructors the frame composer builds instance and camera matrices from.
//! All functions here are deterministic and side-effect free; matrix products
//! compose right-to-left (`perspective * view * model * vertex`).

pub use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// The identity transform
#[must_use]
pub fn identity() -> Mat4 {
    Mat4::identity()
}

/// Translation by `v`
#[must_use]
pub fn translate(v: Vec3) -> Mat4 {
    Mat4::new_translation(&v)
}

/// Non-uniform scale by `v`
#[must_use]
pub fn scale(v: Vec3) -> Mat4 {
    Mat4::new_nonuniform_scaling(&v)
}

/// Rotation of `angle` radians around the X axis
#[must_use]
pub fn rotate_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Mat4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0,   c,  -s, 0.0,
        0.0,   s,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation of `angle` radians around the Y axis
#[must_use]
pub fn rotate_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Mat4::new(
          c, 0.0,   s, 0.0,
        0.0, 1.0, 0.0, 0.0,
         -s, 0.0,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation of `angle` radians around the Z axis
#[must_use]
pub fn rotate_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    #[rustfmt::skip]
    let m = Mat4::new(
          c,  -s, 0.0, 0.0,
          s,   c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Perspective projection with a [0, 1] depth range.
///
/// A point at the center of the near plane maps to NDC depth 0 and a point
/// at the center of the far plane maps to depth 1.
#[must_use]
pub fn perspective(fov_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let ys = 1.0 / (fov_radians * 0.5).tan();
    let xs = ys / aspect;
    let zs = far / (near - far);
    #[rustfmt::skip]
    let m = Mat4::new(
         xs, 0.0, 0.0,       0.0,
        0.0,  ys, 0.0,       0.0,
        0.0, 0.0,  zs, near * zs,
        0.0, 0.0, -1.0,      0.0,
    );
    m
}

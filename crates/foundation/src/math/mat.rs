//! Column-major 4x4 matrix helpers for the render path.
//!
//! CPU math stays in `f64`; matrices handed to the GPU are `f32`
//! (column-major `[[f32; 4]; 4]`, matching WGSL `mat4x4<f32>`).

use super::vec::Vec3;

pub type Mat4 = [[f32; 4]; 4];

pub fn mat4_identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_mul_vec4(m: Mat4, v: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for row in 0..4 {
        out[row] = m[0][row] * v[0] + m[1][row] * v[1] + m[2][row] * v[2] + m[3][row] * v[3];
    }
    out
}

/// Right-handed perspective projection with a `[0, 1]` depth range.
pub fn mat4_perspective_rh(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

/// Right-handed look-at view matrix.
pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

pub fn mat4_rotation_x(angle_rad: f64) -> Mat4 {
    let c = angle_rad.cos() as f32;
    let s = angle_rad.sin() as f32;
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_rotation_y(angle_rad: f64) -> Mat4 {
    let c = angle_rad.cos() as f32;
    let s = angle_rad.sin() as f32;
    [
        [c, 0.0, -s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_scale_uniform(scale: f64) -> Mat4 {
    let s = scale as f32;
    [
        [s, 0.0, 0.0, 0.0],
        [0.0, s, 0.0, 0.0],
        [0.0, 0.0, s, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        mat4_identity, mat4_look_at_rh, mat4_mul, mat4_mul_vec4, mat4_perspective_rh,
        mat4_rotation_x, mat4_rotation_y, mat4_scale_uniform,
    };
    use crate::math::vec::Vec3;

    fn approx(a: [f32; 4], b: [f32; 4], eps: f32) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < eps)
    }

    #[test]
    fn identity_is_neutral() {
        let m = mat4_rotation_y(0.7);
        assert_eq!(mat4_mul(mat4_identity(), m), m);
        assert_eq!(mat4_mul(m, mat4_identity()), m);
    }

    #[test]
    fn rotation_x_quarter_turn() {
        let m = mat4_rotation_x(std::f64::consts::FRAC_PI_2);
        let v = mat4_mul_vec4(m, [0.0, 1.0, 0.0, 1.0]);
        assert!(approx(v, [0.0, 0.0, 1.0, 1.0], 1e-6));
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let m = mat4_rotation_y(std::f64::consts::FRAC_PI_2);
        let v = mat4_mul_vec4(m, [1.0, 0.0, 0.0, 1.0]);
        assert!(approx(v, [0.0, 0.0, -1.0, 1.0], 1e-6));
    }

    #[test]
    fn scale_is_uniform() {
        let m = mat4_scale_uniform(0.75);
        let v = mat4_mul_vec4(m, [1.0, 2.0, -2.0, 1.0]);
        assert!(approx(v, [0.75, 1.5, -1.5, 1.0], 1e-6));
    }

    #[test]
    fn look_at_projects_target_to_view_center() {
        let view = mat4_look_at_rh(
            Vec3::new(0.0, 0.0, 2.5),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let proj = mat4_perspective_rh(1.0, 16.0 / 9.0, 0.1, 10.0);
        let clip = mat4_mul_vec4(mat4_mul(proj, view), [0.0, 0.0, 0.0, 1.0]);
        // Target sits on the view axis: x/y vanish after perspective divide.
        assert!((clip[0] / clip[3]).abs() < 1e-6);
        assert!((clip[1] / clip[3]).abs() < 1e-6);
    }
}

use crate::math::vec::Vec3;

/// Column-major 4x4 matrix, laid out the way WGSL expects a `mat4x4<f32>`.
///
/// `self.0[column][row]`. Projection constructors map view-space depth into
/// the `[0, 1]` clip range used by wgpu.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub fn identity() -> Mat4 {
        Mat4([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4([
            [2.0 / (right - left), 0.0, 0.0, 0.0],
            [0.0, 2.0 / (top - bottom), 0.0, 0.0],
            [0.0, 0.0, 1.0 / (near - far), 0.0],
            [
                (right + left) / (left - right),
                (top + bottom) / (bottom - top),
                near / (near - far),
                1.0,
            ],
        ])
    }

    /// Perspective projection from an off-axis viewing frustum.
    ///
    /// `near` and `far` are positive distances along the view direction.
    pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let width = right - left;
        let height = top - bottom;
        let depth = near - far;

        Mat4([
            [2.0 * near / width, 0.0, 0.0, 0.0],
            [0.0, 2.0 * near / height, 0.0, 0.0],
            [
                (right + left) / width,
                (top + bottom) / height,
                far / depth,
                -1.0,
            ],
            [0.0, 0.0, near * far / depth, 0.0],
        ])
    }

    /// Right-handed view matrix placing the camera at `eye` looking at `center`.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let f = (center - eye).normalize();
        let s = f.cross(&up).normalize();
        let u = s.cross(&f);

        Mat4([
            [s.x(), u.x(), -f.x(), 0.0],
            [s.y(), u.y(), -f.y(), 0.0],
            [s.z(), u.z(), -f.z(), 0.0],
            [-s.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0],
        ])
    }

    /// Returns `self * b`, so `b` is applied to a point first.
    pub fn multiply(&self, b: &Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| b.0[i][k] * self.0[k][j]).sum();
            }
        }
        Mat4(result)
    }

    pub fn transform(&self, p: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| self.0[k][j] * p[k]).sum();
        }
        out
    }
}

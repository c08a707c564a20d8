/// Perspective look-at camera
///
/// The camera is owned by the caller and handed to the renderer every frame.

use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Negate the projection's Y scale (Vulkan clip space points Y down)
    pub flip_y: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::new(0.0, 0.7, 0.0),
            up: Vec3::Y,
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            flip_y: true,
        }
    }
}

impl Camera {
    /// Right-handed look-at view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Right-handed perspective projection with depth in 0..1
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        let mut projection = Mat4::perspective_rh(self.fov_y, aspect_ratio, self.near, self.far);
        if self.flip_y {
            projection.y_axis.y = -projection.y_axis.y;
        }
        projection
    }

    /// `projection * view`
    pub fn view_projection(&self, aspect_ratio: f32) -> Mat4 {
        self.projection_matrix(aspect_ratio) * self.view_matrix()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;

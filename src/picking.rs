use macroquad::camera::Camera3D;
use macroquad::math::{Mat4, Vec2, Vec3, Vec4};
use tilewalk_grid::{Grid, PickHit, Ray, WorldPoint};

use crate::config::CameraSettings;

/// Perspective camera that can both drive macroquad and unproject pointer
/// positions without a live window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl ViewCamera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        ViewCamera {
            position: Vec3::from_array(settings.position),
            target: Vec3::from_array(settings.target),
            up: Vec3::Y,
            fovy: settings.fovy_degrees.to_radians(),
            near: settings.near,
            far: settings.far,
        }
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh_gl(self.fovy, aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, self.target, self.up);
        projection * view
    }

    /// Ray from the near plane through the far plane at `ndc`.
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let inv_vp = self.view_projection(aspect).inverse();

        let near_clip = inv_vp * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_clip = inv_vp * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if near_clip.w.abs() < f32::EPSILON || far_clip.w.abs() < f32::EPSILON {
            return None;
        }
        let near_point = near_clip.truncate() / near_clip.w;
        let far_point = far_clip.truncate() / far_clip.w;

        Ray::through(to_world_point(near_point), to_world_point(far_point))
    }

    /// Projects a world point to NDC. `None` when the point is behind the camera.
    pub fn world_to_ndc(&self, world: Vec3, aspect: f32) -> Option<Vec2> {
        let clip = self.view_projection(aspect) * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }

    /// Pixel position of a world point in a `width` x `height` viewport.
    pub fn world_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let ndc = self.world_to_ndc(world, width / height)?;
        Some(ndc_to_screen(ndc, width, height))
    }

    pub fn to_macroquad(&self, aspect: f32) -> Camera3D {
        Camera3D {
            position: self.position,
            target: self.target,
            up: self.up,
            fovy: self.fovy,
            aspect: Some(aspect),
            ..Default::default()
        }
    }
}

/// Pixel position of an NDC point in a `width` x `height` viewport.
pub fn ndc_to_screen(ndc: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((ndc.x + 1.0) / 2.0 * width, (1.0 - ndc.y) / 2.0 * height)
}

/// Nearest tile under the pointer, if any.
pub fn pick_tile(grid: &Grid, camera: &ViewCamera, ndc: Vec2, aspect: f32, thickness: f32) -> Option<PickHit> {
    let ray = camera.ray_from_ndc(ndc, aspect)?;
    grid.pick_nearest(&ray, thickness)
}

pub fn to_world_point(v: Vec3) -> WorldPoint {
    WorldPoint::new(v.x, v.y, v.z)
}

pub fn to_motion(p: WorldPoint) -> tilewalk_motion::Vec3 {
    tilewalk_motion::Vec3::new(p.x, p.y, p.z)
}

pub fn from_motion(v: tilewalk_motion::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

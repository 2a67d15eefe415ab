//! 3D camera and the screen/world conversions used to place models inside
//! 2D layout boxes.

use nalgebra::{Matrix4, Orthographic3, Perspective3, Point3, Vector3, Vector4};
use trellis_layout::Vector2;

const NEAR_PLANE: f32 = 0.01;
const FAR_PLANE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera3D {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees (perspective) or the view height in
    /// world units (orthographic).
    pub fovy: f32,
    pub projection: Projection,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::y(),
            fovy: 45.0,
            projection: Projection::Perspective,
        }
    }
}

impl Camera3D {
    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Projection matrix for a viewport with the given aspect ratio. The
    /// orthographic branch always uses the fixed clip range.
    pub fn projection_matrix(&self, aspect: f32, far: f32) -> Matrix4<f32> {
        match self.projection {
            Projection::Perspective => {
                Perspective3::new(aspect, self.fovy.to_radians(), NEAR_PLANE, far).to_homogeneous()
            }
            Projection::Orthographic => {
                let top = self.fovy / 2.0;
                let right = top * aspect;
                Orthographic3::new(-right, right, -top, top, NEAR_PLANE, FAR_PLANE).to_homogeneous()
            }
        }
    }

    /// Project a world point to screen pixels. `None` when the point is behind
    /// the camera.
    pub fn project(
        &self,
        point: &Vector3<f32>,
        screen_width: f32,
        screen_height: f32,
    ) -> Option<Vector2> {
        let aspect = screen_width / screen_height.max(1.0);
        let clip = self.projection_matrix(aspect, FAR_PLANE) * self.view() * point.push(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vector2::new(
            (ndc.x + 1.0) / 2.0 * screen_width,
            (1.0 - ndc.y) / 2.0 * screen_height,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
}

fn unproject(ndc: Vector3<f32>, inverse_view_projection: &Matrix4<f32>) -> Vector3<f32> {
    let world: Vector4<f32> = inverse_view_projection * ndc.push(1.0);
    if world.w.abs() <= f32::EPSILON {
        world.xyz()
    } else {
        world.xyz() / world.w
    }
}

/// Ray through a screen point, positioned `z_distance` along the ray so a
/// model placed at `ray.position` appears under the point at that depth.
/// Perspective rays start at the camera, orthographic rays on the near plane.
pub fn screen_to_world(
    position: Vector2,
    camera: &Camera3D,
    screen_width: f32,
    screen_height: f32,
    z_distance: f32,
) -> Ray {
    let width = screen_width.max(1.0);
    let height = screen_height.max(1.0);
    let x = 2.0 * position.x / width - 1.0;
    let y = 1.0 - 2.0 * position.y / height;

    let projection = camera.projection_matrix(width / height, z_distance);
    let inverse = (projection * camera.view()).try_inverse().unwrap_or_else(Matrix4::identity);

    let near = unproject(Vector3::new(x, y, 0.0), &inverse);
    let far = unproject(Vector3::new(x, y, 1.0), &inverse);
    let direction = (far - near).try_normalize(f32::EPSILON).unwrap_or_else(|| -Vector3::z());

    // the unprojected far point drifts with f32 depth precision, so only its
    // direction is used
    let origin = match camera.projection {
        Projection::Perspective => camera.position.coords,
        Projection::Orthographic => near,
    };
    Ray { position: origin + direction * z_distance, direction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_ray_points_forward() {
        let camera = Camera3D::default();
        let ray = screen_to_world(Vector2::new(512.0, 384.0), &camera, 1024.0, 768.0, 140.0);
        assert_relative_eq!(ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
        assert_relative_eq!(ray.position, Vector3::new(0.0, 0.0, -140.0), epsilon = 1e-2);
    }

    #[test]
    fn test_perspective_ray_keeps_distance_from_camera() {
        let camera = Camera3D {
            position: Point3::new(5.0, -3.0, 12.0),
            target: Point3::new(5.0, -3.0, 0.0),
            ..Camera3D::default()
        };
        let ray = screen_to_world(Vector2::new(100.0, 650.0), &camera, 1024.0, 768.0, 140.0);
        assert_relative_eq!((ray.position - camera.position.coords).norm(), 140.0, epsilon = 1e-3);
        assert!(ray.position.x < 5.0 && ray.position.y < -3.0);
    }

    #[test]
    fn test_projected_ray_lands_on_screen_point() {
        let camera = Camera3D {
            position: Point3::new(0.0, 10.0, 20.0),
            target: Point3::origin(),
            ..Camera3D::default()
        };
        let screen = Vector2::new(300.0, 200.0);
        let ray = screen_to_world(screen, &camera, 1024.0, 768.0, 140.0);
        let back = camera.project(&ray.position, 1024.0, 768.0).unwrap();
        assert_relative_eq!(back.x, screen.x, epsilon = 0.5);
        assert_relative_eq!(back.y, screen.y, epsilon = 0.5);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = Camera3D {
            fovy: 100.0,
            projection: Projection::Orthographic,
            ..Camera3D::default()
        };
        let left = screen_to_world(Vector2::new(0.0, 384.0), &camera, 1024.0, 768.0, 140.0);
        let right = screen_to_world(Vector2::new(1024.0, 384.0), &camera, 1024.0, 768.0, 140.0);
        assert_relative_eq!(left.direction, right.direction, epsilon = 1e-4);
        // view height 100 at aspect 4:3 spans x in [-66.7, 66.7]
        assert_relative_eq!(right.position.x - left.position.x, 133.333, epsilon = 1e-2);
    }

    #[test]
    fn test_orthographic_ray_is_placed_from_near_plane() {
        let camera = Camera3D {
            fovy: 100.0,
            projection: Projection::Orthographic,
            ..Camera3D::default()
        };
        let ray = screen_to_world(Vector2::new(0.0, 0.0), &camera, 1024.0, 768.0, 140.0);
        assert_relative_eq!(ray.direction, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-4);
        assert_relative_eq!(
            ray.position,
            Vector3::new(-66.667, 50.0, -(NEAR_PLANE + 140.0)),
            epsilon = 1e-2
        );
    }

    #[test]
    fn test_point_behind_camera_is_not_projected() {
        let camera = Camera3D::default();
        assert!(camera.project(&Vector3::new(0.0, 0.0, 10.0), 800.0, 600.0).is_none());
    }
}

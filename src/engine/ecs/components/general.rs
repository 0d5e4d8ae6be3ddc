use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use specs::{Component, HashMapStorage, NullStorage, VecStorage};
use vulkano::buffer::Subbuffer;

use crate::data_structures::graphics::SurfaceVertex;

#[derive(Component, Debug)]
#[storage(VecStorage)]
pub struct Transform {
    /*
    Coordinate system is right handed, -z forward, y up, x right
    */

    pub pos: Vector3<f32>,
    pub rot: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn transformation_matrix(&self) -> Matrix4<f32> {
        let translate = Matrix4::new_translation(&self.pos);
        let rotation = self.rot.to_homogeneous();
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);

        translate * rotation * scale
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rot * Vector3::new(0.0, 0.0, -1.0)
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rot * Vector3::new(0.0, 1.0, 0.0)
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rot * Vector3::new(1.0, 0.0, 0.0)
    }

    /// Rotates the transform so its forward axis points at the target.
    pub fn look_at(&mut self, target: &Vector3<f32>) {
        let away = self.pos - target;
        if away.norm_squared() <= f32::EPSILON {
            return;
        }
        // face_towards degenerates when the view axis is collinear with up
        let up = if away.cross(&Vector3::y()).norm_squared() <= f32::EPSILON {
            Vector3::z()
        } else {
            Vector3::y()
        };
        // the camera looks down its local -z, so +z has to face away
        self.rot = UnitQuaternion::face_towards(&away, &up);
    }
}

impl Default for Transform {
    fn default() -> Self {
        let default_vec = Vector3::default();
        let default_quat = UnitQuaternion::identity();
        let default_scale = Vector3::new(1.0, 1.0, 1.0);
        Transform { pos: default_vec, rot: default_quat, scale: default_scale }
    }
}

/// A wave surface that can be drawn. The vertices hold world-space
/// positions, the vertex stage has no model matrix.
#[derive(Component)]
#[storage(VecStorage)]
pub struct Renderable {
    pub vertex_buffer: Subbuffer<[SurfaceVertex]>,
    pub index_buffer: Subbuffer<[u32]>,
}

/// Marks a renderable to be drawn with the wireframe pipeline.
#[derive(Component, Default)]
#[storage(NullStorage)]
pub struct Wireframe;

#[derive(Component, Debug)]
#[storage(HashMapStorage)]
pub struct Camera;

/// Circles the entity around the world origin, always facing it.
#[derive(Component, Debug)]
#[storage(HashMapStorage)]
pub struct Orbit {
    pub radius: f32,
    pub height: f32,
    pub speed: f32,
    pub angle: f32,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    use super::Transform;

    #[test]
    fn default_transform_is_identity() {
        let transform = Transform::default();
        assert_relative_eq!(transform.transformation_matrix(), nalgebra::Matrix4::identity());
    }

    #[test]
    fn transformation_matrix_applies_translation() {
        let transform = Transform {
            pos: Vector3::new(1.0, -2.0, 3.0),
            ..Default::default()
        };

        let moved = transform.transformation_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(moved, Point3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn default_basis_is_right_handed() {
        let transform = Transform::default();
        assert_relative_eq!(transform.forward(), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(transform.up(), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(transform.right(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn look_at_faces_the_target() {
        let mut transform = Transform {
            pos: Vector3::new(10.0, 5.0, 10.0),
            ..Default::default()
        };
        transform.look_at(&Vector3::zeros());

        let expected = -transform.pos.normalize();
        assert_relative_eq!(transform.forward(), expected, epsilon = 1e-5);
        // up stays roughly upright
        assert!(transform.up().y > 0.0);
    }

    #[test]
    fn look_at_from_directly_above_stays_finite() {
        let mut transform = Transform {
            pos: Vector3::new(0.0, 14.0, 0.0),
            ..Default::default()
        };
        transform.look_at(&Vector3::zeros());

        let forward = transform.forward();
        assert!(forward.iter().all(|c| c.is_finite()));
        assert_relative_eq!(forward, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn look_at_own_position_keeps_rotation() {
        let mut transform = Transform {
            pos: Vector3::new(2.0, 0.0, 0.0),
            ..Default::default()
        };
        transform.look_at(&Vector3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(transform.forward(), Vector3::new(0.0, 0.0, -1.0));
    }
}

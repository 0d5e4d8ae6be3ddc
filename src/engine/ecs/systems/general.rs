use std::f32::consts::TAU;

use nalgebra::Vector3;
use specs::{Read, ReadStorage, System, Write, WriteStorage};

use crate::ecs::components::general::{Camera, Orbit, Transform};
use crate::ecs::resources::{DeltaTime, WavePhase};

/// Advances the wave offset every frame. The render system reads the
/// resulting phase and pushes it to the vertex stage.
pub struct WaveMotion;

impl<'a> System<'a> for WaveMotion {
    type SystemData = (Read<'a, DeltaTime>, Write<'a, WavePhase>);

    fn run(&mut self, (delta_time, mut phase): Self::SystemData) {
        phase.advance(delta_time.0);
    }
}

/// Moves camera entities along their orbit and keeps them aimed at the
/// origin, where the wave surface is centered.
pub struct OrbitCamera;

impl<'a> System<'a> for OrbitCamera {
    type SystemData = (
        Read<'a, DeltaTime>,
        ReadStorage<'a, Camera>,
        WriteStorage<'a, Orbit>,
        WriteStorage<'a, Transform>,
    );

    fn run(&mut self, (delta_time, camera, mut orbit, mut transform): Self::SystemData) {
        use specs::Join;

        for (_, orbit, transform) in (&camera, &mut orbit, &mut transform).join() {
            orbit.angle = (orbit.angle + orbit.speed * delta_time.0).rem_euclid(TAU);

            transform.pos = Vector3::new(
                orbit.radius * orbit.angle.cos(),
                orbit.height,
                orbit.radius * orbit.angle.sin(),
            );
            transform.look_at(&Vector3::zeros());
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use specs::{Builder, RunNow, World, WorldExt};

    use super::*;

    #[test]
    fn wave_motion_advances_the_phase() {
        let mut world = World::new();
        world.insert(DeltaTime(0.5));
        world.insert(WavePhase { offset: 1.0, speed: 2.0 });

        WaveMotion.run_now(&world);

        assert_relative_eq!(world.read_resource::<WavePhase>().offset, 2.0);
    }

    #[test]
    fn orbit_camera_moves_on_its_circle() {
        let mut world = World::new();
        world.register::<Camera>();
        world.register::<Orbit>();
        world.register::<Transform>();
        world.insert(DeltaTime(0.0));

        let camera = world
            .create_entity()
            .with(Camera)
            .with(Orbit { radius: 10.0, height: 4.0, speed: 1.0, angle: 0.0 })
            .with(Transform::default())
            .build();

        OrbitCamera.run_now(&world);

        let transforms = world.read_storage::<Transform>();
        let transform = transforms.get(camera).unwrap();
        assert_relative_eq!(transform.pos.x, 10.0);
        assert_relative_eq!(transform.pos.y, 4.0);
        assert_relative_eq!(transform.pos.z, 0.0);
        // aimed back at the origin
        assert!(transform.forward().dot(&(-transform.pos.normalize())) > 0.99);
    }
}

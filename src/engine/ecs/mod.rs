use specs::{World, WorldExt};

use self::components::general::{Camera, Orbit, Renderable, Transform, Wireframe};

pub mod components;
pub mod resources;
pub mod systems;

pub struct ECS {
    pub world: World
}

impl ECS {
    pub fn new() -> Self {
        let mut world = World::new();
        ECS::register_components(&mut world);
        Self { world }
    }

    fn register_components(world: &mut World) {
        world.register::<Transform>();
        world.register::<Renderable>();
        world.register::<Camera>();
        world.register::<Orbit>();
        world.register::<Wireframe>();
    }
}

impl Default for ECS {
    fn default() -> Self {
        Self::new()
    }
}

use argh::FromArgs;
use engine::ecs::components::general::{Camera, Orbit, Transform, Wireframe};
use engine::ecs::resources::{ActiveCamera, WavePhase};
use engine::{start_engine, WaveEngine};
use log::error;
use specs::{Builder, WorldExt};

/// Animated sine-wave surface demo.
#[derive(FromArgs, Clone)]
struct DemoArgs {
    /// number of quads per side of the wave grid
    #[argh(option, default = "96")]
    quads: u32,

    /// spacing between neighboring grid vertices
    #[argh(option, default = "0.5")]
    spacing: f32,

    /// wave offset advance in radians per second
    #[argh(option, default = "1.0")]
    wave_speed: f32,

    /// orbit radius of the demo camera
    #[argh(option, default = "35.0")]
    orbit_radius: f32,

    /// orbit height of the demo camera
    #[argh(option, default = "14.0")]
    orbit_height: f32,

    /// also draw the surface as a wireframe overlay
    #[argh(switch)]
    wireframe: bool,
}

// Runs after the renderer exists, the GPU buffers need a device
fn setup_scene(engine: &mut WaveEngine<'_>) {
    let args = (*engine.ecs.world.read_resource::<DemoArgs>()).clone();

    let renderer = match engine.renderer.as_ref() {
        Some(v) => v,
        None => return error!("Renderer missing in post init, cannot build the scene"),
    };

    engine.ecs.world.write_resource::<WavePhase>().speed = args.wave_speed;

    let surface = renderer.vulkan.create_surface_renderable(args.quads, args.spacing, None);
    let surface = match surface {
        Ok(v) => v,
        Err(e) => return error!("An error occurred while trying to create the wave surface: {:?}", e),
    };

    let world = &mut engine.ecs.world;

    if args.wireframe {
        let overlay = engine::ecs::components::general::Renderable {
            vertex_buffer: surface.vertex_buffer.clone(),
            index_buffer: surface.index_buffer.clone(),
        };
        world.create_entity().with(overlay).with(Wireframe).build();
    }

    world.create_entity().with(surface).build();

    // Add a camera circling the surface
    let camera_entity = world
        .create_entity()
        .with(Camera)
        .with(Transform::default())
        .with(Orbit {
            radius: args.orbit_radius,
            height: args.orbit_height,
            speed: 0.4,
            angle: 0.0,
        })
        .build();
    world.insert(ActiveCamera(camera_entity));
}

fn main() {
    let args: DemoArgs = argh::from_env();

    let mut engine = WaveEngine::new();
    engine.ecs.world.insert(args);
    engine.add_post_init_fn(setup_scene);

    start_engine(engine);
}

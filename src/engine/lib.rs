#![deny(
    nonstandard_style,
    //warnings,
    rust_2018_idioms,
    //unused,
    future_incompatible,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

mod data_structures;
pub mod ecs;
mod graphics;
mod shaders;

pub use data_structures::graphics::SurfaceVertex;
pub use graphics::models::{create_wave_grid, wave_height};
pub use graphics::renderer::Renderer;
pub use graphics::vulkan::GraphicsError;
pub use graphics::window::WindowState;

use ecs::systems::general::{OrbitCamera, WaveMotion};
use ecs::systems::render::Render;
use ecs::ECS;
use log::trace;
use specs::{Dispatcher, DispatcherBuilder};
use winit::event_loop::EventLoop;

pub type PostInitFn = fn(&mut WaveEngine<'_>);

pub struct WaveEngine<'a> {
    pub renderer: Option<Renderer>,

    pub ecs: ECS,
    dispatchers: Vec<Dispatcher<'a, 'a>>,

    post_init_functions: Vec<PostInitFn>,
}

impl<'a> WaveEngine<'a> {
    pub fn new() -> Self {
        match pretty_env_logger::try_init() {
            Ok(_) => {}
            Err(e) => trace!(
                "Failed to init pretty_env_logger, probably already initialized: {:?}",
                e
            ),
        }

        // Create ECS classes
        let ecs = ECS::new();

        // All three run thread-local on the main thread: the phase has to be
        // advanced and the camera placed before the frame is recorded, and
        // command buffer recording stays on the thread that presents
        let dispatcher = DispatcherBuilder::new()
            .with_thread_local(WaveMotion)
            .with_thread_local(OrbitCamera)
            .with_thread_local(Render)
            .build();
        let dispatchers = vec![dispatcher];

        Self {
            renderer: None,
            ecs,
            dispatchers,
            post_init_functions: vec![],
        }
    }

    pub fn add_dispatcher(&mut self, dispatcher: Dispatcher<'a, 'a>) {
        self.dispatchers.push(dispatcher);
    }

    pub fn add_post_init_fn(&mut self, func: PostInitFn) {
        self.post_init_functions.push(func);
    }

    pub fn set_renderer(&mut self, renderer: Renderer) {
        renderer.setup_engine(self);
        self.renderer = Some(renderer);
        self.post_init_functions
            .clone()
            .into_iter()
            .for_each(|x| x(self));
    }
}

impl Default for WaveEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn start_engine(engine: WaveEngine<'static>) {
    let event_loop = EventLoop::new().expect("Failed creating event loop");
    let mut window_state = WindowState::new();
    window_state.run(event_loop, engine);
}

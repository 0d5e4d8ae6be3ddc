use std::sync::Arc;
use std::time::Instant;

use log::{info, trace, warn};
use specs::WorldExt;
use vulkano::command_buffer::CommandBufferExecFuture;
use vulkano::swapchain::{acquire_next_image, PresentFuture, SwapchainAcquireFuture, SwapchainPresentInfo};
use vulkano::sync::future::{FenceSignalFuture, JoinFuture};
use vulkano::sync::{self, GpuFuture};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::ecs::resources::{CommandBuffer, DeltaTime, ProjectionMatrix, RenderData, RenderDataFrameBuffer};
use crate::graphics::renderer::{projection_for_extent, Renderer};
use crate::WaveEngine;

pub struct WindowState<'a> {
    pub window: Option<Arc<Window>>,
    engine: Option<WaveEngine<'a>>,
    last_time: Instant,

    fences: Vec<Option<Arc<FenceSignalFuture<PresentFuture<CommandBufferExecFuture<JoinFuture<Box<dyn GpuFuture + 'static>, SwapchainAcquireFuture>>>>>>>,
    previous_fence_i: usize
}

impl<'a> WindowState<'a> {
    pub fn new() -> WindowState<'a> {
        Self {
            window: None,
            engine: None,
            last_time: Instant::now(),

            fences: vec![None; 0],
            previous_fence_i: 0
        }
    }

    fn renderer_postinit(&mut self) {
        let frames_in_flight = self.engine.as_ref().unwrap().renderer.as_ref().unwrap().images.len();
        self.fences = vec![None; frames_in_flight];
        self.previous_fence_i = 0;
    }

    pub fn run(&mut self, event_loop: EventLoop<()>, engine: WaveEngine<'a>) {
        self.engine = Some(engine);
        let _ = event_loop.run_app(self);
    }

    fn recreate_swapchain(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let Some(renderer) = engine.renderer.as_mut() else {
            return;
        };

        if !renderer.recreate_swapchain(&window) {
            return;
        }

        // The pipeline handles changed with the swapchain, refresh the
        // resources the render system reads
        let render_data = renderer.render_data();
        let projection = projection_for_extent(renderer.swapchain.image_extent());
        let framebuffer = renderer.framebuffers[0].clone();
        let frames_in_flight = renderer.images.len();

        *engine.ecs.world.write_resource::<RenderData>() = render_data;
        *engine.ecs.world.write_resource::<ProjectionMatrix>() = ProjectionMatrix(projection);
        *engine.ecs.world.write_resource::<RenderDataFrameBuffer>() = RenderDataFrameBuffer(framebuffer);

        // In-flight fences reference the old swapchain images
        self.fences = vec![None; frames_in_flight];
        self.previous_fence_i = 0;
    }

    fn render(&mut self) {
        let engine: &mut WaveEngine<'a> = match self.engine.as_mut() {
            Some(x) => x,
            None => {
                trace!("Engine is None, cannot render");
                return;
            }
        };

        let renderer = match engine.renderer.as_mut() {
            Some(x) => x,
            None => {
                trace!("Renderer is None, cannot render");
                return;
            }
        };

        let (image_i, suboptimal, acquire_future) =
            match acquire_next_image(renderer.swapchain.clone(), None) {
                Ok(r) => (usize::try_from(r.0).unwrap(), r.1, r.2),
                Err(e) => {
                    info!("Failed to acquire next image, recreating swapchain: {:?}", e);
                    self.recreate_swapchain();
                    return;
                }
            };

        // Own scope for immutable reference
        {
            // Update render data
            let mut framebuffer = engine.ecs.world.write_resource::<RenderDataFrameBuffer>();
            *framebuffer = RenderDataFrameBuffer(renderer.framebuffers[image_i].clone());

            // Update delta time
            let delta = Instant::now() - self.last_time;
            let mut deltatime_resource = engine.ecs.world.write_resource::<DeltaTime>();
            *deltatime_resource = DeltaTime(delta.as_secs_f32());
            self.last_time = Instant::now();
        }

        // Iterate through all dispatchers, with the internal being last
        for dispatcher in engine.dispatchers.iter_mut().rev() {
            dispatcher.dispatch(&engine.ecs.world);
        }
        engine.ecs.world.maintain();

        let command_buffer = {
            let resource = engine.ecs.world.read_resource::<CommandBuffer>();
            match &resource.command_buffer {
                Some(v) => v.clone(),
                None => return warn!("Command buffer received from ECS was none, skipping rendering for this frame")
            }
        };

        if let Some(image_fence) = &self.fences[image_i] {
            image_fence.wait(None).unwrap();
        }

        let previous_future = match self.fences[self.previous_fence_i].clone() {
            None => {
                let mut now = sync::now(renderer.device.clone());
                now.cleanup_finished();

                now.boxed()
            }

            Some(fence) => fence.boxed(),
        };

        let future = previous_future
            .join(acquire_future)
            .then_execute(renderer.queue.clone(), command_buffer.clone())
            .unwrap()
            .then_swapchain_present(
                renderer.queue.clone(),
                SwapchainPresentInfo::swapchain_image_index(renderer.swapchain.clone(), image_i.try_into().unwrap())
            )
            .then_signal_fence_and_flush();

        self.fences[image_i] = match future {
            Ok(value) => Some(Arc::new(value)),
            Err(e) => {
                info!("Failed to flush future: {:?}", e);
                None
            }
        };

        self.previous_fence_i = image_i;

        if suboptimal {
            self.recreate_swapchain();
        }
    }
}

impl Default for WindowState<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for WindowState<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        let window_attributes = Window::default_attributes()
            .with_title("Wave Engine")
            .with_inner_size(LogicalSize::new(1024, 768));

        let window: Arc<Window> = event_loop.create_window(window_attributes).unwrap().into();
        self.window = Some(window.clone());

        let renderer = Renderer::new(event_loop, window.clone());

        self.engine.as_mut().expect("Engine not defined when creating window").set_renderer(renderer);

        self.renderer_postinit();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(_) => {
                info!("Resize requested");
                self.recreate_swapchain();
            }
            WindowEvent::CloseRequested => {
                info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Destroyed => info!("Window destroyed"),
            WindowEvent::Focused(_) => info!("Window focused"),
            WindowEvent::RedrawRequested => self.render(),
            _ => trace!("Ignoring winit event {:?}", event)
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // The wave animates continuously, keep redrawing
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        let _ = event_loop;
    }
}

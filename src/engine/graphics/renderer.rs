use crate::ecs::resources::{CommandBuffer, DeltaTime, ProjectionMatrix, RenderData, RenderDataFrameBuffer, WavePhase};
use crate::graphics::vulkan::Vulkan;
use crate::{shaders, WaveEngine};

use std::sync::Arc;

use log::info;
use nalgebra::{Matrix4, Perspective3};
use vulkano::buffer::allocator::SubbufferAllocator;
use vulkano::device::{Device, DeviceExtensions, Queue};
use vulkano::image::Image;
use vulkano::pipeline::graphics::rasterization::{PolygonMode, RasterizationState};
use vulkano::pipeline::graphics::viewport::Viewport;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::render_pass::{Framebuffer, RenderPass};
use vulkano::shader::ShaderModule;
use vulkano::swapchain::{Surface, Swapchain, SwapchainCreateInfo};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

#[cfg(debug_assertions)]
const ENABLE_VALIDATION_LAYERS: bool = true;
#[cfg(not(debug_assertions))]
const ENABLE_VALIDATION_LAYERS: bool = false;

// Projection with the y flip that converts from OpenGL to Vulkan coordinates
pub(crate) fn projection_for_extent(extent: [u32; 2]) -> Matrix4<f32> {
    let mut proj = Perspective3::new(
        extent[0] as f32 / extent[1] as f32,
        (45.0_f32).to_radians(),
        0.1,
        1000.0,
    ).to_homogeneous();
    proj[(1, 1)] *= -1.0;
    proj
}

pub struct Renderer {
    pub(crate) device: Arc<Device>,
    pub(crate) queue: Arc<Queue>,
    pub(crate) render_pass: Arc<RenderPass>,
    pub(crate) framebuffers: Vec<Arc<Framebuffer>>,
    pipeline: Arc<GraphicsPipeline>,
    pipeline_wireframe: Arc<GraphicsPipeline>,
    surface: Arc<Surface>,
    pub(crate) swapchain: Arc<Swapchain>,
    pub(crate) images: Vec<Arc<Image>>,
    ubo_pool: Arc<SubbufferAllocator>,

    vs: Arc<ShaderModule>,
    fs: Arc<ShaderModule>,
    fs_wireframe: Arc<ShaderModule>,

    pub vulkan: Vulkan,
}

impl Renderer {
    pub fn new(event_loop: &ActiveEventLoop, window: Arc<Window>) -> Self {
        let device_extensions = DeviceExtensions {
            khr_swapchain: true,
            ..DeviceExtensions::empty()
        };

        let instance = Vulkan::create_instance(event_loop, ENABLE_VALIDATION_LAYERS);
        let surface = Vulkan::create_surface(&instance, window.clone());
        let (physical, queue_index) = Vulkan::select_physical_device(&instance, &surface, &device_extensions);
        let (device, queue) = Vulkan::create_device(&physical, queue_index, &device_extensions);

        let mut vulkan = Vulkan::new(&device, &queue);

        // The wireframe variant reuses the wave vertex stage, so the debug
        // view shows the same displaced surface
        let vs = shaders::wave::vs::load(device.clone()).expect("Failed to load wave vs");
        let fs = shaders::wave::fs::load(device.clone()).expect("Failed to load wave fs");
        let fs_wireframe = shaders::wireframe::fs::load(device.clone()).expect("Failed to load wireframe fs");

        let (swapchain, images) = vulkan.create_swapchain(&physical, &surface);
        let render_pass = vulkan.create_render_pass(&swapchain);
        let framebuffers = vulkan.create_framebuffers(&render_pass, &images);
        let pipeline = vulkan.create_pipeline("wave", &render_pass, &surface, &vs, &fs, None, None);
        let rasterization_state = RasterizationState { polygon_mode: PolygonMode::Line, ..Default::default() };
        let pipeline_wireframe = vulkan.create_pipeline("wireframe", &render_pass, &surface, &vs, &fs_wireframe, None, Some(&rasterization_state));
        let ubo_pool = vulkan.create_view_ubo_pool();

        Self { device, queue, render_pass, framebuffers, pipeline, pipeline_wireframe, surface, swapchain, images, ubo_pool, vs, fs, fs_wireframe, vulkan }
    }

    pub fn setup_engine(&self, engine: &mut WaveEngine<'_>) {
        // Add projection matrix
        engine.ecs.world.insert(ProjectionMatrix(projection_for_extent(self.swapchain.image_extent())));
        // Add initial render data
        engine.ecs.world.insert(self.render_data());
        engine.ecs.world.insert(RenderDataFrameBuffer(self.framebuffers[0].clone()));
        // Add empty command buffer
        engine.ecs.world.insert(CommandBuffer { command_buffer: None });
        // Add 0 delta time
        engine.ecs.world.insert(DeltaTime(0.0));
        // Add the wave phase, advanced every frame by the WaveMotion system
        engine.ecs.world.insert(WavePhase::default());
    }

    pub(crate) fn render_data(&self) -> RenderData {
        RenderData {
            pipeline: self.pipeline.clone(),
            pipeline_wireframe: self.pipeline_wireframe.clone(),
            ubo_pool: self.ubo_pool.clone(),
            command_buffer_allocator: self.vulkan.command_buffer_allocator.clone(),
            descriptor_set_allocator: self.vulkan.descriptor_set_allocator.clone(),
            queue_family_index: self.vulkan.queue.queue_family_index(),
        }
    }

    /// Rebuilds the swapchain, framebuffers and both pipelines for the
    /// current window size. Returns false when the window has a zero
    /// dimension and rendering should stay paused.
    pub(crate) fn recreate_swapchain(&mut self, window: &Arc<Window>) -> bool {
        let new_dimensions = window.inner_size();

        if new_dimensions.height == 0 || new_dimensions.width == 0 {
            return false;
        }

        let (new_swapchain, new_images) = match self.swapchain.recreate(SwapchainCreateInfo {
            image_extent: new_dimensions.into(),
            ..self.swapchain.create_info()
        }) {
            Ok(r) => r,
            // Creation can fail while the user keeps resizing, in that case
            // we just try again on the next frame
            Err(e) => {
                info!("Failed to recreate swapchain, retrying next frame: {:?}", e);
                return false;
            }
        };
        self.swapchain = new_swapchain;
        self.framebuffers = self.vulkan.create_framebuffers(&self.render_pass, &new_images);
        self.images = new_images;

        // The pipelines bake the viewport in, so they have to follow the size
        let viewport = Viewport {
            offset: [0.0, 0.0],
            extent: new_dimensions.into(),
            depth_range: 0.0..=1.0,
        };
        self.pipeline = self.vulkan.create_pipeline("wave", &self.render_pass, &self.surface, &self.vs, &self.fs, Some(&viewport), None);
        let rasterization_state = RasterizationState { polygon_mode: PolygonMode::Line, ..Default::default() };
        self.pipeline_wireframe = self.vulkan.create_pipeline("wireframe", &self.render_pass, &self.surface, &self.vs, &self.fs_wireframe, Some(&viewport), Some(&rasterization_state));

        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::projection_for_extent;

    #[test]
    fn projection_flips_y_for_vulkan() {
        let proj = projection_for_extent([1024, 768]);
        assert!(proj[(1, 1)] < 0.0);
    }

    #[test]
    fn projection_tracks_aspect_ratio() {
        let wide = projection_for_extent([1600, 800]);
        let square = projection_for_extent([800, 800]);
        // x focal length shrinks as the image gets wider
        assert!(wide[(0, 0)] < square[(0, 0)]);
        assert_relative_eq!(square[(0, 0)], -square[(1, 1)], epsilon = 1e-5);
    }
}

use crate::data_structures::graphics::SurfaceVertex;
use crate::ecs::components::general::Renderable;
use crate::graphics::models::create_wave_grid;
use crate::graphics::utils::get_window_from_surface;
use crate::shaders::wave::vs::VPUniformBufferObject;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use thiserror::Error;
use vulkano::buffer::allocator::{SubbufferAllocator, SubbufferAllocatorCreateInfo};
use vulkano::buffer::{Buffer, BufferCreateInfo, BufferUsage, Subbuffer};
use vulkano::command_buffer::allocator::{StandardCommandBufferAllocator, StandardCommandBufferAllocatorCreateInfo};
use vulkano::descriptor_set::allocator::{StandardDescriptorSetAllocator, StandardDescriptorSetAllocatorCreateInfo};
use vulkano::device::physical::{PhysicalDevice, PhysicalDeviceType};
use vulkano::device::{Device, DeviceCreateInfo, DeviceExtensions, DeviceFeatures, Queue, QueueCreateInfo, QueueFlags};
use vulkano::format::Format;
use vulkano::image::view::ImageView;
use vulkano::image::{Image, ImageCreateInfo, ImageUsage};
use vulkano::instance::{Instance, InstanceCreateFlags, InstanceCreateInfo, InstanceExtensions, Version};
use vulkano::memory::allocator::{AllocationCreateInfo, MemoryTypeFilter, StandardMemoryAllocator};
use vulkano::pipeline::graphics::color_blend::{AttachmentBlend, ColorBlendAttachmentState, ColorBlendState};
use vulkano::pipeline::graphics::depth_stencil::{DepthState, DepthStencilState};
use vulkano::pipeline::graphics::input_assembly::InputAssemblyState;
use vulkano::pipeline::graphics::multisample::MultisampleState;
use vulkano::pipeline::graphics::rasterization::RasterizationState;
use vulkano::pipeline::graphics::vertex_input::{Vertex, VertexDefinition};
use vulkano::pipeline::graphics::viewport::{Viewport, ViewportState};
use vulkano::pipeline::graphics::GraphicsPipelineCreateInfo;
use vulkano::pipeline::layout::PipelineDescriptorSetLayoutCreateInfo;
use vulkano::pipeline::{GraphicsPipeline, PipelineLayout, PipelineShaderStageCreateInfo};
use vulkano::render_pass::{Framebuffer, FramebufferCreateInfo, RenderPass, Subpass};
use vulkano::shader::ShaderModule;
use vulkano::swapchain::{CompositeAlpha, Surface, Swapchain, SwapchainCreateInfo};
use vulkano::VulkanLibrary;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

#[derive(Error, Debug)]
pub enum GraphicsError {
    #[error("no pipeline called '{0}' exists")]
    MissingPipeline(String),
    #[error("a wave surface needs at least one quad per side")]
    EmptyGrid,
}

#[derive(Clone)]
pub struct Vulkan {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pipelines: HashMap<String, Arc<GraphicsPipeline>>,
    pub buffer_memory_allocator: Arc<StandardMemoryAllocator>,
    pub command_buffer_allocator: Arc<StandardCommandBufferAllocator>,
    pub descriptor_set_allocator: Arc<StandardDescriptorSetAllocator>,
}

impl Vulkan {
    /*
    The functions should be called in the correct order
    1. Create Vulkan instance using create_instance
    2. Create the Vulkan surface from the winit window using create_surface
    3. Select the best available physical device (gpu) using select_physical_device
    4. Create Vulkan device using create_device
    5. Call the constructor of this class
    6. Create the swapchain images for n buffering using create_swapchain
    7. Create the render pass, we only use a single one, using create_render_pass
    8. Create the framebuffers for each swapchain image using create_framebuffers
    9. Create the graphics pipelines using create_pipeline
    10. Create the pool for allocating the view/projection uniform buffers using create_view_ubo_pool
    */

    pub fn new(device: &Arc<Device>, queue: &Arc<Queue>) -> Self {
        let buffer_memory_allocator = Arc::new(StandardMemoryAllocator::new_default(device.clone()));
        let command_buffer_allocator = Arc::new(StandardCommandBufferAllocator::new(device.clone(), StandardCommandBufferAllocatorCreateInfo::default()));
        let descriptor_set_allocator = Arc::new(StandardDescriptorSetAllocator::new(device.clone(), StandardDescriptorSetAllocatorCreateInfo::default()));

        Self {
            device: device.clone(),
            queue: queue.clone(),
            pipelines: HashMap::new(),
            buffer_memory_allocator,
            command_buffer_allocator,
            descriptor_set_allocator,
        }
    }


    //--------------------------
    // Static functions
    //--------------------------

    pub fn create_instance(event_loop: &ActiveEventLoop, debug: bool) -> Arc<Instance> {
        let library = VulkanLibrary::new().unwrap();
        let required_extensions = Surface::required_extensions(event_loop).unwrap_or_default();

        const VALIDATION_LAYER_NAME: &str = "VK_LAYER_KHRONOS_validation";
        let mut layers: Vec<String> = vec![];

        if debug {
            // Iterate layers for validation layer support
            let has_validation_support = library
                .layer_properties()
                .unwrap()
                .any(|v| { v.name() == VALIDATION_LAYER_NAME });
            if has_validation_support {
                layers = vec![VALIDATION_LAYER_NAME.to_string()];
            }
        }

        let extensions = InstanceExtensions {
            ext_debug_utils: debug,
            ..required_extensions
        };

        let create_info = InstanceCreateInfo {
            application_name: Some("Wave Engine - Demo".into()),
            application_version: Version { major: 0, minor: 0, patch: 1 },
            engine_name: Some("Wave Engine".into()),
            engine_version: Version { major: 0, minor: 0, patch: 1 },
            enabled_extensions: extensions,
            enabled_layers: layers,
            flags: InstanceCreateFlags::ENUMERATE_PORTABILITY,
            ..Default::default()
        };

        Instance::new(library, create_info)
            .map_err(|b| anyhow!("{}", b)).expect("Failed creating instance")
    }

    pub fn create_surface(instance: &Arc<Instance>, window: Arc<Window>) -> Arc<Surface> {
        Surface::from_window(instance.clone(), window).expect("Failed creating surface")
    }

    pub fn select_physical_device(instance: &Arc<Instance>, surface: &Arc<Surface>, device_extensions: &DeviceExtensions) -> (Arc<PhysicalDevice>, u32) {
        instance
            .enumerate_physical_devices()
            .expect("could not enumerate devices")
            .filter(|p| p.supported_extensions().contains(device_extensions))
            .filter_map(|p| {
                p.queue_family_properties()
                    .iter()
                    .enumerate()
                    .position(|(i, q)| {
                        q.queue_flags.contains(QueueFlags::GRAPHICS) && p.surface_support(i as u32, surface).unwrap_or(false)
                    })
                    .map(|q| (p, q as u32))
            })
            .min_by_key(|(p, _)| match p.properties().device_type {
                PhysicalDeviceType::DiscreteGpu => 0,
                PhysicalDeviceType::IntegratedGpu => 1,
                PhysicalDeviceType::VirtualGpu => 2,
                PhysicalDeviceType::Cpu => 3,

                _ => 4
            })
            .expect("no device available")
    }

    pub fn create_device(physical: &Arc<PhysicalDevice>, queue_family_index: u32, device_extensions: &DeviceExtensions) -> (Arc<Device>, Arc<Queue>) {
        let (device, mut queues) = Device::new(
            physical.clone(),
            DeviceCreateInfo {
                queue_create_infos: vec![QueueCreateInfo {
                    queue_family_index,
                    ..Default::default()
                }],
                enabled_features: DeviceFeatures {
                    // the wireframe pipeline rasterizes with PolygonMode::Line
                    fill_mode_non_solid: true,
                    ..Default::default()
                },
                enabled_extensions: *device_extensions,
                ..Default::default()
            }
        )
        .expect("failed to create device");

        (device, queues.next().unwrap())
    }

    //--------------------------
    // Member functions
    //--------------------------

    pub fn create_swapchain(&self, physical: &Arc<PhysicalDevice>, surface: &Arc<Surface>) -> (Arc<Swapchain>, Vec<Arc<Image>>) {
        let caps = physical
            .surface_capabilities(surface, Default::default())
            .expect("failed to get surface capabilities");

        let dimensions = get_window_from_surface(surface).expect("Surface has no window").inner_size();
        let composite_alpha = CompositeAlpha::Inherit;
        let image_format = physical
                            .surface_formats(surface, Default::default())
                            .unwrap()[0]
                            .0;

        Swapchain::new(
            self.device.clone(),
            surface.clone(),
            SwapchainCreateInfo {
                min_image_count: caps.min_image_count + 1,
                image_format,
                image_extent: dimensions.into(),
                image_usage: ImageUsage::COLOR_ATTACHMENT,
                composite_alpha,
                ..Default::default()
            }
        ).unwrap()
    }

    pub fn create_render_pass(&self, swapchain: &Arc<Swapchain>) -> Arc<RenderPass> {
        vulkano::single_pass_renderpass!(
            self.device.clone(),
            attachments: {
                color: {
                    format: swapchain.image_format(),
                    samples: 1,
                    load_op: Clear,
                    store_op: Store,
                },
                depth: {
                    format: Format::D16_UNORM,
                    samples: 1,
                    load_op: Clear,
                    store_op: DontCare,
                },
            },
            pass: {
                color: [color],
                depth_stencil: {depth},
            },
        ).unwrap()
    }

    pub fn create_framebuffers(&self, render_pass: &Arc<RenderPass>, images: &Vec<Arc<Image>>) -> Vec<Arc<Framebuffer>> {
        // Create depth buffer, shared between the framebuffers
        let dimensions = images[0].extent();
        let depth_buffer = ImageView::new_default(
            Image::new(
                self.buffer_memory_allocator.clone(),
                ImageCreateInfo {extent: dimensions, format: Format::D16_UNORM, usage: ImageUsage::TRANSIENT_ATTACHMENT | ImageUsage::DEPTH_STENCIL_ATTACHMENT, ..Default::default()},
                AllocationCreateInfo {memory_type_filter: MemoryTypeFilter::PREFER_DEVICE, ..Default::default()}).unwrap()
        ).unwrap();

        images
            .iter()
            .map(|image| {
                let view = ImageView::new_default(image.clone()).unwrap();
                Framebuffer::new(
                    render_pass.clone(),
                    FramebufferCreateInfo {
                        attachments: vec![view, depth_buffer.clone()],
                        ..Default::default()
                    }
                ).unwrap()
            })
            .collect::<Vec<_>>()
    }

    pub fn create_pipeline(
        &mut self,
        pipeline_name: &str,
        render_pass: &Arc<RenderPass>,
        surface: &Arc<Surface>,
        vs: &Arc<ShaderModule>,
        fs: &Arc<ShaderModule>,
        viewport: Option<&Viewport>,
        rasterization_state: Option<&RasterizationState>
    ) -> Arc<GraphicsPipeline> {
        let viewport_value = match viewport {
            Some(viewport) => viewport.clone(),
            None => Viewport {
                offset: [0.0, 0.0],
                extent: get_window_from_surface(surface).expect("Surface has no window").inner_size().into(),
                depth_range: 0.0..=1.0,
            }
        };

        let rasterization_state = match rasterization_state {
            Some(v) => v.clone(),
            None => RasterizationState::default()
        };

        let vs = vs.entry_point("main").expect("Could not find entry point for vertex shader");
        let fs = fs.entry_point("main").expect("Could not find entry point for fragment shader");

        let vertex_input_state = SurfaceVertex::per_vertex().definition(&vs).unwrap();

        let stages = [
            PipelineShaderStageCreateInfo::new(vs),
            PipelineShaderStageCreateInfo::new(fs)
        ];

        let layout = PipelineLayout::new(
            self.device.clone(),
            PipelineDescriptorSetLayoutCreateInfo::from_stages(&stages)
                .into_pipeline_layout_create_info(self.device.clone())
                .unwrap()
        )
        .unwrap();

        let subpass = Subpass::from(render_pass.clone(), 0).unwrap();

        let create_info = GraphicsPipelineCreateInfo {
            vertex_input_state: Some(vertex_input_state),
            input_assembly_state: Some(InputAssemblyState::default()),
            viewport_state: Some(ViewportState {
                viewports: [viewport_value].into_iter().collect(),
                ..Default::default()
            }),
            color_blend_state: Some(ColorBlendState::with_attachment_states(
                subpass.num_color_attachments(),
                ColorBlendAttachmentState {
                    blend: Some(AttachmentBlend::alpha()),
                    ..Default::default()
                },
            )),
            rasterization_state: Some(rasterization_state),
            subpass: Some(subpass.into()),
            stages: stages.into_iter().collect(),
            multisample_state: Some(MultisampleState { ..Default::default() }),
            depth_stencil_state: Some(DepthStencilState {depth: Some(DepthState::simple()), ..Default::default()}),
            ..GraphicsPipelineCreateInfo::layout(layout)
        };

        let pipeline = GraphicsPipeline::new(self.device.clone(), None, create_info)
            .expect("Could not create GraphicsPipeline");

        // Insert to pipelines so we can look it up later without a reference
        self.pipelines.insert(pipeline_name.into(), pipeline.clone());

        pipeline
    }

    pub fn create_view_ubo_pool(&self) -> Arc<SubbufferAllocator> {
        Arc::new(SubbufferAllocator::new(
            self.buffer_memory_allocator.clone(),
            SubbufferAllocatorCreateInfo {
                // one view/projection block per frame
                arena_size: std::mem::size_of::<VPUniformBufferObject>() as u64,
                buffer_usage: BufferUsage::UNIFORM_BUFFER,
                memory_type_filter: MemoryTypeFilter::PREFER_DEVICE | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
                ..Default::default()
            },
        ))
    }

    pub fn create_vertex_buffers(&self, vertices: Vec<SurfaceVertex>, indices: Vec<u32>) -> (Subbuffer<[SurfaceVertex]>, Subbuffer<[u32]>) {
        let vertex_buffer = Buffer::from_iter(
            self.buffer_memory_allocator.clone(),
            BufferCreateInfo {usage: BufferUsage::VERTEX_BUFFER, ..Default::default()},
            AllocationCreateInfo { memory_type_filter: MemoryTypeFilter::HOST_SEQUENTIAL_WRITE, ..Default::default()},
            vertices.into_iter()
        ).unwrap();

        let index_buffer = Buffer::from_iter(
            self.buffer_memory_allocator.clone(),
            BufferCreateInfo {usage: BufferUsage::INDEX_BUFFER, ..Default::default()},
            AllocationCreateInfo { memory_type_filter: MemoryTypeFilter::HOST_SEQUENTIAL_WRITE, ..Default::default()},
            indices.into_iter()
        ).unwrap();

        (vertex_buffer, index_buffer)
    }

    /// Builds the GPU buffers for a wave surface grid. The surface is drawn
    /// with the named pipeline ("wave" when none is given), so that pipeline
    /// has to exist already.
    pub fn create_surface_renderable(&self, quads: u32, spacing: f32, pipeline_name: Option<String>) -> Result<Renderable, GraphicsError> {
        let pipeline_name = match pipeline_name {
            Some(v) => v,
            None => "wave".into()
        };

        if !self.pipelines.contains_key(&pipeline_name) {
            return Err(GraphicsError::MissingPipeline(pipeline_name));
        }

        if quads == 0 {
            return Err(GraphicsError::EmptyGrid);
        }

        let (vertices, indices) = create_wave_grid(quads, spacing);
        let (vertex_buffer, index_buffer) = self.create_vertex_buffers(vertices, indices);

        Ok(Renderable { vertex_buffer, index_buffer })
    }
}

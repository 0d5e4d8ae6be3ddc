use std::sync::Arc;

use log::error;
use specs::{Read, ReadStorage, System, Write};
use vulkano::{
    command_buffer::{
        AutoCommandBufferBuilder, CommandBufferUsage, PrimaryAutoCommandBuffer,
        RenderPassBeginInfo, SubpassBeginInfo, SubpassContents, SubpassEndInfo,
    },
    descriptor_set::{DescriptorSet, WriteDescriptorSet},
    pipeline::{Pipeline, PipelineBindPoint, PipelineLayout},
};

use crate::{
    ecs::{
        components::general::{Renderable, Transform, Wireframe},
        resources::{
            ActiveCamera, CommandBuffer, ProjectionMatrix, RenderData, RenderDataFrameBuffer,
            WavePhase,
        },
    },
    shaders::wave::vs::{VPUniformBufferObject, WavePushConstants},
};

pub struct Render;

impl<'a> System<'a> for Render {
    type SystemData = (
        Option<Read<'a, ActiveCamera>>,
        Option<Read<'a, RenderData>>,
        Option<Read<'a, RenderDataFrameBuffer>>,
        Write<'a, CommandBuffer>,
        Read<'a, ProjectionMatrix>,
        Read<'a, WavePhase>,
        ReadStorage<'a, Transform>,
        ReadStorage<'a, Renderable>,
        ReadStorage<'a, Wireframe>,
    );

    fn run(
        &mut self,
        (
            active_cam,
            render_data,
            framebuffer,
            mut command_buffer,
            proj,
            phase,
            transform,
            renderable,
            wireframe,
        ): Self::SystemData,
    ) {
        use specs::Join;
        // Verify we have all dependencies
        // Abort if not
        let active_camera = match active_cam {
            Some(v) => v,
            None => {
                error!("Active camera was none");
                return;
            }
        };

        let render_data = match render_data {
            Some(v) => v,
            None => {
                error!("Render data was none");
                return;
            }
        };

        let framebuffer = match framebuffer {
            Some(v) => v,
            None => {
                error!("Framebuffer was none");
                return;
            }
        };

        // Get camera view matrix from transform
        let view_matrix = match transform.get(active_camera.0) {
            Some(t) => match t.transformation_matrix().try_inverse() {
                Some(v) => v,
                None => return error!("Camera transform is not invertible, aborting rendering"),
            },
            // No transform on active camera
            None => return error!("No Transform on active camera, cannot render!"),
        };

        // Create a command buffer
        let mut builder = AutoCommandBufferBuilder::primary(
            render_data.command_buffer_allocator.clone(),
            render_data.queue_family_index,
            CommandBufferUsage::MultipleSubmit,
        )
        .unwrap();

        // Upload the view/projection block, once per frame
        let ubo_data = VPUniformBufferObject {
            view: view_matrix.into(),
            proj: proj.0.into(),
        };
        let view_ubo = match render_data.ubo_pool.allocate_sized::<VPUniformBufferObject>() {
            Ok(v) => v,
            Err(e) => return error!("Failed to allocate view ubo: {:?}", e),
        };
        match view_ubo.write() {
            Ok(mut guard) => *guard = ubo_data,
            Err(e) => return error!("Failed to write view ubo: {:?}", e),
        }

        // Allocate and write the view/projection descriptor set
        let layout_view = render_data.pipeline.layout().set_layouts().first().unwrap();
        let descriptor_set_view = DescriptorSet::new(
            render_data.descriptor_set_allocator.clone(),
            layout_view.clone(),
            [WriteDescriptorSet::buffer(0, view_ubo.clone())],
            [],
        )
        .unwrap();

        // The same offset reaches every surface drawn this frame
        let push_constants = WavePushConstants {
            wave_offset: phase.offset,
        };

        builder
            .begin_render_pass(
                RenderPassBeginInfo {
                    clear_values: vec![Some([0.0, 0.0, 0.0, 1.0].into()), Some(1f32.into())],
                    ..RenderPassBeginInfo::framebuffer(framebuffer.0.clone())
                },
                SubpassBeginInfo {
                    contents: SubpassContents::Inline,
                    ..SubpassBeginInfo::default()
                },
            )
            .unwrap()
            .bind_pipeline_graphics(render_data.pipeline.clone())
            .expect("Could not bind graphics pipeline")
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                render_data.pipeline.layout().clone(),
                0,
                descriptor_set_view.clone(),
            )
            .expect("Could not bind view descriptor set");

        for (r, ()) in (&renderable, !&wireframe).join() {
            self.render_surface(r, &mut builder, render_data.pipeline.layout(), push_constants);
        }

        // Render wireframe pipeline
        builder
            .bind_pipeline_graphics(render_data.pipeline_wireframe.clone())
            .expect("Could not bind pipeline graphics for wireframe")
            .bind_descriptor_sets(
                PipelineBindPoint::Graphics,
                render_data.pipeline_wireframe.layout().clone(),
                0,
                descriptor_set_view.clone(),
            )
            .expect("Could not bind view descriptor set for wireframe");

        for (r, _) in (&renderable, &wireframe).join() {
            self.render_surface(r, &mut builder, render_data.pipeline_wireframe.layout(), push_constants);
        }

        match builder.end_render_pass(SubpassEndInfo::default()) {
            Ok(v) => v,
            Err(e) => return error!("Failed ending render pass: {:?}", e),
        };

        let buffer = match builder.build() {
            Ok(v) => v,
            Err(e) => return error!("Failed building command buffer: {:?}", e),
        };

        command_buffer.command_buffer = Some(buffer);
    }
}

impl Render {
    fn render_surface(
        &self,
        renderable: &Renderable,
        builder: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
        layout: &Arc<PipelineLayout>,
        push_constants: WavePushConstants,
    ) {
        // NOTE: the gpu can do inherently unsafe things outside of our control when drawing
        unsafe {
            let result = builder
                .push_constants(layout.clone(), 0, push_constants)
                .expect("Pushing constants failed")
                .bind_vertex_buffers(0, renderable.vertex_buffer.clone())
                .expect("Binding vertex buffers failed")
                .bind_index_buffer(renderable.index_buffer.clone())
                .expect("Binding index buffers failed")
                .draw_indexed(renderable.index_buffer.len() as u32, 1, 0, 0, 0);

            if result.is_err() {
                error!("Recording the draw for a wave surface failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use specs::{RunNow, World, WorldExt};

    use super::*;

    #[test]
    fn render_skips_the_frame_without_gpu_resources() {
        let mut world = World::new();
        world.register::<Transform>();
        world.register::<Renderable>();
        world.register::<Wireframe>();
        // ActiveCamera and RenderData never get inserted, the system has
        // to bail out instead of panicking
        Render.run_now(&world);

        assert!(world.read_resource::<CommandBuffer>().command_buffer.is_none());
    }
}

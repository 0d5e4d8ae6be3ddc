use std::f32::consts::TAU;
use std::sync::Arc;

use nalgebra::Matrix4;
use specs::Entity;
use vulkano::buffer::allocator::SubbufferAllocator;
use vulkano::command_buffer::allocator::StandardCommandBufferAllocator;
use vulkano::command_buffer::PrimaryAutoCommandBuffer;
use vulkano::descriptor_set::allocator::StandardDescriptorSetAllocator;
use vulkano::pipeline::GraphicsPipeline;
use vulkano::render_pass::Framebuffer;

pub struct RenderData {
    pub pipeline: Arc<GraphicsPipeline>,
    pub pipeline_wireframe: Arc<GraphicsPipeline>,
    pub ubo_pool: Arc<SubbufferAllocator>,
    pub command_buffer_allocator: Arc<StandardCommandBufferAllocator>,
    pub descriptor_set_allocator: Arc<StandardDescriptorSetAllocator>,
    pub queue_family_index: u32
}

pub struct RenderDataFrameBuffer(pub Arc<Framebuffer>);

#[derive(Default)]
pub struct CommandBuffer {
    pub command_buffer: Option<Arc<PrimaryAutoCommandBuffer>>
}

#[derive(Default)]
pub struct ProjectionMatrix(pub Matrix4<f32>);

pub struct ActiveCamera(pub Entity);

#[derive(Default)]
pub struct DeltaTime(pub f32);

/// The animated wave offset handed to the vertex stage as a push constant.
/// `sin` is 2π-periodic, so the offset is kept wrapped into [0, 2π) and
/// never loses float precision no matter how long the engine runs.
pub struct WavePhase {
    pub offset: f32,
    pub speed: f32,
}

impl WavePhase {
    pub fn advance(&mut self, delta_time: f32) {
        self.offset = (self.offset + self.speed * delta_time).rem_euclid(TAU);
    }
}

impl Default for WavePhase {
    fn default() -> Self {
        WavePhase { offset: 0.0, speed: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use approx::assert_relative_eq;

    use super::WavePhase;

    #[test]
    fn phase_advances_by_speed_times_delta() {
        let mut phase = WavePhase { offset: 0.0, speed: 2.0 };
        phase.advance(0.25);
        assert_relative_eq!(phase.offset, 0.5);
    }

    #[test]
    fn phase_wraps_at_a_full_turn() {
        let mut phase = WavePhase { offset: TAU - 0.1, speed: 1.0 };
        phase.advance(0.2);
        assert_relative_eq!(phase.offset, 0.1, epsilon = 1e-5);
        assert!(phase.offset < TAU);
    }

    #[test]
    fn phase_stays_in_range_with_negative_speed() {
        let mut phase = WavePhase { offset: 0.05, speed: -1.0 };
        phase.advance(0.2);
        assert!((0.0..TAU).contains(&phase.offset));
        assert_relative_eq!(phase.offset, TAU - 0.15, epsilon = 1e-5);
    }
}

use vulkano::{self, buffer::BufferContents, pipeline::graphics::vertex_input::Vertex};

// The wave vertex stage only consumes a position. Displacement, view and
// projection all arrive through the uniform block and the push constant.
#[repr(C)]
#[derive(BufferContents, Vertex, Default, Debug, Copy, Clone, PartialEq)]
pub struct SurfaceVertex {
    #[format(R32G32B32_SFLOAT)]
    pub position: [f32; 3],
}

pub mod models;
pub mod renderer;
pub mod utils;
pub mod vulkan;
pub mod window;

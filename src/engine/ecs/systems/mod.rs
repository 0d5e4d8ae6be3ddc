pub mod general;
pub mod render;

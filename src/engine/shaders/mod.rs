pub mod wave;
pub mod wireframe;

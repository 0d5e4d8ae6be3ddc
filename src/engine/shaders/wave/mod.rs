pub mod fs;
pub mod vs;

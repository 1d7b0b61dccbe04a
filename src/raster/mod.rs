pub mod buffer;
pub mod mask;

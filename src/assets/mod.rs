/// Source icon decoding and resizing.
pub mod decode;

pub mod code;
pub mod image;
pub mod video;

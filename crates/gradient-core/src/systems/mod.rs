pub mod effects;
pub mod renderer;
pub mod scheduler;
pub mod view;

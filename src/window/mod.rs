pub mod resolver;
pub mod window_model;

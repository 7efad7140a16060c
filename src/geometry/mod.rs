pub mod geometry_model;
pub mod transform;

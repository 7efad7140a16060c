pub mod annotate;
pub mod executor;

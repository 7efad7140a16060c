pub mod addressing;
pub mod fingerprint;
pub mod tree_model;

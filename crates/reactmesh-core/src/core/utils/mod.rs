pub mod geometry;
pub mod paths;

pub mod geometry;
pub mod text;

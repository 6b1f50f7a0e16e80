//! 2D sketch helpers: wall picking and the canvas display list

pub mod display;
pub mod geometry;

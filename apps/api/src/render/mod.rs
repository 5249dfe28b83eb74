//! Rendering: slide composition, drawing backends and the carousel pipeline.

pub mod backend;
pub mod geometry;
pub mod pattern;
pub mod pipeline;
pub mod slide;
pub mod svg;

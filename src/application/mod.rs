//! Application services: diagram stripping, rendering and the conversion pipeline.

pub mod convert;
pub mod diagrams;
pub mod error;
pub mod render;

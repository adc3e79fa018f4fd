//! Pure, I/O-free building blocks shared by the conversion pipeline.

pub mod attributes;
pub mod markup;
pub mod slug;

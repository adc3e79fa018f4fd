//! Convert a Markdown design document into a styled, print-ready HTML file.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

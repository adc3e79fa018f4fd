//! Presentation layer: the HTML document shell and console reporting.

pub mod document;
pub mod report;

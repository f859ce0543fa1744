//! HTML page layout, type expressions, markdown, and navigation.

pub mod html;
pub mod markdown;
pub mod nav;
pub mod types;

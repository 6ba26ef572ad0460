//! Frames and the text rasterizer that produces them.

pub mod composite;
pub mod frame;
pub mod raster;
pub mod svg_text;

pub use frame::{AnimationFrame, FrameKind, FrameRGBA};
pub use raster::{Rasterizer, TextStyle};
pub use svg_text::SvgTextRasterizer;

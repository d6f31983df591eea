//! Display rendering for e-ink weather panels.
//!
//! - Token vocabulary built from forecast, sensor and air-quality data
//! - Single-pass token substitution into SVG templates
//! - Rasterization to 8-bit grayscale PNG with atomic file replacement

pub mod context;
pub mod raster;
pub mod template;
pub mod tokens;

pub use context::RenderContext;
pub use raster::RasterExporter;
pub use template::{load_template, render};
pub use tokens::{DisplayData, RoomView};

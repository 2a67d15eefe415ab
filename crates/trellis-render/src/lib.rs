//! trellis-render: draws `trellis-layout` render commands.
//!
//! [`Renderer::render`] maps each command onto a [`Canvas`]. The default
//! canvas, [`PixmapCanvas`], rasterizes with `tiny-skia` into a pixmap that
//! the window layer presents. Fonts, images and 3D models are looked up in
//! tables filled once at startup.

mod camera;
mod canvas;
mod error;
mod fonts;
mod images;
mod models;
mod pixmap;
mod renderer;

pub use camera::{Camera3D, Projection, Ray, screen_to_world};
pub use canvas::{Canvas, GlyphBitmap, PositionedGlyph};
pub use error::RenderError;
pub use fonts::{FontTable, GlyphCache};
pub use images::ImageTable;
pub use models::{Mesh, Model, ModelId, ModelTable};
pub use pixmap::PixmapCanvas;
pub use renderer::Renderer;

//! trellis-layout: an immediate-mode layout front end for `taffy`.
//!
//! Each frame the caller opens a [`Ui`] with [`LayoutEngine::begin_layout`],
//! declares the element tree with nested closures, and collects the ordered
//! [`RenderCommands`] from [`LayoutEngine::end_layout`]. Pointer hover and
//! scroll container state are retained between frames by element id.

mod context;
mod elements;
mod engine;
mod error;
mod id;
mod math;
mod pointer;
mod render_commands;
mod scroll;
mod style;
mod text;

pub use context::LayoutContext;
pub use elements::*;
pub use engine::{Capacity, ElementBuilder, LayoutEngine, Ui};
pub use error::{ErrorHandler, LayoutError, LayoutErrorKind};
pub use id::ElementId;
pub use math::{BoundingBox, Color, CornerRadius, Dimensions, Vector2};
pub use pointer::{PointerData, PointerState};
pub use render_commands::*;
pub use scroll::ScrollContainerData;
pub use text::{FontId, MeasureText, TextAlignment, TextConfig, TextWrapMode, WrappedLine};

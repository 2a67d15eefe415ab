use std::path::PathBuf;

use trellis_layout::{CustomData, FontId, ImageId};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("font {0:?} is not loaded")]
    UnknownFont(FontId),

    #[error("image {0:?} is not loaded")]
    UnknownImage(ImageId),

    #[error("no model is loaded for {0:?}")]
    UnknownModel(CustomData),

    #[error("no system sans-serif font found")]
    NoSystemFont,

    #[error("failed to parse font: {0}")]
    FontParse(&'static str),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid pixmap size {width}x{height}")]
    PixmapSize { width: u32, height: u32 },
}

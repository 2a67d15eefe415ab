//! Image table: decoded images kept as premultiplied `tiny-skia` pixmaps.

use std::path::Path;

use tiny_skia::{IntSize, Pixmap, PremultipliedColorU8};
use trellis_layout::{Color, Dimensions, ImageId};

use crate::error::RenderError;

#[derive(Default)]
pub struct ImageTable {
    images: Vec<Pixmap>,
}

impl ImageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pixmap: Pixmap) -> ImageId {
        self.images.push(pixmap);
        ImageId((self.images.len() - 1) as u32)
    }

    /// Decode a PNG/JPEG/GIF/WebP file.
    pub fn load(&mut self, path: &Path) -> Result<ImageId, RenderError> {
        let decoded = image::open(path).map_err(|source| RenderError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixmap = pixmap_from_rgba(width, height, rgba.into_raw())?;
        log::info!("loaded image {} ({width}x{height})", path.display());
        Ok(self.insert(pixmap))
    }

    /// Two-color checkerboard, used where no image file is shipped.
    pub fn checkerboard(
        &mut self,
        width: u32,
        height: u32,
        cell: u32,
        a: Color,
        b: Color,
    ) -> Result<ImageId, RenderError> {
        let cell = cell.max(1);
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let c = if (x / cell + y / cell) % 2 == 0 { a } else { b };
                data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        Ok(self.insert(pixmap_from_rgba(width, height, data)?))
    }

    pub fn get(&self, id: ImageId) -> Option<&Pixmap> {
        self.images.get(id.0 as usize)
    }

    pub fn dimensions(&self, id: ImageId) -> Option<Dimensions> {
        self.get(id).map(|p| Dimensions::new(p.width() as f32, p.height() as f32))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Build a pixmap from straight-alpha RGBA8 rows.
fn pixmap_from_rgba(width: u32, height: u32, mut data: Vec<u8>) -> Result<Pixmap, RenderError> {
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    let size = IntSize::from_wh(width, height).ok_or(RenderError::PixmapSize { width, height })?;
    Pixmap::from_vec(data, size).ok_or(RenderError::PixmapSize { width, height })
}

/// Copy of `pixmap` with every channel multiplied by `tint`.
pub(crate) fn tinted(pixmap: &Pixmap, tint: Color) -> Pixmap {
    let mut out = pixmap.clone();
    let scale = |v: u8, t: u8| ((v as u16 * t as u16 + 127) / 255) as u8;
    // premultiplied: colour channels carry the tint's alpha as well
    let channel = |v: u8, t: u8| scale(scale(v, t), tint.a);
    for px in out.pixels_mut() {
        let tinted = PremultipliedColorU8::from_rgba(
            channel(px.red(), tint.r),
            channel(px.green(), tint.g),
            channel(px.blue(), tint.b),
            scale(px.alpha(), tint.a),
        );
        if let Some(tinted) = tinted {
            *px = tinted;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_cells() {
        let mut table = ImageTable::new();
        let id = table.checkerboard(4, 4, 2, Color::WHITE, Color::BLACK).unwrap();
        assert_eq!(table.dimensions(id), Some(Dimensions::new(4.0, 4.0)));
        let pixmap = table.get(id).unwrap();
        assert_eq!(pixmap.pixel(0, 0).map(|p| p.red()), Some(255));
        assert_eq!(pixmap.pixel(2, 0).map(|p| p.red()), Some(0));
        assert_eq!(pixmap.pixel(2, 2).map(|p| p.red()), Some(255));
    }

    #[test]
    fn test_rgba_is_premultiplied() {
        let pixmap = pixmap_from_rgba(1, 1, vec![255, 0, 0, 128]).unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.alpha()), (128, 128));
    }

    #[test]
    fn test_tint_halves_channels() {
        let pixmap = pixmap_from_rgba(1, 1, vec![200, 100, 50, 255]).unwrap();
        let px = tinted(&pixmap, Color::rgba(128, 255, 0, 255)).pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (100, 100, 0, 255));
    }

    #[test]
    fn test_tint_alpha_fades_colour() {
        let pixmap = pixmap_from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();
        let px = tinted(&pixmap, Color::rgba(255, 255, 255, 128)).pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (128, 0, 0, 128));
    }

    #[test]
    fn test_missing_file() {
        let mut table = ImageTable::new();
        let err = table.load(Path::new("/nonexistent/preview.png")).unwrap_err();
        assert!(matches!(err, RenderError::ImageDecode { .. }));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            pixmap_from_rgba(0, 3, Vec::new()),
            Err(RenderError::PixmapSize { width: 0, height: 3 })
        ));
    }
}

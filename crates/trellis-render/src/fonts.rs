//! Font table, text measurement and glyph rasterization.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use fontdue::{Font, FontSettings};
use trellis_layout::{Dimensions, FontId, MeasureText, TextConfig, TextRenderData, Vector2};

use crate::canvas::{GlyphBitmap, PositionedGlyph};
use crate::error::RenderError;

/// Fonts loaded at startup, addressed by [`FontId`] in registration order.
#[derive(Default)]
pub struct FontTable {
    fonts: Vec<Font>,
}

impl FontTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, font: Font) -> FontId {
        self.fonts.push(font);
        FontId((self.fonts.len() - 1) as u16)
    }

    pub fn load_bytes(
        &mut self,
        bytes: &[u8],
        collection_index: u32,
    ) -> Result<FontId, RenderError> {
        let settings = FontSettings {
            collection_index,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings).map_err(RenderError::FontParse)?;
        Ok(self.add(font))
    }

    pub fn load_file(&mut self, path: &Path) -> Result<FontId, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let id = self.load_bytes(&bytes, 0)?;
        log::info!("loaded font {} as {:?}", path.display(), id);
        Ok(id)
    }

    /// Load a reasonable system sans-serif face using `fontdb`.
    pub fn load_system_sans_serif(&mut self) -> Result<FontId, RenderError> {
        use fontdb::{Database, Family, Query, Stretch, Style, Weight};

        let mut db = Database::new();
        db.load_system_fonts();

        let id = db
            .query(&Query {
                families: &[
                    Family::SansSerif,
                    Family::Name("Segoe UI"),
                    Family::Name("SF Pro Text"),
                    Family::Name("Arial"),
                ],
                weight: Weight::NORMAL,
                stretch: Stretch::Normal,
                style: Style::Normal,
            })
            .ok_or(RenderError::NoSystemFont)?;

        if let Some(face) = db.face(id) {
            log::info!("using system font {:?} ({:?})", face.post_script_name, face.source);
        }

        let font = db
            .with_face_data(id, |data, index| {
                Font::from_bytes(
                    data,
                    FontSettings {
                        collection_index: index,
                        ..FontSettings::default()
                    },
                )
            })
            .ok_or(RenderError::NoSystemFont)?
            .map_err(RenderError::FontParse)?;
        Ok(self.add(font))
    }

    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Ascent and descent (negative) at `px`, falling back to the em box.
    fn vertical_metrics(font: &Font, px: f32) -> (f32, f32) {
        font.horizontal_line_metrics(px)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((px * 0.8, -px * 0.2))
    }
}

impl MeasureText for FontTable {
    fn measure_text(&self, text: &str, config: &TextConfig) -> Dimensions {
        let Some(font) = self.get(config.font_id) else {
            log::debug!("measuring with unloaded font {:?}", config.font_id);
            return Dimensions::ZERO;
        };
        let px = config.font_size;
        let mut width = 0.0;
        let mut count = 0usize;
        for ch in text.chars() {
            width += font.metrics(ch, px).advance_width;
            count += 1;
        }
        if count > 1 {
            width += config.letter_spacing * (count - 1) as f32;
        }
        let (ascent, descent) = FontTable::vertical_metrics(font, px);
        Dimensions::new(width, ascent - descent)
    }
}

struct CachedGlyph {
    bitmap: Rc<GlyphBitmap>,
    xmin: i32,
    ymin: i32,
    advance: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphKey {
    font: FontId,
    glyph: u16,
    px_bits: u32,
}

/// Rasterized glyph coverage keyed by font, glyph index and device pixel size.
#[derive(Default)]
pub struct GlyphCache {
    entries: HashMap<GlyphKey, CachedGlyph>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every bitmap, e.g. after the scale factor changed.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn glyph(&mut self, font: &Font, font_id: FontId, glyph: u16, px: f32) -> &CachedGlyph {
        let key = GlyphKey { font: font_id, glyph, px_bits: px.to_bits() };
        self.entries.entry(key).or_insert_with(|| {
            let (metrics, coverage) = font.rasterize_indexed(glyph, px);
            CachedGlyph {
                bitmap: Rc::new(GlyphBitmap {
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                }),
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                advance: metrics.advance_width,
            }
        })
    }

    /// Position the glyphs of one text line whose box starts at `origin`.
    /// The baseline is centred in the line height.
    pub fn layout_line(
        &mut self,
        fonts: &FontTable,
        text: &TextRenderData,
        origin: Vector2,
        scale: f32,
    ) -> Result<Vec<PositionedGlyph>, RenderError> {
        let font = fonts.get(text.font_id).ok_or(RenderError::UnknownFont(text.font_id))?;
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let device_px = text.font_size * scale;
        let (ascent, descent) = FontTable::vertical_metrics(font, text.font_size);
        let baseline = origin.y + (text.line_height - (ascent - descent)) / 2.0 + ascent;

        let mut glyphs = Vec::with_capacity(text.text.len());
        let mut pen = origin.x;
        for ch in text.text.chars() {
            let index = font.lookup_glyph_index(ch);
            let glyph = self.glyph(font, text.font_id, index, device_px);
            if glyph.bitmap.width > 0 && glyph.bitmap.height > 0 {
                glyphs.push(PositionedGlyph {
                    x: pen + glyph.xmin as f32 / scale,
                    y: baseline - (glyph.ymin as f32 + glyph.bitmap.height as f32) / scale,
                    bitmap: Rc::clone(&glyph.bitmap),
                });
            }
            pen += glyph.advance / scale + text.letter_spacing;
        }
        Ok(glyphs)
    }
}

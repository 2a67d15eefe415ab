//! Text configuration, measurement and line wrapping.

use std::collections::HashMap;
use std::ops::Range;

use crate::id::hash_bytes;
use crate::math::{Color, Dimensions};

const EPSILON: f32 = 0.01;

/// Handle into the renderer's font table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FontId(pub u16);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextWrapMode {
    /// Break on spaces when the line exceeds the available width, and on newlines.
    #[default]
    Words,
    /// Break on newline characters only.
    Newlines,
    /// Never break.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextConfig {
    pub color: Color,
    pub font_id: FontId,
    pub font_size: f32,
    pub letter_spacing: f32,
    /// Distance between baselines; 0 uses the measured font height.
    pub line_height: f32,
    pub wrap_mode: TextWrapMode,
    pub alignment: TextAlignment,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            font_id: FontId(0),
            font_size: 16.0,
            letter_spacing: 0.0,
            line_height: 0.0,
            wrap_mode: TextWrapMode::Words,
            alignment: TextAlignment::Left,
        }
    }
}

impl TextConfig {
    pub fn new(font_id: FontId, font_size: f32, color: Color) -> Self {
        Self { font_id, font_size, color, ..Self::default() }
    }

    pub fn wrap_mode(mut self, wrap_mode: TextWrapMode) -> Self {
        self.wrap_mode = wrap_mode;
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Measures a run of text without line breaks.
pub trait MeasureText {
    fn measure_text(&self, text: &str, config: &TextConfig) -> Dimensions;
}

impl<F> MeasureText for F
where
    F: Fn(&str, &TextConfig) -> Dimensions,
{
    fn measure_text(&self, text: &str, config: &TextConfig) -> Dimensions {
        self(text, config)
    }
}

/// A line of a wrapped text element, as a byte range into the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub range: Range<usize>,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WrappedText {
    pub lines: Vec<WrappedLine>,
    pub line_height: f32,
    pub width: f32,
}

impl WrappedText {
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedWord {
    dimensions: Dimensions,
    last_used: u64,
}

/// Per-word measurement cache shared across frames.
pub(crate) struct MeasureCache {
    entries: HashMap<u64, CachedWord>,
    capacity: usize,
    generation: u64,
    overflowed: bool,
}

impl MeasureCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            capacity,
            generation: 0,
            overflowed: false,
        }
    }

    /// Drop words that were not measured during the previous frame.
    pub fn begin_frame(&mut self) {
        let previous = self.generation;
        self.entries.retain(|_, word| word.last_used >= previous);
        self.generation += 1;
        self.overflowed = false;
    }

    /// True when a word could not be cached this frame.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn entry_size() -> usize {
        std::mem::size_of::<(u64, CachedWord)>()
    }

    fn key(word: &str, config: &TextConfig) -> u64 {
        let mut seed = config.font_id.0 as u64;
        seed = seed.wrapping_mul(31).wrapping_add(config.font_size.to_bits() as u64);
        seed = seed.wrapping_mul(31).wrapping_add(config.letter_spacing.to_bits() as u64);
        hash_bytes(word.as_bytes(), seed)
    }

    fn measure(
        &mut self,
        measurer: &dyn MeasureText,
        word: &str,
        config: &TextConfig,
    ) -> Dimensions {
        let key = Self::key(word, config);
        if let Some(hit) = self.entries.get_mut(&key) {
            hit.last_used = self.generation;
            return hit.dimensions;
        }
        let dimensions = measurer.measure_text(word, config);
        if self.entries.len() < self.capacity {
            self.entries.insert(key, CachedWord { dimensions, last_used: self.generation });
        } else {
            self.overflowed = true;
        }
        dimensions
    }
}

/// Splits `text[range]` on single spaces, yielding byte ranges of each word.
fn words(text: &str, range: Range<usize>) -> impl Iterator<Item = Range<usize>> + '_ {
    let base = range.start;
    text[range]
        .split(' ')
        .scan(base, |offset, word| {
            let start = *offset;
            *offset += word.len() + 1;
            Some(start..start + word.len())
        })
}

fn paragraphs(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    text.split('\n').scan(0usize, |offset, para| {
        let start = *offset;
        *offset += para.len() + 1;
        let para = para.strip_suffix('\r').unwrap_or(para);
        Some(start..start + para.len())
    })
}

/// Measurement front end used during layout and command generation.
pub(crate) struct TextMeasurer<'a> {
    pub measure: &'a dyn MeasureText,
    pub cache: &'a mut MeasureCache,
}

impl<'a> TextMeasurer<'a> {
    fn word(&mut self, word: &str, config: &TextConfig) -> Dimensions {
        self.cache.measure(self.measure, word, config)
    }

    fn line_height(&mut self, config: &TextConfig) -> f32 {
        if config.line_height > 0.0 {
            config.line_height
        } else {
            self.word(" ", config).height
        }
    }

    fn span_width(&mut self, text: &str, range: Range<usize>, config: &TextConfig) -> f32 {
        let space = self.word(" ", config).width;
        let mut width = 0.0;
        for (i, word) in words(text, range).enumerate() {
            if i > 0 {
                width += space;
            }
            if !word.is_empty() {
                width += self.word(&text[word], config).width;
            }
        }
        width
    }

    /// Widest unbreakable run: the min-content width of the text.
    pub fn min_content_width(&mut self, text: &str, config: &TextConfig) -> f32 {
        match config.wrap_mode {
            TextWrapMode::Words => {
                let mut widest: f32 = 0.0;
                for word in words(text, 0..text.len()) {
                    for part in paragraphs(&text[word.clone()]) {
                        let part = word.start + part.start..word.start + part.end;
                        if !part.is_empty() {
                            widest = widest.max(self.word(&text[part], config).width);
                        }
                    }
                }
                widest
            }
            TextWrapMode::Newlines | TextWrapMode::None => self.wrap(text, config, None).width,
        }
    }

    /// Break `text` into lines no wider than `max_width` (when given).
    pub fn wrap(&mut self, text: &str, config: &TextConfig, max_width: Option<f32>) -> WrappedText {
        let line_height = self.line_height(config);
        let mut lines = Vec::new();

        match config.wrap_mode {
            TextWrapMode::None => {
                let width = self.span_width(text, 0..text.len(), config);
                lines.push(WrappedLine { range: 0..text.len(), width });
            }
            TextWrapMode::Newlines => {
                for para in paragraphs(text) {
                    let width = self.span_width(text, para.clone(), config);
                    lines.push(WrappedLine { range: para, width });
                }
            }
            TextWrapMode::Words => {
                let space = self.word(" ", config).width;
                for para in paragraphs(text) {
                    let mut current: Option<WrappedLine> = None;
                    for word in words(text, para.clone()) {
                        let word_width = if word.is_empty() {
                            0.0
                        } else {
                            self.word(&text[word.clone()], config).width
                        };
                        current = Some(match current.take() {
                            None => WrappedLine { range: word, width: word_width },
                            Some(line) => {
                                let joined = line.width + space + word_width;
                                let fits = max_width.map_or(true, |max| joined <= max + EPSILON);
                                if fits {
                                    WrappedLine { range: line.range.start..word.end, width: joined }
                                } else {
                                    lines.push(line);
                                    WrappedLine { range: word, width: word_width }
                                }
                            }
                        });
                    }
                    match current {
                        Some(line) => lines.push(line),
                        None => lines.push(WrappedLine { range: para.clone(), width: 0.0 }),
                    }
                }
            }
        }

        let space = self.word(" ", config).width;
        for line in &mut lines {
            trim_trailing_spaces(text, line, space);
        }

        let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
        WrappedText { lines, line_height, width }
    }
}

/// Drop trailing spaces from the line along with their advance.
fn trim_trailing_spaces(text: &str, line: &mut WrappedLine, space: f32) {
    let slice = &text[line.range.clone()];
    let trimmed = slice.trim_end_matches(' ');
    let removed = slice.len() - trimmed.len();
    line.range.end = line.range.start + trimmed.len();
    line.width = (line.width - removed as f32 * space).max(0.0);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character advances by half the font size; lines are one font size tall.
    pub(crate) fn fixed_advance(text: &str, config: &TextConfig) -> Dimensions {
        let chars = text.chars().count() as f32;
        Dimensions::new(chars * config.font_size * 0.5, config.font_size)
    }

    fn wrap(text: &str, max: Option<f32>, mode: TextWrapMode) -> (Vec<String>, WrappedText) {
        let measure = fixed_advance;
        let mut cache = MeasureCache::new(64);
        let mut m = TextMeasurer { measure: &measure, cache: &mut cache };
        let config = TextConfig::new(FontId(0), 10.0, Color::WHITE).wrap_mode(mode);
        let wrapped = m.wrap(text, &config, max);
        let lines = wrapped.lines.iter().map(|l| text[l.range.clone()].to_string()).collect();
        (lines, wrapped)
    }

    #[test]
    fn test_wrap_words_greedy() {
        // each char is 5px wide: "hello" = 25, space = 5
        let (lines, wrapped) = wrap("hello big world", Some(60.0), TextWrapMode::Words);
        assert_eq!(lines, vec!["hello big", "world"]);
        assert_eq!(wrapped.lines[0].width, 45.0);
        assert_eq!(wrapped.height(), 20.0);
    }

    #[test]
    fn test_trailing_spaces_do_not_count_towards_width() {
        let (lines, wrapped) = wrap("hello ", None, TextWrapMode::Words);
        assert_eq!(lines, vec!["hello"]);
        assert_eq!(wrapped.width, 25.0);

        let (lines, wrapped) = wrap("ab  \ncd", None, TextWrapMode::Newlines);
        assert_eq!(lines, vec!["ab", "cd"]);
        assert_eq!(wrapped.lines[0].width, 10.0);

        let (_, wrapped) = wrap("   ", None, TextWrapMode::None);
        assert_eq!(wrapped.width, 0.0);
    }

    #[test]
    fn test_wrap_keeps_long_word_on_own_line() {
        let (lines, _) = wrap("a extraordinarily b", Some(20.0), TextWrapMode::Words);
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn test_wrap_respects_newlines() {
        let (lines, _) = wrap("one\ntwo three", None, TextWrapMode::Words);
        assert_eq!(lines, vec!["one", "two three"]);
        let (lines, _) = wrap("one\n\ntwo", None, TextWrapMode::Newlines);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrap_none_is_single_line() {
        let (lines, wrapped) = wrap("no wrapping here", Some(10.0), TextWrapMode::None);
        assert_eq!(lines.len(), 1);
        assert_eq!(wrapped.width, 80.0);
    }

    #[test]
    fn test_min_content_width_is_widest_word() {
        let measure = fixed_advance;
        let mut cache = MeasureCache::new(64);
        let mut m = TextMeasurer { measure: &measure, cache: &mut cache };
        let config = TextConfig::new(FontId(0), 10.0, Color::WHITE);
        assert_eq!(m.min_content_width("ab abcd abc", &config), 20.0);
    }

    #[test]
    fn test_cache_evicts_unused_words_and_reports_overflow() {
        let measure = fixed_advance;
        let mut cache = MeasureCache::new(2);
        let config = TextConfig::default();
        cache.begin_frame();
        cache.measure(&measure, "a", &config);
        cache.measure(&measure, "b", &config);
        cache.measure(&measure, "c", &config);
        assert_eq!(cache.len(), 2);
        assert!(cache.overflowed());

        // next frame only uses "a"; the frame after drops "b"
        cache.begin_frame();
        assert!(!cache.overflowed());
        cache.measure(&measure, "a", &config);
        cache.begin_frame();
        assert_eq!(cache.len(), 1);
    }
}

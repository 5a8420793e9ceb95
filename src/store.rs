// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use rustc_hash::FxHashMap;

use crate::error::{RainError, RainResult};
use crate::glyph::Glyph;

const UNITS_BETWEEN_ROWS: i32 = 1;
const UNITS_BETWEEN_COLUMNS: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: i32,
    pub height: i32,
}

impl GlyphMetrics {
    pub fn new(width: i32, height: i32) -> RainResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(RainError::InvalidGlyphMetrics { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn units_per_row(&self) -> i32 {
        self.height + UNITS_BETWEEN_ROWS
    }

    pub fn footprint(&self) -> i32 {
        self.width + UNITS_BETWEEN_COLUMNS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphImage {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub ascii: bool,
    pub mono: bool,
}

pub struct GlyphImageStore {
    metrics: GlyphMetrics,
    images: FxHashMap<Color, Vec<GlyphImage>>,
}

impl GlyphImageStore {
    pub fn new(
        colors: &[Color],
        lead_color: Color,
        metrics: GlyphMetrics,
        opts: StoreOptions,
    ) -> Self {
        let mut images = FxHashMap::default();
        for &color in colors.iter().chain(std::iter::once(&lead_color)) {
            let bold = color == lead_color;
            let fg = if opts.mono { None } else { Some(color) };
            let row: Vec<GlyphImage> = Glyph::all()
                .map(|g| GlyphImage {
                    ch: if opts.ascii { g.ascii() } else { g.ch() },
                    fg,
                    bold,
                })
                .collect();
            images.insert(color, row);
        }
        Self { metrics, images }
    }

    pub fn image_for(&self, color: Color, glyph: Glyph) -> RainResult<&GlyphImage> {
        let row = self
            .images
            .get(&color)
            .ok_or(RainError::MissingColor { color })?;
        row.get(glyph.index()).ok_or(RainError::MissingGlyph {
            color,
            index: glyph.index(),
        })
    }

    pub fn glyph_width(&self) -> i32 {
        self.metrics.width
    }

    pub fn glyph_height(&self) -> i32 {
        self.metrics.height
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green() -> Color {
        Color::Rgb { r: 0, g: 255, b: 65 }
    }

    #[test]
    fn metrics_reject_non_positive_sizes() {
        assert!(GlyphMetrics::new(0, 16).is_err());
        assert!(GlyphMetrics::new(9, -1).is_err());
        let m = GlyphMetrics::new(9, 16).unwrap();
        assert_eq!(m.units_per_row(), 17);
        assert_eq!(m.footprint(), 10);
    }

    #[test]
    fn lead_color_renders_bold() {
        let m = GlyphMetrics::new(9, 16).unwrap();
        let store = GlyphImageStore::new(&[green()], Color::White, m, StoreOptions::default());
        let g = Glyph::from_index(0).unwrap();
        assert!(store.image_for(Color::White, g).unwrap().bold);
        let img = store.image_for(green(), g).unwrap();
        assert!(!img.bold);
        assert_eq!(img.fg, Some(green()));
        assert_eq!(img.ch, g.ch());
        assert_eq!(store.glyph_width(), 9);
        assert_eq!(store.glyph_height(), 16);
    }

    #[test]
    fn unregistered_color_is_an_error() {
        let m = GlyphMetrics::new(9, 16).unwrap();
        let store = GlyphImageStore::new(&[green()], Color::White, m, StoreOptions::default());
        let err = store
            .image_for(Color::Magenta, Glyph::from_index(3).unwrap())
            .unwrap_err();
        assert!(matches!(err, RainError::MissingColor { .. }));
    }

    #[test]
    fn ascii_and_mono_options_change_the_images() {
        let m = GlyphMetrics::new(9, 16).unwrap();
        let store = GlyphImageStore::new(
            &[green()],
            Color::White,
            m,
            StoreOptions {
                ascii: true,
                mono: true,
            },
        );
        for g in Glyph::all() {
            let img = store.image_for(green(), g).unwrap();
            assert!(img.ch.is_ascii());
            assert_eq!(img.fg, None);
        }
    }
}

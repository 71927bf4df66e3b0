// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test environment: a deterministic raster face with fixed-width
//! glyphs so layout results are exactly predictable.

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{Bitmap, GlyphMetrics, ImageKind, Library, LineMetrics, RasterFace};
use crate::fixed;
use crate::font::Font;

/// Advance of every test glyph, in pixels.
pub(crate) const CHAR_W: i32 = 8;
/// Line height of the test face, in pixels.
pub(crate) const LINE_H: i32 = 12;

/// Call counters shared between a test and its face.
#[derive(Clone, Default)]
pub(crate) struct FaceCounters {
    pub glyph_index_calls: Rc<Cell<usize>>,
    pub raster_calls: Rc<Cell<usize>>,
}

/// A face whose coverage is an explicit character predicate. Glyph ids are
/// `codepoint + 1` so that 0 stays the missing-glyph sentinel.
pub(crate) struct TestFace {
    covers: Box<dyn Fn(char) -> bool>,
    kern: fixed::F26Dot6,
    counters: FaceCounters,
}

impl TestFace {
    pub(crate) fn ascii() -> Self {
        Self::with_coverage(|ch| ch.is_ascii() && !ch.is_control())
    }

    pub(crate) fn with_coverage(covers: impl Fn(char) -> bool + 'static) -> Self {
        Self {
            covers: Box::new(covers),
            kern: 0,
            counters: FaceCounters::default(),
        }
    }

    /// An ASCII face applying a uniform kern between every glyph pair.
    pub(crate) fn kerned(pixels: i32) -> Self {
        let mut face = Self::ascii();
        face.kern = fixed::from_pixels(pixels);
        face
    }

    pub(crate) fn counters(&self) -> FaceCounters {
        self.counters.clone()
    }
}

impl RasterFace for TestFace {
    fn glyph_index(&self, ch: char) -> u32 {
        self.counters
            .glyph_index_calls
            .set(self.counters.glyph_index_calls.get() + 1);
        if (self.covers)(ch) { ch as u32 + 1 } else { 0 }
    }

    fn glyph_metrics(&self, glyph_id: u32) -> Option<GlyphMetrics> {
        // Whitespace has advance but no ink; glyph 0 renders a notdef box.
        let ch = char::from_u32(glyph_id.wrapping_sub(1)).unwrap_or('\u{0}');
        let (width, height) = if glyph_id != 0 && ch.is_whitespace() {
            (0, 0)
        } else {
            (6, 10)
        };
        Some(GlyphMetrics {
            left: 1,
            top: 9,
            width,
            height,
            advance: fixed::from_pixels(CHAR_W),
        })
    }

    fn kerning(&self, left: u32, right: u32) -> fixed::F26Dot6 {
        if left != 0 && right != 0 { self.kern } else { 0 }
    }

    fn rasterize(&self, glyph_id: u32) -> Option<Bitmap> {
        self.counters
            .raster_calls
            .set(self.counters.raster_calls.get() + 1);
        let m = self.glyph_metrics(glyph_id)?;
        if m.width == 0 || m.height == 0 {
            return None;
        }
        Some(Bitmap {
            width: m.width,
            height: m.height,
            left: m.left as i16,
            top: m.top as i16,
            kind: ImageKind::Alpha,
            data: vec![0xFF; usize::from(m.width) * usize::from(m.height)],
        })
    }

    fn line_metrics(&self) -> LineMetrics {
        LineMetrics {
            ascent: 10,
            descent: -2,
            height: LINE_H,
            underline_offset: 1,
            underline_thickness: 1,
            strikethrough_offset: 4,
            strikethrough_thickness: 1,
        }
    }
}

/// A fresh library plus an ASCII-covering font.
pub(crate) fn test_env() -> (Library, Font) {
    let library = Library::init();
    let font = Font::new(&library, Box::new(TestFace::ascii()), 16.0);
    (library, font)
}

/// Wrap width that fits exactly `n` test glyphs.
pub(crate) fn width_of(n: i32) -> u32 {
    (n * CHAR_W) as u32
}

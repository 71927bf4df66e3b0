// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test environment: a fixed-width mock face and a backend that
//! records every call it receives.

use std::cell::Cell;
use std::rc::Rc;

use typeline::{
    Bitmap, Font, GlyphMetrics, ImageKind, Library, LineMetrics, RasterFace,
};

use crate::backend::RenderBackend;

/// Advance of every test glyph, in pixels.
pub(crate) const CHAR_W: i32 = 8;

/// A face covering printable ASCII with configurable ink dimensions.
/// Glyph ids are `codepoint + 1` so that 0 stays the missing-glyph
/// sentinel; whitespace has advance but no ink.
pub(crate) struct DrawFace {
    ink: (u16, u16),
    wide: Option<(char, (u16, u16))>,
    fail_raster: bool,
    raster_calls: Rc<Cell<usize>>,
}

impl DrawFace {
    pub(crate) fn ascii() -> Self {
        Self::with_ink(6, 10)
    }

    pub(crate) fn with_ink(width: u16, height: u16) -> Self {
        Self {
            ink: (width, height),
            wide: None,
            fail_raster: false,
            raster_calls: Rc::new(Cell::new(0)),
        }
    }

    /// An ASCII face where one character has its own ink dimensions.
    pub(crate) fn with_wide_glyph(ch: char, width: u16, height: u16) -> Self {
        let mut face = Self::ascii();
        face.wide = Some((ch, (width, height)));
        face
    }

    /// A face whose rasterization always fails.
    pub(crate) fn failing() -> Self {
        let mut face = Self::ascii();
        face.fail_raster = true;
        face
    }

    pub(crate) fn raster_calls(&self) -> Rc<Cell<usize>> {
        self.raster_calls.clone()
    }
}

impl RasterFace for DrawFace {
    fn glyph_index(&self, ch: char) -> u32 {
        if ch.is_ascii() && !ch.is_control() {
            ch as u32 + 1
        } else {
            0
        }
    }

    fn glyph_metrics(&self, glyph_id: u32) -> Option<GlyphMetrics> {
        let ch = char::from_u32(glyph_id.wrapping_sub(1)).unwrap_or('\u{0}');
        let (width, height) = if glyph_id != 0 && ch.is_whitespace() {
            (0, 0)
        } else {
            match self.wide {
                Some((wch, ink)) if wch == ch => ink,
                _ => self.ink,
            }
        };
        Some(GlyphMetrics {
            left: 1,
            top: 9,
            width,
            height,
            advance: CHAR_W << 6,
        })
    }

    fn rasterize(&self, glyph_id: u32) -> Option<Bitmap> {
        self.raster_calls.set(self.raster_calls.get() + 1);
        if self.fail_raster {
            return None;
        }
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
            height: 12,
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
    let font = Font::new(&library, Box::new(DrawFace::ascii()), 16.0);
    (library, font)
}

/// One recorded [`RenderBackend::upload`] call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct UploadRecord {
    pub(crate) page: u32,
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
}

/// Backend that records page creations and uploads.
#[derive(Default, Debug)]
pub(crate) struct RecordingBackend {
    pub(crate) pages: Vec<(u16, u16)>,
    pub(crate) uploads: Vec<UploadRecord>,
}

impl RenderBackend for RecordingBackend {
    fn create_page(&mut self, width: u16, height: u16) {
        self.pages.push((width, height));
    }

    fn upload(&mut self, page: u32, x: u16, y: u16, bitmap: &Bitmap) {
        self.uploads.push(UploadRecord {
            page,
            x,
            y,
            width: bitmap.width,
            height: bitmap.height,
        });
    }
}

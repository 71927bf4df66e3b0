// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph bitmap cache key.

use typeline::{FontId, GlyphRef};

/// Unique identifier for a cached glyph bitmap.
///
/// Two glyphs with the same key render identically and share one cached
/// bitmap: a [`FontId`] pins the face, size, and style configuration (any
/// change to those moves the font to a new generation, which clears the
/// font's cache bucket wholesale), so the glyph identifier is the only
/// other distinguishing input.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GlyphKey {
    /// Identity of the resolved font (a fallback's id when the glyph came
    /// from a fallback).
    pub font_id: FontId,
    /// Glyph identifier within that font.
    pub glyph_id: u32,
}

impl GlyphKey {
    /// Creates a key for a glyph of `font_id`.
    pub fn new(font_id: FontId, glyph_id: u32) -> Self {
        Self { font_id, glyph_id }
    }
}

impl From<&GlyphRef> for GlyphKey {
    fn from(glyph: &GlyphRef) -> Self {
        Self::new(glyph.font.id(), glyph.glyph_id)
    }
}

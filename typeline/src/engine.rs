// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interface boundary to the external font engines.
//!
//! Typeline does not parse fonts, rasterize outlines, or implement script
//! shaping. Those jobs belong to an external rasterization engine (reached
//! through [`RasterFace`]) and an optional external shaping engine (reached
//! through [`Shaper`]). This module defines the traits, the data that crosses
//! the boundary, and [`Library`], the process-wide engine context.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::fixed::F26Dot6;
use crate::font::FontId;

/// Pixel layout of a rasterized glyph bitmap.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ImageKind {
    /// One byte per pixel coverage; tinted at draw time.
    Alpha,
    /// Four bytes per pixel premultiplied RGBA (e.g. color emoji).
    Color,
    /// Three coverage channels packed as RGBA for subpixel rendering.
    Subpixel,
}

impl ImageKind {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Alpha => 1,
            Self::Color | Self::Subpixel => 4,
        }
    }
}

/// A rasterized glyph image with baseline-relative placement.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Horizontal distance from the pen position to the left edge.
    pub left: i16,
    /// Vertical distance from the baseline up to the top edge.
    pub top: i16,
    /// Pixel layout of `data`.
    pub kind: ImageKind,
    /// Tightly packed rows, `width * height * kind.bytes_per_pixel()` bytes.
    pub data: Vec<u8>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Metrics for a single glyph at the face's configured size.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct GlyphMetrics {
    /// Horizontal bearing from the pen position to the left edge.
    pub left: i32,
    /// Vertical bearing from the baseline up to the top edge.
    pub top: i32,
    /// Ink width in pixels.
    pub width: u16,
    /// Ink height in pixels.
    pub height: u16,
    /// Horizontal advance in 26.6 fixed point.
    pub advance: F26Dot6,
}

/// Per-face vertical metrics at the configured size, in pixels.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the line.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the line (negative).
    pub descent: i32,
    /// Recommended baseline-to-baseline distance.
    pub height: i32,
    /// Offset from the baseline down to the top of the underline.
    pub underline_offset: i32,
    /// Thickness of the underline stroke.
    pub underline_thickness: i32,
    /// Offset from the baseline up to the top of the strikethrough.
    pub strikethrough_offset: i32,
    /// Thickness of the strikethrough stroke.
    pub strikethrough_thickness: i32,
}

/// A face object owned by the external rasterization engine.
///
/// Implementations wrap one font at one size/style configuration. Glyph
/// identifier `0` is the missing-glyph sentinel throughout typeline: a face
/// that cannot map a codepoint returns `0` from [`glyph_index`], which
/// triggers fallback-font resolution.
///
/// [`glyph_index`]: RasterFace::glyph_index
pub trait RasterFace {
    /// Maps a codepoint to this face's glyph identifier, `0` if absent.
    fn glyph_index(&self, ch: char) -> u32;

    /// Returns metrics for a glyph, or `None` if the engine cannot measure it.
    fn glyph_metrics(&self, glyph_id: u32) -> Option<GlyphMetrics>;

    /// Rasterizes a glyph into a bitmap.
    ///
    /// `None` means the engine failed to produce an image for an otherwise
    /// valid glyph; the glyph is then drawn as a zero-size image rather than
    /// failing the whole line.
    fn rasterize(&self, glyph_id: u32) -> Option<Bitmap>;

    /// Kerning adjustment between two glyphs in 26.6 fixed point.
    ///
    /// Only consulted when no shaping engine is attached.
    fn kerning(&self, left: u32, right: u32) -> F26Dot6 {
        let _ = (left, right);
        0
    }

    /// Vertical metrics for the face at its configured size.
    fn line_metrics(&self) -> LineMetrics;

    /// Reconfigures the face's size in pixels.
    fn set_size(&mut self, size: f32) {
        let _ = size;
    }
}

/// One positioned glyph as reported by a shaping engine.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ShapedGlyph {
    /// Glyph identifier in the shaped font.
    pub glyph_id: u32,
    /// Horizontal advance in 26.6 fixed point.
    pub x_advance: F26Dot6,
    /// Vertical advance in 26.6 fixed point.
    pub y_advance: F26Dot6,
    /// Horizontal offset applied before drawing.
    pub x_offset: F26Dot6,
    /// Vertical offset applied before drawing.
    pub y_offset: F26Dot6,
    /// Byte offset of the source cluster this glyph belongs to.
    pub byte_offset: usize,
}

/// An external shaping engine for a single face.
///
/// When absent, typeline falls back to a left-to-right per-codepoint advance
/// model with two-glyph kerning.
pub trait Shaper {
    /// Shapes a UTF-8 run into ordered glyphs with advances and offsets.
    fn shape(
        &self,
        text: &str,
        direction: crate::font::Direction,
        script: crate::font::Script,
    ) -> Vec<ShapedGlyph>;
}

/// The process-wide rasterization-engine context.
///
/// The external engine keeps one shared library handle per process. This is
/// the only resource in typeline that may be touched from multiple threads,
/// so every call that allocates from the shared context goes through the
/// internal mutex. Handles are cheap to clone; the engine is torn down when
/// the last handle is dropped.
#[derive(Clone)]
pub struct Library {
    inner: Arc<Mutex<LibraryState>>,
}

struct LibraryState {
    next_font_id: u64,
    live_fonts: usize,
}

impl Library {
    /// Initializes the engine context.
    pub fn init() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LibraryState {
                next_font_id: 1,
                live_fonts: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LibraryState> {
        // A poisoned mutex only means another thread panicked mid-update;
        // the counters remain usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mints a process-unique font identity.
    pub(crate) fn register_font(&self) -> FontId {
        let mut state = self.lock();
        let id = state.next_font_id;
        state.next_font_id += 1;
        state.live_fonts += 1;
        FontId(id)
    }

    pub(crate) fn unregister_font(&self) {
        let mut state = self.lock();
        state.live_fonts = state.live_fonts.saturating_sub(1);
    }

    /// Number of fonts currently open against this context.
    pub fn live_fonts(&self) -> usize {
        self.lock().live_fonts
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("live_fonts", &self.live_fonts())
            .finish()
    }
}

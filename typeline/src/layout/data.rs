// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plain data types shared across the layout pass.

use crate::engine::LineMetrics;
use crate::fixed::{self, F26Dot6};
use crate::font::{Direction, Font, Script};
use crate::layout::line_break::LineSpan;

/// An integer pixel rectangle in layout space (origin at the text object's
/// top left).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when the point lies inside the rectangle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self::new(x, y, right - x, bottom - y)
    }

    /// Center point, rounded down.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Horizontal placement of each line within the layout extent.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Alignment {
    /// Flush with the start edge.
    #[default]
    Left,
    /// Centered within the extent.
    Center,
    /// Flush with the end edge.
    Right,
}

/// Layout configuration owned by a text object.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct LayoutConfig {
    /// Wrap width in pixels; `0` wraps only at explicit newlines.
    pub wrap_width: u32,
    /// Per-line alignment.
    pub align: Alignment,
    /// When set, trailing whitespace counts towards a line's visible
    /// advance so a caret can be placed after it.
    pub visible_whitespace: bool,
    /// Direction override; `None` uses the font's default.
    pub direction: Option<Direction>,
    /// Script override; `None` uses the font's default.
    pub script: Option<Script>,
}

/// One positioned glyph, produced per run and consumed to build both
/// clusters and draw operations.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphPosition {
    /// The font that resolved the glyph; a fallback font when the primary
    /// lacked the codepoint.
    pub font: Font,
    /// Glyph identifier within `font`; `0` is the placeholder glyph.
    pub glyph_id: u32,
    /// Horizontal advance, 26.6.
    pub x_advance: F26Dot6,
    /// Vertical advance, 26.6. Nonzero only for vertical directions.
    pub y_advance: F26Dot6,
    /// Horizontal draw offset, 26.6.
    pub x_offset: F26Dot6,
    /// Vertical draw offset, 26.6.
    pub y_offset: F26Dot6,
    /// Byte offset of the source cluster in the text.
    pub offset: usize,
}

/// Advance of a position along the main axis of `direction`.
pub(crate) fn main_advance(pos: &GlyphPosition, direction: Direction) -> F26Dot6 {
    if direction.is_horizontal() {
        pos.x_advance
    } else {
        pos.y_advance
    }
}

/// Resolved placement of one line.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct LineInfo {
    /// Alignment offset along the main axis, pixels.
    pub main_offset: i32,
    /// Position along the cross axis (top of the line), pixels.
    pub cross_offset: i32,
    /// Baseline position along the cross axis, pixels.
    pub baseline: i32,
    /// Cross-axis extent (the line height), pixels.
    pub height: i32,
    /// Visible advance, pixels.
    pub advance: i32,
}

impl LineInfo {
    pub(crate) fn new(
        index: usize,
        span: &LineSpan,
        metrics: &LineMetrics,
        extent: i32,
        config: &LayoutConfig,
    ) -> Self {
        let advance = fixed::round_to_pixels(span.advance);
        let main_offset = match config.align {
            Alignment::Left => 0,
            Alignment::Center => ((extent - advance) / 2).max(0),
            Alignment::Right => (extent - advance).max(0),
        };
        let cross_offset = metrics.height * index as i32;
        Self {
            main_offset,
            cross_offset,
            baseline: cross_offset + metrics.ascent,
            height: metrics.height,
            advance,
        }
    }
}

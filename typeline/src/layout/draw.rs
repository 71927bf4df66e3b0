// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw-operation building.
//!
//! Positioned glyphs and decorations become an ordered list of abstract
//! operations: fill a rectangle, or copy a glyph bitmap. Rendering engines
//! resolve each copy's glyph through their atlas cache and batch the result.

use crate::engine::LineMetrics;
use crate::fixed;
use crate::font::{Direction, Font, FontStyle};
use crate::layout::LayoutOutput;
use crate::layout::data::{GlyphPosition, LineInfo, Rect, main_advance};
use crate::layout::line_break::LineSpan;

/// Reference to a glyph to be copied from the atlas: the resolved font
/// (possibly a fallback) plus its glyph identifier.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphRef {
    /// The font the glyph renders with.
    pub font: Font,
    /// Glyph identifier within that font.
    pub glyph_id: u32,
}

/// One abstract draw operation, in paint order.
#[derive(Clone, PartialEq, Debug)]
pub enum DrawOperation {
    /// Fill a rectangle (underline and strikethrough decoration).
    Fill {
        /// Destination in layout space.
        rect: Rect,
    },
    /// Copy a glyph bitmap.
    Copy {
        /// The glyph to copy.
        glyph: GlyphRef,
        /// Source rectangle within the glyph image.
        src: Rect,
        /// Destination in layout space.
        dst: Rect,
    },
}

pub(crate) fn build_ops(
    font: &Font,
    positions: &[GlyphPosition],
    spans: &[LineSpan],
    lines: &[LineInfo],
    direction: Direction,
    metrics: &LineMetrics,
    out: &mut LayoutOutput,
) {
    let horizontal = direction.is_horizontal();
    let style = font.style();

    for (span, info) in spans.iter().zip(lines) {
        // Underline paints beneath the glyphs, strikethrough above.
        if horizontal && style.contains(FontStyle::UNDERLINE) && info.advance > 0 {
            out.ops.push(DrawOperation::Fill {
                rect: Rect::new(
                    info.main_offset,
                    info.baseline + metrics.underline_offset,
                    info.advance,
                    metrics.underline_thickness.max(1),
                ),
            });
        }

        let glyphs = &positions[span.glyphs.clone()];
        let visual: Box<dyn Iterator<Item = &GlyphPosition>> = if direction.is_reversed() {
            Box::new(glyphs.iter().rev())
        } else {
            Box::new(glyphs.iter())
        };

        let mut pen: fixed::F26Dot6 = 0;
        for pos in visual {
            let advance = main_advance(pos, direction);
            // Missing glyphs and rasterization failures are zero-size:
            // they advance the pen but produce no copy, so one bad glyph
            // never blanks the line.
            let gm = pos.font.glyph_metrics(pos.glyph_id).unwrap_or_default();
            if gm.width == 0 || gm.height == 0 {
                pen += advance;
                continue;
            }
            let dst = if horizontal {
                Rect::new(
                    info.main_offset + fixed::floor_to_pixels(pen + pos.x_offset) + gm.left,
                    info.baseline - gm.top + fixed::floor_to_pixels(pos.y_offset),
                    i32::from(gm.width),
                    i32::from(gm.height),
                )
            } else {
                Rect::new(
                    info.cross_offset
                        + fixed::floor_to_pixels(pos.x_offset)
                        + (info.height - i32::from(gm.width)) / 2,
                    info.main_offset + fixed::floor_to_pixels(pen + pos.y_offset),
                    i32::from(gm.width),
                    i32::from(gm.height),
                )
            };
            out.ops.push(DrawOperation::Copy {
                glyph: GlyphRef {
                    font: pos.font.clone(),
                    glyph_id: pos.glyph_id,
                },
                src: Rect::new(0, 0, i32::from(gm.width), i32::from(gm.height)),
                dst,
            });
            pen += advance;
        }

        if horizontal && style.contains(FontStyle::STRIKETHROUGH) && info.advance > 0 {
            out.ops.push(DrawOperation::Fill {
                rect: Rect::new(
                    info.main_offset,
                    info.baseline - metrics.strikethrough_offset,
                    info.advance,
                    metrics.strikethrough_thickness.max(1),
                ),
            });
        }
    }
}

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Substring clusters: the unit of cursor placement and hit testing.

use crate::fixed;
use crate::font::Direction;
use crate::layout::LayoutOutput;
use crate::layout::data::{GlyphPosition, LineInfo, Rect, main_advance};
use crate::layout::line_break::LineSpan;

bitflags::bitflags! {
    /// Boundary and direction flags on a [`SubString`].
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct SubStringFlags: u32 {
        /// First cluster of the text.
        const TEXT_START = 1 << 0;
        /// First cluster of its line.
        const LINE_START = 1 << 1;
        /// Last cluster of its line.
        const LINE_END = 1 << 2;
        /// Zero-length sentinel at the end of the text.
        const TEXT_END = 1 << 3;
        /// The cluster belongs to right-to-left (or bottom-to-top) text.
        const REVERSED = 1 << 4;
    }
}

/// A maximal substring mapped to one layout rectangle.
///
/// After every layout pass the cluster array is sorted by offset and
/// partitions `[0, text_len]`: every byte offset in range is covered by
/// exactly one cluster, with zero-length clusters only at text boundaries.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SubString {
    /// Byte offset into the text.
    pub offset: usize,
    /// Byte length; zero only for boundary sentinels.
    pub len: usize,
    /// Index of the line containing the cluster.
    pub line: u32,
    /// Boundary and direction flags.
    pub flags: SubStringFlags,
    /// Bounding rectangle in layout space.
    pub rect: Rect,
}

impl SubString {
    /// The single sentinel stored for empty text.
    pub(crate) fn empty_sentinel() -> Self {
        Self {
            flags: SubStringFlags::TEXT_START | SubStringFlags::TEXT_END,
            ..Self::default()
        }
    }
}

/// Builds the sorted cluster array and per-line first-cluster table.
pub(crate) fn build_clusters(
    text: &str,
    positions: &[GlyphPosition],
    spans: &[LineSpan],
    lines: &[LineInfo],
    direction: Direction,
    out: &mut LayoutOutput,
) {
    let horizontal = direction.is_horizontal();
    let reversed = direction.is_reversed();
    let dir_flag = if reversed {
        SubStringFlags::REVERSED
    } else {
        SubStringFlags::empty()
    };

    for (line_index, (span, info)) in spans.iter().zip(lines).enumerate() {
        out.line_first.push(out.clusters.len() as u32);
        let glyphs = &positions[span.glyphs.clone()];

        // Pen position of each glyph in visual order. Line terminators sit
        // at the end of the visible advance regardless of direction.
        let mut pens = vec![0_i32; glyphs.len()];
        let mut pen: fixed::F26Dot6 = 0;
        let visual: Box<dyn Iterator<Item = usize>> = if reversed {
            Box::new((0..glyphs.len()).rev())
        } else {
            Box::new(0..glyphs.len())
        };
        for local in visual {
            let pos = &glyphs[local];
            if is_terminator(text, pos.offset) {
                pens[local] = info.advance;
            } else {
                pens[local] = fixed::floor_to_pixels(pen);
                pen += main_advance(pos, direction);
            }
        }

        // Walk logically, merging glyphs that share a source byte offset
        // (one shaped grapheme spanning multiple glyph positions).
        let line_cluster_start = out.clusters.len();
        for (local, pos) in glyphs.iter().enumerate() {
            let advance = fixed::round_to_pixels(main_advance(pos, direction));
            let rect = if horizontal {
                Rect::new(
                    info.main_offset + pens[local],
                    info.cross_offset,
                    advance,
                    info.height,
                )
            } else {
                Rect::new(
                    info.cross_offset,
                    info.main_offset + pens[local],
                    info.height,
                    advance,
                )
            };
            let terminator = is_terminator(text, pos.offset);
            if let Some(last) = out.clusters.last_mut() {
                // Line-end terminator clusters are never merged into the
                // preceding content cluster.
                if last.offset == pos.offset && last.line == line_index as u32 && !terminator {
                    last.rect = last.rect.union(&rect);
                    continue;
                }
            }
            out.clusters.push(SubString {
                offset: pos.offset,
                len: 0,
                line: line_index as u32,
                flags: dir_flag,
                rect,
            });
        }

        // Resolve byte lengths: each cluster runs to the next one's offset,
        // the last to the end of the line span.
        let line_end = span.offset + span.len;
        let produced = out.clusters.len() - line_cluster_start;
        for k in line_cluster_start..out.clusters.len() {
            let next_offset = out
                .clusters
                .get(k + 1)
                .filter(|c| c.line == line_index as u32)
                .map_or(line_end, |c| c.offset);
            out.clusters[k].len = next_offset - out.clusters[k].offset;
        }
        if produced > 0 {
            out.clusters[line_cluster_start].flags |= SubStringFlags::LINE_START;
            let last = out.clusters.len() - 1;
            out.clusters[last].flags |= SubStringFlags::LINE_END;
        }
    }

    if let Some(first) = out.clusters.first_mut() {
        first.flags |= SubStringFlags::TEXT_START;
    }

    // Zero-length end sentinel on the last line.
    let last_line = lines.len().saturating_sub(1);
    let end_rect = lines.last().map_or_else(Rect::default, |info| {
        if horizontal {
            Rect::new(info.main_offset + info.advance, info.cross_offset, 0, info.height)
        } else {
            Rect::new(info.cross_offset, info.main_offset + info.advance, 0, info.height)
        }
    });
    out.clusters.push(SubString {
        offset: text.len(),
        len: 0,
        line: last_line as u32,
        flags: SubStringFlags::TEXT_END | SubStringFlags::LINE_END | dir_flag,
        rect: end_rect,
    });

    debug_assert_eq!(
        out.clusters.iter().map(|c| c.len).sum::<usize>(),
        text.len(),
        "clusters must partition the text"
    );
}

/// Binary search for the cluster covering `offset`.
///
/// Offsets at or past the end of the text land on the end sentinel.
pub(crate) fn cluster_for_offset(clusters: &[SubString], text_len: usize, offset: usize) -> usize {
    if offset >= text_len {
        return clusters.len() - 1;
    }
    clusters
        .partition_point(|c| c.offset <= offset)
        .saturating_sub(1)
}

/// Nearest cluster to a point, with an exact containment short-circuit.
///
/// Distance is a weighted Manhattan metric that strongly prefers the row
/// under the point for horizontal text (the column for vertical text).
/// Ties go to the first cluster in scan order.
pub(crate) fn cluster_for_point(
    clusters: &[SubString],
    horizontal: bool,
    x: i32,
    y: i32,
) -> usize {
    const CROSS_WEIGHT: i64 = 1 << 16;
    let mut best = 0;
    let mut best_score = i64::MAX;
    for (index, cluster) in clusters.iter().enumerate() {
        if cluster.rect.contains(x, y) {
            return index;
        }
        let (cx, cy) = cluster.rect.center();
        let dx = i64::from((cx - x).abs());
        let dy = i64::from((cy - y).abs());
        let score = if horizontal {
            dy * CROSS_WEIGHT + dx
        } else {
            dx * CROSS_WEIGHT + dy
        };
        if score < best_score {
            best_score = score;
            best = index;
        }
    }
    best
}

fn is_terminator(text: &str, offset: usize) -> bool {
    matches!(text[offset..].chars().next(), Some('\n' | '\r'))
}

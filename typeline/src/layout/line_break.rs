// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line breaking over a positioned run.

use core::ops::Range;

use crate::fixed::{self, F26Dot6};
use crate::font::Direction;
use crate::layout::data::{GlyphPosition, main_advance};

/// One line of the layout: a byte span plus the glyph range it covers.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct LineSpan {
    /// Byte offset of the line's first cluster.
    pub offset: usize,
    /// Byte length including any trailing whitespace and line terminator.
    pub len: usize,
    /// Range of glyph positions on this line.
    pub glyphs: Range<usize>,
    /// Visible advance, 26.6. Excludes trailing whitespace unless the
    /// whitespace-visibility flag was set.
    pub advance: F26Dot6,
    /// Advance including trailing whitespace, 26.6.
    pub full_advance: F26Dot6,
    /// `true` when the line was terminated by an explicit newline.
    pub hard_break: bool,
}

/// Splits a positioned run into lines.
///
/// `wrap_width` is in pixels; `0` means wrap only at explicit newlines.
/// Breaks are taken greedily at the last whitespace boundary before the
/// width is exceeded, or mid-run when no boundary exists so that every
/// forced line makes at least one glyph of progress.
pub(crate) fn break_lines(
    text: &str,
    positions: &[GlyphPosition],
    direction: Direction,
    wrap_width: u32,
    visible_whitespace: bool,
) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    if positions.is_empty() {
        return spans;
    }
    let wrap = fixed::from_pixels(wrap_width as i32);

    let mut start = 0_usize;
    let mut acc: F26Dot6 = 0;
    // Glyph index the next line would start at if we break at the most
    // recent whitespace boundary.
    let mut boundary: Option<usize> = None;

    let mut i = 0;
    while i < positions.len() {
        let pos = &positions[i];
        let ch = char_at(text, pos.offset);

        if ch == '\n' || ch == '\r' {
            // Treat CRLF as a single terminator.
            let mut end = i + 1;
            if ch == '\r'
                && positions
                    .get(end)
                    .is_some_and(|p| char_at(text, p.offset) == '\n')
            {
                end += 1;
            }
            spans.push(make_span(
                text,
                positions,
                direction,
                start..end,
                true,
                visible_whitespace,
            ));
            start = end;
            acc = 0;
            boundary = None;
            i = end;
            continue;
        }

        let advance = main_advance(pos, direction);

        // Whitespace never triggers a wrap; it hangs past the edge and is
        // trimmed from the visible advance instead.
        if wrap > 0 && !ch.is_whitespace() && acc + advance > wrap && i > start {
            let mut cut = match boundary {
                Some(b) if b > start => b,
                _ => i,
            };
            // Glyphs sharing a source byte offset are one shaped grapheme;
            // a forced cut moves past the whole group rather than splitting
            // it across lines.
            while cut < positions.len() && positions[cut].offset == positions[cut - 1].offset {
                cut += 1;
            }
            spans.push(make_span(
                text,
                positions,
                direction,
                start..cut,
                false,
                visible_whitespace,
            ));
            start = cut;
            boundary = None;
            if cut > i {
                acc = 0;
                i = cut;
                continue;
            }
            acc = positions[start..i]
                .iter()
                .map(|p| main_advance(p, direction))
                .sum();
        }

        acc += advance;
        if ch.is_whitespace() {
            boundary = Some(i + 1);
        }
        i += 1;
    }

    if start < positions.len() {
        spans.push(make_span(
            text,
            positions,
            direction,
            start..positions.len(),
            false,
            visible_whitespace,
        ));
    }
    spans
}

fn make_span(
    text: &str,
    positions: &[GlyphPosition],
    direction: Direction,
    glyphs: Range<usize>,
    hard_break: bool,
    visible_whitespace: bool,
) -> LineSpan {
    let offset = positions[glyphs.start].offset;
    let end_byte = positions
        .get(glyphs.end)
        .map_or(text.len(), |p| p.offset);

    let full_advance: F26Dot6 = positions[glyphs.clone()]
        .iter()
        .map(|p| main_advance(p, direction))
        .sum();

    let mut advance = full_advance;
    if !visible_whitespace {
        for pos in positions[glyphs.clone()].iter().rev() {
            if !char_at(text, pos.offset).is_whitespace() {
                break;
            }
            advance -= main_advance(pos, direction);
        }
    }

    LineSpan {
        offset,
        len: end_byte - offset,
        glyphs,
        advance,
        full_advance,
        hard_break,
    }
}

fn char_at(text: &str, offset: usize) -> char {
    text[offset..].chars().next().unwrap_or('\u{0}')
}

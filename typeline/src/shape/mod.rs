// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph position computation.
//!
//! Text is first segmented into runs of codepoints resolving to the same
//! font, chaining through fallbacks. Runs whose font carries a shaping
//! engine are shaped by it; the rest use a left-to-right per-codepoint
//! model with two-glyph kerning. Either way the computed sequence is stored
//! in the font's ring cache keyed by (direction, script, exact bytes).

pub(crate) mod cache;

use core::ops::Range;
use std::rc::Rc;

use crate::fixed;
use crate::font::{Direction, Font, Script};
use crate::layout::data::GlyphPosition;
use crate::resolve;

/// Returns the glyph positions for `text`, consulting the font's position
/// ring cache before computing.
pub(crate) fn positions(
    font: &Font,
    text: &str,
    direction: Direction,
    script: Script,
) -> Rc<[GlyphPosition]> {
    if let Some(hit) = font.with_position_cache(|c| c.lookup(direction, script, text)) {
        log::trace!("position cache hit ({} bytes)", text.len());
        return hit;
    }
    let computed: Rc<[GlyphPosition]> = compute(font, text, direction, script).into();
    font.with_position_cache(|c| c.store(direction, script, text, computed.clone()));
    computed
}

fn compute(font: &Font, text: &str, direction: Direction, script: Script) -> Vec<GlyphPosition> {
    let vertical_advance = if direction.is_horizontal() {
        0
    } else {
        fixed::from_pixels(font.line_metrics().height)
    };

    let mut out = Vec::with_capacity(text.len());
    // Current run: the font every codepoint so far resolved to, and the
    // byte offset the run started at.
    let mut run: Option<(Font, usize)> = None;

    for (offset, ch) in text.char_indices() {
        if ch == '\n' || ch == '\r' {
            if let Some((run_font, run_start)) = run.take() {
                shape_run(
                    &run_font,
                    text,
                    run_start..offset,
                    direction,
                    script,
                    vertical_advance,
                    &mut out,
                );
            }
            // Line terminators occupy a position so clusters cover their
            // bytes, but contribute no advance.
            out.push(GlyphPosition {
                font: font.clone(),
                glyph_id: 0,
                x_advance: 0,
                y_advance: 0,
                x_offset: 0,
                y_offset: 0,
                offset,
            });
            continue;
        }

        let (resolved, _) = resolve::resolve(font, ch);
        let same_run = matches!(&run, Some((run_font, _)) if *run_font == resolved);
        if !same_run {
            if let Some((run_font, run_start)) = run.take() {
                shape_run(
                    &run_font,
                    text,
                    run_start..offset,
                    direction,
                    script,
                    vertical_advance,
                    &mut out,
                );
            }
            run = Some((resolved, offset));
        }
    }

    if let Some((run_font, run_start)) = run {
        shape_run(
            &run_font,
            text,
            run_start..text.len(),
            direction,
            script,
            vertical_advance,
            &mut out,
        );
    }
    out
}

/// Positions one same-font run, through the font's shaping engine when it
/// has one.
fn shape_run(
    font: &Font,
    text: &str,
    range: Range<usize>,
    direction: Direction,
    script: Script,
    vertical_advance: fixed::F26Dot6,
    out: &mut Vec<GlyphPosition>,
) {
    let run = &text[range.clone()];
    if let Some(shaped) = font.shape_with_shaper(run, direction, script) {
        out.extend(shaped.into_iter().map(|g| GlyphPosition {
            font: font.clone(),
            glyph_id: g.glyph_id,
            x_advance: g.x_advance,
            y_advance: g.y_advance,
            x_offset: g.x_offset,
            y_offset: g.y_offset,
            offset: range.start + g.byte_offset,
        }));
        return;
    }

    let mut prev: Option<u32> = None;
    for (local, ch) in run.char_indices() {
        let glyph_id = font.glyph_index_cached(ch);
        let metrics = font.glyph_metrics(glyph_id).unwrap_or_default();

        // Kerning shifts the pen before this glyph; fold it into the
        // glyph's own offset and advance.
        let kern = match prev {
            Some(pglyph) => font.kerning(pglyph, glyph_id),
            None => 0,
        };

        out.push(GlyphPosition {
            font: font.clone(),
            glyph_id,
            x_advance: metrics.advance + kern,
            y_advance: vertical_advance,
            x_offset: kern,
            y_offset: 0,
            offset: range.start + local,
        });
        prev = Some(glyph_id);
    }
}

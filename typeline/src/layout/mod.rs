// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout pass: line breaking, cluster building, and draw-operation
//! generation over a positioned run.

pub mod cluster;
pub mod data;
pub mod draw;

pub(crate) mod line_break;

use crate::fixed;
use crate::font::Font;
use crate::shape;
use cluster::SubString;
use data::{LayoutConfig, LineInfo};
use draw::DrawOperation;

/// Everything one layout pass produces. Built into fresh buffers and swapped
/// into the owning text object only on success, so a failed pass never
/// exposes half-updated state.
#[derive(Clone, Default, PartialEq, Debug)]
pub(crate) struct LayoutOutput {
    pub clusters: Vec<SubString>,
    /// Index of the first cluster of each line, for O(log n) line lookup.
    pub line_first: Vec<u32>,
    pub lines: Vec<LineInfo>,
    pub ops: Vec<DrawOperation>,
    /// Extent of the laid-out text in pixels.
    pub width: i32,
    pub height: i32,
}

/// Runs the full layout pass for `text` under `config`.
pub(crate) fn layout_text(font: &Font, text: &str, config: &LayoutConfig) -> LayoutOutput {
    let direction = config.direction.unwrap_or_else(|| font.direction());
    let script = config.script.unwrap_or_else(|| font.script());

    let mut out = LayoutOutput::default();
    if text.is_empty() {
        // Zero lines; a single zero-length sentinel keeps offset queries
        // total over the empty text.
        out.clusters.push(SubString::empty_sentinel());
        return out;
    }

    let positions = shape::positions(font, text, direction, script);
    let spans = line_break::break_lines(
        text,
        &positions,
        direction,
        config.wrap_width,
        config.visible_whitespace,
    );

    let metrics = font.line_metrics();
    // Lines align within the wrap width when wrapping, otherwise within
    // the widest line.
    let extent = if config.wrap_width > 0 {
        config.wrap_width as i32
    } else {
        spans
            .iter()
            .map(|s| fixed::round_to_pixels(s.advance))
            .max()
            .unwrap_or(0)
    };

    let lines: Vec<LineInfo> = spans
        .iter()
        .enumerate()
        .map(|(index, span)| LineInfo::new(index, span, &metrics, extent, config))
        .collect();

    cluster::build_clusters(text, &positions, &spans, &lines, direction, &mut out);
    draw::build_ops(font, &positions, &spans, &lines, direction, &metrics, &mut out);

    out.width = extent;
    out.height = metrics.height * spans.len() as i32;
    if !direction.is_horizontal() {
        core::mem::swap(&mut out.width, &mut out.height);
    }
    out.lines = lines;
    out
}

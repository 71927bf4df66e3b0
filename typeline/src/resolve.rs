// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Codepoint to glyph resolution across fallback chains.

use smallvec::SmallVec;

use crate::font::{Font, FontId};

/// Fonts visited during one resolution. Fallback graphs are mutable after
/// construction and may contain cycles, so termination relies on this set
/// rather than on recursion depth.
type Visited = SmallVec<[FontId; 8]>;

/// Resolves a codepoint to a glyph, chaining through fallback fonts in
/// registration order.
///
/// On success from a fallback font, the returned font is that fallback:
/// rendering later happens with the fallback's size and style, not the
/// primary's. When no font in the chain has the glyph, the primary font's
/// placeholder glyph `0` is returned (tofu).
pub(crate) fn resolve(font: &Font, ch: char) -> (Font, u32) {
    let mut visited = Visited::new();
    resolve_guarded(font, ch, &mut visited).unwrap_or_else(|| (font.clone(), 0))
}

fn resolve_guarded(font: &Font, ch: char, visited: &mut Visited) -> Option<(Font, u32)> {
    if visited.contains(&font.id()) {
        return None;
    }
    visited.push(font.id());

    let glyph_id = font.glyph_index_cached(ch);
    if glyph_id != 0 {
        return Some((font.clone(), glyph_id));
    }
    for fallback in font.fallback_chain() {
        if let Some(hit) = resolve_guarded(&fallback, ch, visited) {
            return Some(hit);
        }
    }
    None
}

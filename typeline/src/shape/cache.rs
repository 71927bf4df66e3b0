// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ring cache for computed glyph-position sequences.

use std::rc::Rc;

use crate::font::{Direction, Script};
use crate::layout::data::GlyphPosition;

/// Number of cached runs per font. Small on purpose: the cache exists to
/// absorb repeated measure/render of the same few strings.
const RING_SLOTS: usize = 8;

struct Slot {
    direction: Direction,
    script: Script,
    text: Box<str>,
    positions: Rc<[GlyphPosition]>,
}

/// A fixed-capacity ring of previously computed position sequences keyed by
/// (direction, script, exact byte content).
///
/// Eviction is round-robin over the slots, not strict LRU: a hit does not
/// refresh a slot's position in the ring. With eight slots behind an
/// exact-bytes key the worst case of that imprecision is one extra reshape.
pub(crate) struct PositionCache {
    slots: Vec<Option<Slot>>,
    cursor: usize,
}

impl Default for PositionCache {
    fn default() -> Self {
        Self {
            slots: (0..RING_SLOTS).map(|_| None).collect(),
            cursor: 0,
        }
    }
}

impl PositionCache {
    pub(crate) fn lookup(
        &self,
        direction: Direction,
        script: Script,
        text: &str,
    ) -> Option<Rc<[GlyphPosition]>> {
        self.slots.iter().flatten().find_map(|slot| {
            (slot.direction == direction
                && slot.script == script
                && slot.text.len() == text.len()
                && &*slot.text == text)
                .then(|| slot.positions.clone())
        })
    }

    pub(crate) fn store(
        &mut self,
        direction: Direction,
        script: Script,
        text: &str,
        positions: Rc<[GlyphPosition]>,
    ) {
        self.slots[self.cursor] = Some(Slot {
            direction,
            script,
            text: text.into(),
            positions,
        });
        self.cursor = (self.cursor + 1) % RING_SLOTS;
    }

    /// Empties the ring. Called whenever the owning font's generation
    /// changes or its fallback chain is edited.
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.cursor = 0;
    }
}

// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas regions and the refcounted entry arena.

use typeline::ImageKind;

use super::key::GlyphKey;

/// Location of a cached glyph bitmap within an atlas page, excluding the
/// padding border around it.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AtlasRegion {
    /// Which atlas page contains this glyph.
    pub page: u32,
    /// X position in the page, in pixels.
    pub x: u16,
    /// Y position in the page, in pixels.
    pub y: u16,
    /// Bitmap width in pixels.
    pub width: u16,
    /// Bitmap height in pixels.
    pub height: u16,
}

impl AtlasRegion {
    /// Normalized texture coordinates `[u0, v0, u1, v1]` for a page of the
    /// given dimensions.
    pub fn uv(&self, page_width: u16, page_height: u16) -> [f32; 4] {
        let w = f32::from(page_width);
        let h = f32::from(page_height);
        [
            f32::from(self.x) / w,
            f32::from(self.y) / h,
            f32::from(self.x + self.width) / w,
            f32::from(self.y + self.height) / h,
        ]
    }
}

/// A cached glyph bitmap: its atlas region, pixel layout, and the number of
/// prepared texts currently referencing it.
#[derive(Clone, Debug)]
pub struct AtlasEntry {
    pub(crate) key: GlyphKey,
    /// Where the bitmap lives.
    pub region: AtlasRegion,
    /// Pixel layout of the uploaded bitmap.
    pub kind: ImageKind,
    pub(crate) refcount: u32,
}

/// Stable handle to an [`AtlasEntry`] slot.
///
/// Carries the slot's epoch so that a handle held across a forced cache
/// clear (font generation change) dangles harmlessly instead of aliasing
/// whatever entry reuses the slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntryId {
    index: u32,
    epoch: u32,
}

struct Slot {
    epoch: u32,
    entry: Option<AtlasEntry>,
}

/// Index-based arena of cache entries with a free-slot list.
#[derive(Default)]
pub(crate) struct EntryArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EntryArena {
    pub(crate) fn insert(&mut self, entry: AtlasEntry) -> EntryId {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                EntryId {
                    index,
                    epoch: slot.epoch,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    epoch: 0,
                    entry: Some(entry),
                });
                EntryId { index, epoch: 0 }
            }
        }
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&AtlasEntry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.epoch != id.epoch {
            return None;
        }
        slot.entry.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut AtlasEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.epoch != id.epoch {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Frees the slot and bumps its epoch, invalidating outstanding ids.
    pub(crate) fn remove(&mut self, id: EntryId) -> Option<AtlasEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.epoch != id.epoch {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.epoch = slot.epoch.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(entry)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

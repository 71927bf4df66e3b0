// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Refcounted glyph bitmap cache over the atlas allocator.
//!
//! Entries are bucketed per font identity and stamped with the font's
//! generation at fill time. A font observed at a newer generation has its
//! whole bucket dropped and every region returned to the allocator; there
//! is no partial invalidation, because a size or style change invalidates
//! every bitmap of the face at once.

use hashbrown::HashMap;
use typeline::{Font, FontId, ImageKind};

use crate::atlas::{AtlasAllocator, AtlasEntry, AtlasRegion, EntryArena, EntryId, GlyphKey};

struct FontBucket {
    generation: u64,
    glyphs: HashMap<GlyphKey, EntryId>,
}

/// Cache of uploaded glyph bitmaps keyed by (font identity, glyph id).
#[derive(Default)]
pub struct GlyphCache {
    fonts: HashMap<FontId, FontBucket>,
    entries: EntryArena,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a glyph of `font`, counting the hit or miss.
    ///
    /// If the font's generation advanced since the bucket was filled, the
    /// bucket is cleared first and the lookup is a miss.
    pub fn get(&mut self, allocator: &mut AtlasAllocator, font: &Font, glyph_id: u32) -> Option<EntryId> {
        self.sync_generation(allocator, font);
        let id = self
            .fonts
            .get(&font.id())
            .and_then(|b| b.glyphs.get(&GlyphKey::new(font.id(), glyph_id)))
            .copied();
        match id {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        id
    }

    /// Looks up a glyph without generation sync or stat counting.
    pub fn lookup(&self, key: GlyphKey) -> Option<EntryId> {
        self.fonts
            .get(&key.font_id)
            .and_then(|b| b.glyphs.get(&key))
            .copied()
    }

    /// Inserts an uploaded glyph with refcount zero.
    pub fn insert(&mut self, font: &Font, glyph_id: u32, region: AtlasRegion, kind: ImageKind) -> EntryId {
        let key = GlyphKey::new(font.id(), glyph_id);
        let id = self.entries.insert(AtlasEntry {
            key,
            region,
            kind,
            refcount: 0,
        });
        let bucket = self.fonts.entry(font.id()).or_insert_with(|| FontBucket {
            generation: font.generation(),
            glyphs: HashMap::new(),
        });
        bucket.glyphs.insert(key, id);
        id
    }

    /// The entry behind `id`, if it survived generation clears.
    pub fn entry(&self, id: EntryId) -> Option<&AtlasEntry> {
        self.entries.get(id)
    }

    /// Increments an entry's refcount. One prepared text holds at most one
    /// reference per distinct key, however often the glyph repeats in it.
    pub fn retain(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.refcount += 1;
        }
    }

    /// Decrements an entry's refcount, freeing its region at zero.
    ///
    /// Ids invalidated by a generation clear are ignored; their regions
    /// were already returned to the allocator.
    pub fn release(&mut self, allocator: &mut AtlasAllocator, id: EntryId) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount > 0 {
            return;
        }
        if let Some(entry) = self.entries.remove(id) {
            if let Some(bucket) = self.fonts.get_mut(&entry.key.font_id) {
                bucket.glyphs.remove(&entry.key);
            }
            allocator.release(entry.region);
        }
    }

    /// Number of cached glyphs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }

    /// Cache hits since the last [`clear_stats`](Self::clear_stats).
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Cache misses since the last [`clear_stats`](Self::clear_stats).
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Resets hit/miss counters without touching the cache.
    pub fn clear_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    fn sync_generation(&mut self, allocator: &mut AtlasAllocator, font: &Font) {
        let Some(bucket) = self.fonts.get_mut(&font.id()) else {
            return;
        };
        let generation = font.generation();
        if bucket.generation == generation {
            return;
        }
        log::debug!(
            "font {:?} generation {} -> {}: dropping {} cached glyphs",
            font.id(),
            bucket.generation,
            generation,
            bucket.glyphs.len()
        );
        for (_, id) in bucket.glyphs.drain() {
            if let Some(entry) = self.entries.remove(id) {
                allocator.release(entry.region);
            }
        }
        bucket.generation = generation;
    }
}

impl core::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("fonts", &self.fonts.len())
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

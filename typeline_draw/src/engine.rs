// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine pass: draw operations to atlas-backed draw batches.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use typeline::{Bitmap, DrawOperation, Font, ImageKind, Rect, TextId, TextObject};

use crate::atlas::{AtlasAllocator, AtlasConfig, EntryId, GlyphKey};
use crate::backend::RenderBackend;
use crate::cache::GlyphCache;
use crate::error::Result;

/// One glyph quad within a batch: destination in layout space, source as
/// normalized coordinates into the batch's page.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphQuad {
    /// Destination rectangle in layout space.
    pub dst: Rect,
    /// Normalized `[u0, v0, u1, v1]` into the atlas page.
    pub uv: [f32; 4],
}

/// A run of consecutive draw operations a renderer can issue as one call.
#[derive(Clone, PartialEq, Debug)]
pub enum DrawBatch {
    /// Solid rectangles (underline and strikethrough).
    Fill {
        /// Rectangles in layout space.
        rects: Vec<Rect>,
    },
    /// Glyph quads sampling one atlas page with one pixel layout.
    Glyphs {
        /// Atlas page to sample.
        page: u32,
        /// Pixel layout of the sampled bitmaps.
        kind: ImageKind,
        /// The quads, in paint order.
        quads: Vec<GlyphQuad>,
    },
}

/// Prepared rendering state for one text object.
#[derive(Debug)]
pub struct PreparedText {
    serial: u64,
    entries: Vec<EntryId>,
    // Most texts produce one or two batches; keep those inline.
    batches: SmallVec<[DrawBatch; 4]>,
}

impl PreparedText {
    /// Layout serial this state was prepared from.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The draw batches, in paint order.
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }
}

/// Counters for diagnostics.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EngineStats {
    /// Glyph cache hits since engine creation.
    pub cache_hits: u64,
    /// Glyph cache misses since engine creation.
    pub cache_misses: u64,
    /// Glyphs currently resident in the atlas.
    pub cached_glyphs: usize,
    /// Atlas pages opened.
    pub pages: usize,
}

/// Turns [`TextObject`] draw operations into batched, atlas-backed quads.
///
/// The engine owns the atlas allocator, the refcounted glyph cache, and the
/// texture backend. Prepared state is kept per text identity and rebuilt
/// only when the text's layout serial moves; callers must [`discard`] a
/// text's state when the text is dropped, since the engine holds the
/// references that keep its atlas regions from being reused.
///
/// [`discard`]: Self::discard
pub struct GlyphEngine<B: RenderBackend> {
    allocator: AtlasAllocator,
    cache: GlyphCache,
    backend: B,
    backend_pages: usize,
    prepared: HashMap<TextId, PreparedText>,
}

impl<B: RenderBackend> GlyphEngine<B> {
    /// Creates an engine with the default page size.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, AtlasConfig::default())
    }

    /// Creates an engine with explicit atlas page dimensions.
    pub fn with_config(backend: B, config: AtlasConfig) -> Self {
        Self {
            allocator: AtlasAllocator::new(config),
            cache: GlyphCache::new(),
            backend,
            backend_pages: 0,
            prepared: HashMap::new(),
        }
    }

    /// Brings the text's prepared state up to date and returns it.
    ///
    /// Runs layout if needed, rasterizes and uploads missing glyphs, and
    /// rebuilds the batches. A text whose serial has not moved returns its
    /// existing state without touching the atlas.
    pub fn prepare(&mut self, text: &mut TextObject) -> Result<&PreparedText> {
        let id = text.id();
        text.ensure_layout();
        let serial = text.layout_serial();
        let current = self.prepared.get(&id).is_some_and(|p| p.serial == serial);
        if !current {
            // New references are taken before the old ones are released, so
            // glyphs shared between the old and new layout never drop to
            // refcount zero in between.
            let built = self.build(text, serial)?;
            self.discard(id);
            self.prepared.insert(id, built);
        }
        text.mark_engine_clean();
        Ok(&self.prepared[&id])
    }

    /// Releases a text's glyph references and drops its prepared state.
    ///
    /// Must be called when a text object is destroyed; refcount exactness
    /// is what prevents premature atlas region reuse.
    pub fn discard(&mut self, id: TextId) {
        if let Some(prev) = self.prepared.remove(&id) {
            for entry in prev.entries {
                self.cache.release(&mut self.allocator, entry);
            }
        }
    }

    /// Prepared state for a text, if any.
    pub fn prepared(&self, id: TextId) -> Option<&PreparedText> {
        self.prepared.get(&id)
    }

    /// The texture backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The glyph cache.
    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Current counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
            cached_glyphs: self.cache.len(),
            pages: self.allocator.page_count(),
        }
    }

    fn build(&mut self, text: &mut TextObject, serial: u64) -> Result<PreparedText> {
        let ops = text.draw_operations().to_vec();

        // Pass 1: find the distinct glyphs not yet in the atlas. Each
        // distinct key is looked up once, so hit/miss stats count keys,
        // not occurrences.
        let mut checked: HashSet<GlyphKey> = HashSet::new();
        let mut missing: Vec<(Font, u32)> = Vec::new();
        for op in &ops {
            if let DrawOperation::Copy { glyph, .. } = op {
                if checked.insert(GlyphKey::from(glyph))
                    && self
                        .cache
                        .get(&mut self.allocator, &glyph.font, glyph.glyph_id)
                        .is_none()
                {
                    missing.push((glyph.font.clone(), glyph.glyph_id));
                }
            }
        }

        // Pass 2: rasterize and upload, largest first so big glyphs claim
        // shelf space before the remainder fragments it.
        let mut rastered: Vec<(Font, u32, Bitmap)> = missing
            .into_iter()
            .filter_map(|(font, glyph_id)| {
                font.rasterize(glyph_id).map(|bitmap| (font, glyph_id, bitmap))
            })
            .collect();
        rastered.sort_by_key(|(_, _, b)| {
            core::cmp::Reverse(u32::from(b.width) * u32::from(b.height))
        });
        let mut fresh: Vec<EntryId> = Vec::new();
        for (font, glyph_id, bitmap) in rastered {
            let region = match self.allocator.allocate(bitmap.width, bitmap.height) {
                Ok(region) => region,
                Err(err) => {
                    // A failed build leaves nothing behind: entries inserted
                    // so far hold no references yet and are released with
                    // their regions.
                    for id in fresh {
                        self.cache.release(&mut self.allocator, id);
                    }
                    return Err(err);
                }
            };
            self.sync_backend_pages();
            self.backend.upload(region.page, region.x, region.y, &bitmap);
            fresh.push(self.cache.insert(&font, glyph_id, region, bitmap.kind));
        }

        // Pass 3: batch in paint order, holding one reference per distinct
        // glyph for the lifetime of this prepared state.
        let mut entries: Vec<EntryId> = Vec::new();
        let mut retained: HashSet<EntryId> = HashSet::new();
        let mut batches: SmallVec<[DrawBatch; 4]> = SmallVec::new();
        for op in &ops {
            match op {
                DrawOperation::Fill { rect } => match batches.last_mut() {
                    Some(DrawBatch::Fill { rects }) => rects.push(*rect),
                    _ => batches.push(DrawBatch::Fill { rects: vec![*rect] }),
                },
                DrawOperation::Copy { glyph, dst, .. } => {
                    // Absent entry means rasterization failed for this
                    // glyph; skip it rather than fail the whole text.
                    let Some(id) = self.cache.lookup(GlyphKey::from(glyph)) else {
                        continue;
                    };
                    let Some(entry) = self.cache.entry(id) else {
                        continue;
                    };
                    let page = entry.region.page;
                    let kind = entry.kind;
                    let quad = GlyphQuad {
                        dst: *dst,
                        uv: entry
                            .region
                            .uv(self.allocator.page_width(), self.allocator.page_height()),
                    };
                    if retained.insert(id) {
                        entries.push(id);
                    }
                    match batches.last_mut() {
                        Some(DrawBatch::Glyphs {
                            page: batch_page,
                            kind: batch_kind,
                            quads,
                        }) if *batch_page == page && *batch_kind == kind => quads.push(quad),
                        _ => batches.push(DrawBatch::Glyphs {
                            page,
                            kind,
                            quads: vec![quad],
                        }),
                    }
                }
            }
        }
        for &id in &entries {
            self.cache.retain(id);
        }

        log::trace!(
            "prepared text {:?}: {} batches, {} glyph refs",
            text.id(),
            batches.len(),
            entries.len()
        );
        Ok(PreparedText {
            serial,
            entries,
            batches,
        })
    }

    fn sync_backend_pages(&mut self) {
        while self.backend_pages < self.allocator.page_count() {
            self.backend
                .create_page(self.allocator.page_width(), self.allocator.page_height());
            self.backend_pages += 1;
        }
    }
}

impl<B: RenderBackend> core::fmt::Debug for GlyphEngine<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphEngine")
            .field("allocator", &self.allocator)
            .field("cache", &self.cache)
            .field("prepared", &self.prepared.len())
            .finish_non_exhaustive()
    }
}
